//! Recovered packet types and address handling.

use core::fmt;

use heapless::{String, Vec};

/// Longest payload the radio delivers in one frame.
pub const MAX_PAYLOAD: usize = 32;

/// Payload byte storage. No allocator needed; a frame never exceeds
/// [`MAX_PAYLOAD`] bytes.
pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// Colon-separated hex rendering of an [`Address`] ("aa:bb:cc:dd:ee").
pub type AddrString = String<14>;

/// A 5-byte over-the-air device address, most significant byte first
/// (the order it is rendered and received in).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(pub [u8; 5]);

/// The input was not five colon-separated hex bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("address must be five colon-separated hex bytes (11:22:33:44:55)")]
pub struct AddressParseError;

impl Address {
    pub const fn new(bytes: [u8; 5]) -> Self {
        Self(bytes)
    }

    /// Parse a colon-separated hex address such as `11:22:33:44:55`.
    /// The separators are optional; `1122334455` parses to the same value.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        let mut bytes = [0u8; 5];
        let mut nibbles = 0usize;
        for c in s.chars() {
            if c == ':' {
                continue;
            }
            let digit = c.to_digit(16).ok_or(AddressParseError)? as u8;
            if nibbles >= 10 {
                return Err(AddressParseError);
            }
            bytes[nibbles / 2] = (bytes[nibbles / 2] << 4) | digit;
            nibbles += 1;
        }
        if nibbles != 10 {
            return Err(AddressParseError);
        }
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; 5] {
        &self.0
    }

    /// Bytes in the order the chip's pipe address registers expect
    /// (least significant byte first).
    pub fn to_pipe_bytes(&self) -> [u8; 5] {
        let b = self.0;
        [b[4], b[3], b[2], b[1], b[0]]
    }

    /// Render as colon-separated hex into a heapless string.
    pub fn to_hex(&self) -> AddrString {
        let mut s = AddrString::new();
        let _ = fmt::Write::write_fmt(&mut s, format_args!("{self}"));
        s
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4]
        )
    }
}

/// The unit the acquisition loops yield outward: one frame, tagged with the
/// channel it was heard on. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredPacket {
    pub channel: u8,
    pub address: Address,
    pub payload: Payload,
}

impl RecoveredPacket {
    pub fn new(channel: u8, address: Address, payload: Payload) -> Self {
        Self {
            channel,
            address,
            payload,
        }
    }
}

impl fmt::Display for RecoveredPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} | {} |", self.channel, self.address)?;
        for b in &self.payload {
            write!(f, " {b:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_colon_separated() {
        let addr = Address::parse("11:22:33:44:55").unwrap();
        assert_eq!(addr.as_bytes(), &[0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn parse_bare_hex() {
        let addr = Address::parse("a1b2c3d4e5").unwrap();
        assert_eq!(addr.as_bytes(), &[0xA1, 0xB2, 0xC3, 0xD4, 0xE5]);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("11:22:33:44").is_err());
        assert!(Address::parse("11:22:33:44:55:66").is_err());
        assert!(Address::parse("zz:22:33:44:55").is_err());
    }

    #[test]
    fn display_round_trip() {
        let addr = Address::new([0xDE, 0xAD, 0xBE, 0xEF, 0x01]);
        let hex = addr.to_hex();
        assert_eq!(hex.as_str(), "de:ad:be:ef:01");
        assert_eq!(Address::parse(&hex).unwrap(), addr);
    }

    #[test]
    fn pipe_bytes_are_reversed() {
        let addr = Address::parse("11:22:33:44:55").unwrap();
        assert_eq!(addr.to_pipe_bytes(), [0x55, 0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn packet_display_matches_capture_log_format() {
        let mut payload = Payload::new();
        payload.extend_from_slice(&[0x01, 0x02, 0x03]).unwrap();
        let pkt = RecoveredPacket::new(7, Address::new([0x11, 0x22, 0x33, 0x44, 0x55]), payload);
        let mut out = heapless::String::<64>::new();
        fmt::Write::write_fmt(&mut out, format_args!("{pkt}")).unwrap();
        assert_eq!(out.as_str(), "07 | 11:22:33:44:55 | 01 02 03");
    }
}
