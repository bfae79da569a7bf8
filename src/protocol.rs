//! JSON record format for captured packets.
//!
//! Machine consumers (loggers, companion tooling) get packets as
//! newline-delimited JSON. Uses `heapless` types so serialization stays
//! no_std/no-alloc.

use heapless::{String, Vec};
use serde::Serialize;

use crate::packet::{AddrString, RecoveredPacket, MAX_PAYLOAD};

/// Space-separated hex payload rendering ("0a 0b 0c").
pub type PayloadString = String<{ MAX_PAYLOAD * 3 }>;

/// One captured packet as an NDJSON record.
#[derive(Debug, Serialize)]
pub struct PacketRecord {
    /// Channel the frame was heard on.
    pub ch: u8,
    /// Recovered device address, colon-separated hex.
    pub addr: AddrString,
    /// Payload bytes, space-separated hex.
    pub payload: PayloadString,
}

impl PacketRecord {
    pub fn from_packet(packet: &RecoveredPacket) -> Self {
        let mut payload = PayloadString::new();
        for (i, b) in packet.payload.iter().enumerate() {
            let sep = if i == 0 { "" } else { " " };
            let _ = core::fmt::Write::write_fmt(
                &mut payload,
                format_args!("{sep}{b:02x}"),
            );
        }
        Self {
            ch: packet.channel,
            addr: packet.address.to_hex(),
            payload,
        }
    }
}

/// Maximum size of one serialized record line.
pub const MAX_MSG_LEN: usize = 192;

/// Buffer type for serialized record lines.
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Serialize a record into `buf` as one NDJSON line (newline appended).
/// Returns the number of bytes written, or None if it did not fit.
pub fn serialize_record(record: &PacketRecord, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(record, buf) {
        Ok(len) if len < buf.len() => {
            buf[len] = b'\n';
            Some(len + 1)
        }
        Ok(len) => Some(len),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Address, Payload};

    fn sample() -> RecoveredPacket {
        let mut payload = Payload::new();
        payload.extend_from_slice(&[0x01, 0x02, 0x03]).unwrap();
        RecoveredPacket::new(44, Address::new([0x11, 0x22, 0x33, 0x44, 0x55]), payload)
    }

    #[test]
    fn record_fields_render_as_hex() {
        let record = PacketRecord::from_packet(&sample());
        assert_eq!(record.ch, 44);
        assert_eq!(record.addr.as_str(), "11:22:33:44:55");
        assert_eq!(record.payload.as_str(), "01 02 03");
    }

    #[test]
    fn serializes_as_one_ndjson_line() {
        let record = PacketRecord::from_packet(&sample());
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_record(&record, &mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""ch":44"#));
        assert!(json.contains(r#""addr":"11:22:33:44:55""#));
        assert!(json.contains(r#""payload":"01 02 03""#));
    }

    #[test]
    fn empty_payload_serializes_cleanly() {
        let packet = RecoveredPacket::new(3, Address::new([0xAA, 0, 0, 0, 0]), Payload::new());
        let record = PacketRecord::from_packet(&packet);
        assert_eq!(record.payload.as_str(), "");
        let mut buf = [0u8; MAX_MSG_LEN];
        assert!(serialize_record(&record, &mut buf).is_some());
    }

    #[test]
    fn full_size_payload_fits_the_buffer() {
        let mut payload = Payload::new();
        payload.extend_from_slice(&[0xFF; MAX_PAYLOAD]).unwrap();
        let packet = RecoveredPacket::new(80, Address::new([1, 2, 3, 4, 5]), payload);
        let record = PacketRecord::from_packet(&packet);
        let mut buf = [0u8; MAX_MSG_LEN];
        assert!(serialize_record(&record, &mut buf).is_some());
    }
}
