//! Candidate decoder — software recovery of frames captured on the
//! universal listening address.
//!
//! While listening promiscuously the hardware gives no framing help at all:
//! the 32 bytes it hands over start somewhere inside the victim's preamble,
//! so the true device address, payload length, payload, and checksum all
//! have to be dug out of the buffer bit by bit. Two frame-start offsets are
//! consistent with how the capture truncates the frame boundary, so the
//! whole recovery is attempted at both alignments and every interpretation
//! that survives the checksum is reported.

use heapless::Vec;

use crate::bits::{shift_left, shift_right};
use crate::crc::{crc16_update, CRC_INIT};
use crate::packet::{Address, Payload};

/// A fixed-length receive buffer as delivered by hardware for one receive
/// event.
pub type RawCapture = [u8; 32];

/// Number of address bytes at the front of an aligned capture.
const ADDR_LEN: usize = 5;

/// Declared lengths at or above this cannot belong to a real frame.
const MAX_FRAME_LEN: usize = 24;

/// A bit-realigned interpretation of a [`RawCapture`] that passed checksum
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePacket {
    /// The reconstructed device address, most significant byte first.
    pub address: Address,
    /// Frame payload bytes (declared length 0-23).
    pub payload: Payload,
    /// The validated 16-bit checksum.
    pub checksum: u16,
}

/// Attempt to recover a frame from `capture` at both bit alignments.
///
/// Returns at most one candidate per alignment. Most captures are noise and
/// produce nothing; that is the expected steady state, not an error. Short
/// ambiguous captures can validate at both alignments, in which case both
/// interpretations are returned — deduplication is the consumer's call.
pub fn decode(capture: &RawCapture) -> Vec<CandidatePacket, 2> {
    let mut found = Vec::new();
    let mut buf = *capture;
    for pass in 0..2 {
        if pass == 1 {
            // Complementary alignment: the frame started one bit later than
            // the capture, so push the whole buffer right before retrying.
            shift_right(&mut buf);
        }
        if let Some(candidate) = try_alignment(&buf) {
            let _ = found.push(candidate);
        }
    }
    found
}

/// Run the recovery algorithm against one fixed alignment of the capture.
fn try_alignment(buf: &RawCapture) -> Option<CandidatePacket> {
    // Bytes 0-4 are the reconstructed device address. The frame region that
    // follows sits one bit off from the address boundary; shift it back into
    // alignment. The last byte only donates a bit.
    let address = Address::new([buf[0], buf[1], buf[2], buf[3], buf[4]]);
    let mut frame = [0u8; 32 - ADDR_LEN];
    frame.copy_from_slice(&buf[ADDR_LEN..]);
    shift_left(&mut frame);

    // Top 5 bits of the first frame byte declare the payload length.
    let len = (frame[0] >> 3) as usize;
    if len >= MAX_FRAME_LEN {
        return None;
    }

    // The stored checksum sits right after the payload, low byte first, with
    // one extra high bit folded in from bit 7 of the byte after it. Real
    // captures were empirically fitted to this exact rule; keep it as is.
    let mut expected = (frame[len + 2] as u16) << 8 | frame[len + 1] as u16;
    if frame[len + 3] & 0x80 != 0 {
        expected |= 0x100;
    }

    // Recompute over the unshifted capture: address plus frame through the
    // payload as whole bytes, then the single bit the comparison value
    // claims to cover. The stored order is byte-swapped relative to the
    // bit-serial accumulator.
    let mut crc = CRC_INIT;
    for &b in &buf[..ADDR_LEN + 1 + len] {
        crc = crc16_update(crc, b, 8);
    }
    crc = crc16_update(crc, buf[ADDR_LEN + 1 + len] & 0x80, 1);
    let crc = crc.swap_bytes();

    if crc != expected {
        return None;
    }

    let mut payload = Payload::new();
    payload.extend_from_slice(&frame[1..=len]).ok()?;
    Some(CandidatePacket {
        address,
        payload,
        checksum: crc,
    })
}
