//! Bit-serial CRC-16/CCITT.
//!
//! The checksum embedded in an over-the-air frame covers a bit range that is
//! not byte-aligned: the comparison value includes one extra bit taken from
//! the flag byte past the payload. A byte-oriented CRC cannot express that,
//! so the primitive consumes a caller-specified number of bits.

/// CRC-16/CCITT generator polynomial.
const POLY: u16 = 0x1021;

/// Accumulator seed for frame checksums.
pub const CRC_INIT: u16 = 0xFFFF;

/// Feed the top `bits` bits of `byte` into a running CRC-16/CCITT
/// accumulator and return the updated accumulator.
///
/// Pass `bits = 8` for whole bytes. The final fractional byte of a frame is
/// fed as its bit 7 with `bits = 1`.
pub fn crc16_update(mut crc: u16, byte: u8, bits: u8) -> u16 {
    crc ^= (byte as u16) << 8;
    for _ in 0..bits {
        if crc & 0x8000 != 0 {
            crc = (crc << 1) ^ POLY;
        } else {
            crc <<= 1;
        }
    }
    crc
}

/// Run a byte slice through [`crc16_update`] a whole byte at a time.
pub fn crc16_bytes(mut crc: u16, bytes: &[u8]) -> u16 {
    for &b in bytes {
        crc = crc16_update(crc, b, 8);
    }
    crc
}
