//! One-bit re-alignment transforms.
//!
//! A capture taken on the universal listening address truncates the true
//! frame boundary by zero or one bit. These two transforms move a byte
//! sequence between the two possible alignments: each interior byte trades a
//! bit with its neighbour, and the byte at the far end only donates.

/// Shift the sequence left by one bit.
///
/// Every byte except the last is replaced by itself shifted left, with the
/// top bit of the following byte moved into bit 0. The final byte is left
/// untouched; it exists only to donate its top bit.
pub fn shift_left(buf: &mut [u8]) {
    for i in 0..buf.len().saturating_sub(1) {
        buf[i] = (buf[i] << 1) | (buf[i + 1] >> 7);
    }
}

/// Shift the sequence right by one bit.
///
/// Walks from the last byte to the first so each byte can take the bottom
/// bit of its (still unmodified) predecessor as its new top bit. The first
/// byte has no donor and is shifted in isolation.
pub fn shift_right(buf: &mut [u8]) {
    for i in (0..buf.len()).rev() {
        if i > 0 {
            buf[i] = (buf[i - 1] << 7) | (buf[i] >> 1);
        } else {
            buf[i] >>= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_left_fixture() {
        let mut buf = [0xAA, 0xC3, 0x55];
        shift_left(&mut buf);
        assert_eq!(buf, [0x55, 0x86, 0x55]);
    }

    #[test]
    fn shift_right_fixture() {
        let mut buf = [0xAA, 0xC3, 0x55];
        shift_right(&mut buf);
        assert_eq!(buf, [0x55, 0x61, 0xAA]);
    }

    #[test]
    fn left_then_right_loses_only_boundary_bits() {
        let mut buf = [0xAA, 0xC3, 0x55];
        shift_left(&mut buf);
        shift_right(&mut buf);
        // The first byte loses its top bit, the last byte its bottom bit;
        // everything in between comes back exactly.
        assert_eq!(buf, [0x2A, 0xC3, 0x2A]);
    }

    #[test]
    fn right_then_left_restores_all_but_last() {
        // The decoder relies on this direction: un-shifting a capture and
        // shifting it back must reproduce every byte except the final one,
        // whose donated bottom bit is gone.
        let orig = [0xAA, 0xC3, 0x55, 0x0F, 0xF0, 0x81];
        let mut buf = orig;
        shift_right(&mut buf);
        shift_left(&mut buf);
        assert_eq!(&buf[..5], &orig[..5]);
    }

    #[test]
    fn single_byte_shifts_in_isolation() {
        let mut buf = [0x81];
        shift_left(&mut buf);
        assert_eq!(buf, [0x81]); // no donor, untouched

        let mut buf = [0x81];
        shift_right(&mut buf);
        assert_eq!(buf, [0x40]);
    }
}
