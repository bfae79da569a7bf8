//! Tuning constants shared by the acquisition loops.

/// Universal listening address for pseudo-promiscuous capture, in register
/// byte order (least significant byte first, as the chip stores it).
///
/// Combined with the illegal 2-byte address width this makes the transceiver
/// sync on what is effectively preamble, so frames destined for arbitrary
/// addresses land in the RX FIFO with their real address still embedded in
/// the payload bytes.
pub const PROMISCUOUS_ADDR: [u8; 5] = [0xAA, 0x00, 0x00, 0x00, 0x00];

/// Address width written while listening promiscuously. Below the datasheet
/// minimum of 3; the capture trick depends on the chip accepting it anyway.
pub const PROMISCUOUS_ADDR_WIDTH: u8 = 2;

/// First channel the loops hop to after wrapping. Channels 0-2 sit under
/// WiFi channel 1 and are noisy enough to be useless.
pub const CHANNEL_MIN: u8 = 3;

/// Last channel worth visiting; consumer 2.4GHz gear stays below this.
pub const CHANNEL_MAX: u8 = 80;

/// Default per-channel dwell during discovery, in milliseconds.
pub const DEFAULT_DWELL_MS: u32 = 100;

/// Silence window after which the sniff loop abandons its channel.
pub const DEFAULT_LOCK_TIMEOUT_MS: u32 = 2_000;

/// Settle pause after a sniff-loop channel hop.
pub const DEFAULT_HOP_PAUSE_MS: u32 = 10;

/// Sleep between polls when the RX FIFO is empty, to avoid hammering the
/// bus while waiting for hardware.
pub const POLL_IDLE_MS: u32 = 1;

/// Advance one channel, wrapping past [`CHANNEL_MAX`] back to
/// [`CHANNEL_MIN`].
pub fn next_channel(channel: u8) -> u8 {
    if channel >= CHANNEL_MAX {
        CHANNEL_MIN
    } else {
        channel + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_within_range() {
        assert_eq!(next_channel(3), 4);
        assert_eq!(next_channel(79), 80);
    }

    #[test]
    fn wraps_past_top_to_channel_3() {
        assert_eq!(next_channel(80), 3);
        assert_eq!(next_channel(255), 3);
    }
}
