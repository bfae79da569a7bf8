//! Discovery loop — full-band channel scan with no known target.
//!
//! Dwells on each channel for a fixed window while listening on the
//! universal address, runs every capture through the candidate decoder, and
//! yields whatever validates. Most captures are garbage; the loop's only
//! "recovery" for silence is to keep hopping.

use crate::control::{CancelToken, Clock};
use crate::decode::{decode, RawCapture};
use crate::defaults::{
    next_channel, DEFAULT_DWELL_MS, POLL_IDLE_MS, PROMISCUOUS_ADDR, PROMISCUOUS_ADDR_WIDTH,
};
use crate::packet::RecoveredPacket;
use crate::radio::{CrcMode, DataRate, PaLevel, Radio};

/// Discovery loop parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// Channel the sweep begins on. The wrap rule takes over from there.
    pub start_channel: u8,
    /// Milliseconds to listen on each channel before moving on.
    pub dwell_ms: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_channel: 0,
            dwell_ms: DEFAULT_DWELL_MS,
        }
    }
}

/// Lazy, unbounded stream of recovered packets from a full-band sweep.
///
/// Construction applies the promiscuous receive configuration and starts
/// listening; any facade failure there means the hardware is unusable and
/// is returned to the caller. Iteration yields every validated candidate —
/// a capture that validates at both bit alignments yields twice, duplicates
/// included by design.
pub struct Scanner<'a, R: Radio, C: Clock> {
    radio: R,
    clock: C,
    cancel: &'a CancelToken,
    channel: u8,
    dwell_ms: u64,
    dwell_start: u64,
    /// Second candidate from a double-validating capture, held for the next
    /// `next()` call.
    pending: Option<RecoveredPacket>,
}

impl<'a, R: Radio, C: Clock> Scanner<'a, R, C> {
    /// Put the transceiver into promiscuous receive and start the sweep.
    pub fn new(
        mut radio: R,
        clock: C,
        cancel: &'a CancelToken,
        config: ScanConfig,
    ) -> Result<Self, R::Error> {
        radio.set_auto_ack(false)?;
        radio.set_pa_level(PaLevel::Min)?;
        radio.set_data_rate(DataRate::Mbps2)?;
        radio.set_payload_size(32)?;
        radio.set_address_width(PROMISCUOUS_ADDR_WIDTH)?;
        radio.open_reading_pipe(&PROMISCUOUS_ADDR)?;
        radio.set_crc_mode(CrcMode::Disabled)?;
        radio.set_channel(config.start_channel)?;
        radio.start_listening()?;
        let dwell_start = clock.now_ms();
        Ok(Self {
            radio,
            clock,
            cancel,
            channel: config.start_channel,
            dwell_ms: config.dwell_ms as u64,
            dwell_start,
            pending: None,
        })
    }

    /// Channel the loop is currently dwelling on.
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl<R: Radio, C: Clock> Iterator for Scanner<'_, R, C> {
    type Item = Result<RecoveredPacket, R::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                let _ = self.radio.stop_listening();
                return None;
            }

            if let Some(packet) = self.pending.take() {
                return Some(Ok(packet));
            }

            let now = self.clock.now_ms();
            if now.saturating_sub(self.dwell_start) >= self.dwell_ms {
                self.channel = next_channel(self.channel);
                if let Err(e) = self.radio.set_channel(self.channel) {
                    return Some(Err(e));
                }
                self.dwell_start = now;
                log::debug!("scan: dwelling on channel {}", self.channel);
            }

            match self.radio.data_available() {
                Ok(true) => {
                    let mut capture: RawCapture = [0; 32];
                    if let Err(e) = self.radio.read(&mut capture) {
                        return Some(Err(e));
                    }
                    // Drop any stale queued frame before the next poll.
                    if let Err(e) = self.radio.flush_rx() {
                        return Some(Err(e));
                    }

                    let mut candidates = decode(&capture).into_iter();
                    match candidates.next() {
                        Some(first) => {
                            let first =
                                RecoveredPacket::new(self.channel, first.address, first.payload);
                            self.pending = candidates.next().map(|second| {
                                RecoveredPacket::new(self.channel, second.address, second.payload)
                            });
                            return Some(Ok(first));
                        }
                        None => {
                            log::trace!("scan: capture on channel {} rejected", self.channel);
                        }
                    }
                }
                Ok(false) => self.clock.sleep_ms(POLL_IDLE_MS),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
