//! Deterministic fakes and fixtures shared by the loop and decoder tests.

use std::collections::VecDeque;
use std::convert::Infallible;

use crate::bits::shift_right;
use crate::control::Clock;
use crate::crc::{crc16_update, CRC_INIT};
use crate::decode::RawCapture;
use crate::radio::{CrcMode, DataRate, PaLevel, Radio};

/// Build a capture that decodes (at the as-received alignment) to the given
/// address and payload, with a checksum computed exactly the way the decoder
/// recomputes it.
pub fn build_capture(addr: [u8; 5], payload: &[u8]) -> RawCapture {
    assert!(payload.len() <= 24);
    let len = payload.len();

    let mut frame = [0u8; 27];
    frame[0] = (len as u8) << 3;
    frame[1..1 + len].copy_from_slice(payload);

    // First assembly pass: lay the frame out as it would travel over the
    // air so the checksum can be computed over the capture's byte stream.
    let capture = assemble(addr, &frame);
    let mut crc = CRC_INIT;
    for &b in &capture[..6 + len] {
        crc = crc16_update(crc, b, 8);
    }
    crc = crc16_update(crc, capture[6 + len] & 0x80, 1);
    let crc = crc.swap_bytes();

    frame[len + 1] = (crc & 0xFF) as u8;
    frame[len + 2] = (crc >> 8) as u8;
    assemble(addr, &frame)
}

/// Pack an address and an aligned frame region into capture layout: the
/// frame sits one bit later than the address boundary.
fn assemble(addr: [u8; 5], frame: &[u8; 27]) -> RawCapture {
    let mut capture = [0u8; 32];
    capture[..5].copy_from_slice(&addr);
    let mut tail = *frame;
    shift_right(&mut tail);
    capture[5..].copy_from_slice(&tail);
    capture
}

/// Scripted clock: `sleep_ms` advances time, nothing else does.
pub struct FakeClock {
    pub now: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { now: 0 }
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now += ms as u64;
    }
}

/// One scripted receive event.
pub struct QueuedCapture {
    /// `data_available` holds this capture back until the radio has seen
    /// this many `set_channel` calls.
    pub arm_after_channels: usize,
    pub buf: RawCapture,
    pub len: usize,
}

/// Scripted radio: records every configuration call and serves queued
/// captures in order, each gated on a channel-selection count.
pub struct FakeRadio {
    /// Every channel passed to `set_channel`, in order.
    pub channels: Vec<u8>,
    pub captures: VecDeque<QueuedCapture>,
    pub pipe: Option<[u8; 5]>,
    pub auto_ack: Option<bool>,
    pub pa_level: Option<PaLevel>,
    pub data_rate: Option<DataRate>,
    pub address_width: Option<u8>,
    pub crc_mode: Option<CrcMode>,
    pub payload_size: Option<u8>,
    pub dynamic_payloads: bool,
    pub listening: bool,
    pub flushes: usize,
}

impl FakeRadio {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            captures: VecDeque::new(),
            pipe: None,
            auto_ack: None,
            pa_level: None,
            data_rate: None,
            address_width: None,
            crc_mode: None,
            payload_size: None,
            dynamic_payloads: false,
            listening: false,
            flushes: 0,
        }
    }

    /// Queue a capture that is available immediately.
    pub fn queue_capture(&mut self, capture: RawCapture, len: usize) {
        self.queue_capture_after(0, capture, len);
    }

    /// Queue a capture that only becomes available once `arm_after_channels`
    /// channel selections have been recorded.
    pub fn queue_capture_after(&mut self, arm_after_channels: usize, buf: RawCapture, len: usize) {
        self.captures.push_back(QueuedCapture {
            arm_after_channels,
            buf,
            len,
        });
    }
}

impl Radio for FakeRadio {
    type Error = Infallible;

    fn set_channel(&mut self, channel: u8) -> Result<(), Infallible> {
        self.channels.push(channel);
        Ok(())
    }

    fn set_auto_ack(&mut self, enabled: bool) -> Result<(), Infallible> {
        self.auto_ack = Some(enabled);
        Ok(())
    }

    fn set_pa_level(&mut self, level: PaLevel) -> Result<(), Infallible> {
        self.pa_level = Some(level);
        Ok(())
    }

    fn set_data_rate(&mut self, rate: DataRate) -> Result<(), Infallible> {
        self.data_rate = Some(rate);
        Ok(())
    }

    fn set_address_width(&mut self, width: u8) -> Result<(), Infallible> {
        self.address_width = Some(width);
        Ok(())
    }

    fn open_reading_pipe(&mut self, address: &[u8; 5]) -> Result<(), Infallible> {
        self.pipe = Some(*address);
        Ok(())
    }

    fn set_crc_mode(&mut self, mode: CrcMode) -> Result<(), Infallible> {
        self.crc_mode = Some(mode);
        Ok(())
    }

    fn set_payload_size(&mut self, size: u8) -> Result<(), Infallible> {
        self.payload_size = Some(size);
        self.dynamic_payloads = false;
        Ok(())
    }

    fn enable_dynamic_payloads(&mut self) -> Result<(), Infallible> {
        self.dynamic_payloads = true;
        Ok(())
    }

    fn start_listening(&mut self) -> Result<(), Infallible> {
        self.listening = true;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), Infallible> {
        self.listening = false;
        Ok(())
    }

    fn data_available(&mut self) -> Result<bool, Infallible> {
        Ok(self
            .captures
            .front()
            .is_some_and(|c| self.channels.len() >= c.arm_after_channels))
    }

    fn read(&mut self, buf: &mut RawCapture) -> Result<usize, Infallible> {
        match self.captures.pop_front() {
            Some(capture) => {
                *buf = capture.buf;
                Ok(capture.len)
            }
            None => Ok(0),
        }
    }

    fn flush_rx(&mut self) -> Result<(), Infallible> {
        self.flushes += 1;
        Ok(())
    }

    fn write(&mut self, _payload: &[u8]) -> Result<bool, Infallible> {
        Ok(true)
    }
}
