//! Radio control facade consumed by the acquisition loops.
//!
//! The loops own a configuration snapshot and re-apply it through this
//! trait on (re)entry; they never share transceiver state. One physical
//! transceiver supports at most one active loop at a time.

use crate::decode::RawCapture;

/// Transmit power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaLevel {
    Min,
    Max,
}

/// Over-the-air data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRate {
    Kbps250,
    Mbps1,
    /// The rate consumer nRF24 peripherals run at; default everywhere.
    Mbps2,
}

/// Hardware CRC configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcMode {
    /// No hardware validation — required while capturing promiscuously,
    /// where the checksum is recomputed in software.
    Disabled,
    Crc8,
    Crc16,
}

/// Capability interface over one nRF24-class transceiver.
///
/// Channel numbering is 0-125. Pipe addresses are passed least significant
/// byte first, the order the chip's address registers store them;
/// [`crate::packet::Address::to_pipe_bytes`] converts from display order.
///
/// Every operation can fail with the implementation's transport error; such
/// failures mean the hardware is unusable and propagate out of the loops
/// untouched.
pub trait Radio {
    type Error: core::fmt::Debug;

    /// Tune to an RF channel (2400 + n MHz).
    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Enable or disable automatic acknowledgment on all pipes.
    fn set_auto_ack(&mut self, enabled: bool) -> Result<(), Self::Error>;

    fn set_pa_level(&mut self, level: PaLevel) -> Result<(), Self::Error>;

    fn set_data_rate(&mut self, rate: DataRate) -> Result<(), Self::Error>;

    /// Set the pipe address width in bytes. The datasheet allows 3-5;
    /// implementations must pass smaller values through unmodified, since
    /// the promiscuous trick relies on an illegal width of 2.
    fn set_address_width(&mut self, width: u8) -> Result<(), Self::Error>;

    /// Bind receive pipe 0 to an address (least significant byte first).
    fn open_reading_pipe(&mut self, address: &[u8; 5]) -> Result<(), Self::Error>;

    fn set_crc_mode(&mut self, mode: CrcMode) -> Result<(), Self::Error>;

    /// Fix the expected payload length and disable dynamic payloads.
    fn set_payload_size(&mut self, size: u8) -> Result<(), Self::Error>;

    /// Let the transmitter declare the payload length per frame.
    fn enable_dynamic_payloads(&mut self) -> Result<(), Self::Error>;

    fn start_listening(&mut self) -> Result<(), Self::Error>;

    fn stop_listening(&mut self) -> Result<(), Self::Error>;

    /// Whether at least one received frame is waiting in the RX FIFO.
    fn data_available(&mut self) -> Result<bool, Self::Error>;

    /// Read one frame into `buf`, returning the number of valid bytes
    /// (the fixed payload size, or the declared length when dynamic
    /// payloads are enabled; 0 for a corrupt length that was flushed).
    fn read(&mut self, buf: &mut RawCapture) -> Result<usize, Self::Error>;

    /// Discard any buffered-but-unread receive data.
    fn flush_rx(&mut self) -> Result<(), Self::Error>;

    /// Transmit one raw payload on the current channel and pipe address.
    /// Returns whether the hardware reported completion.
    fn write(&mut self, payload: &[u8]) -> Result<bool, Self::Error>;
}
