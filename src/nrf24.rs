//! nRF24L01+ register driver.
//!
//! Implements the [`Radio`] facade over `embedded-hal` traits: an
//! [`SpiDevice`] for the command interface, an [`OutputPin`] for CE, and a
//! [`DelayNs`] for the chip's settle times. Only the registers the capture
//! loops need are modelled.
//!
//! The driver keeps a shadow of the CONFIG register so receive/transmit
//! transitions do not need a bus read, and tracks whether dynamic payloads
//! are enabled so `read` knows how many bytes to clock out.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::decode::RawCapture;
use crate::radio::{CrcMode, DataRate, PaLevel, Radio};

/// SPI command set.
mod cmd {
    pub const R_REGISTER: u8 = 0x00;
    pub const W_REGISTER: u8 = 0x20;
    pub const R_RX_PL_WID: u8 = 0x60;
    pub const R_RX_PAYLOAD: u8 = 0x61;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
}

/// Register map (the subset the capture loops touch).
mod reg {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const TX_ADDR: u8 = 0x10;
    pub const RX_PW_P0: u8 = 0x11;
    pub const FIFO_STATUS: u8 = 0x17;
    pub const DYNPD: u8 = 0x1C;
    pub const FEATURE: u8 = 0x1D;
}

// CONFIG bits
const EN_CRC: u8 = 1 << 3;
const CRCO: u8 = 1 << 2;
const PWR_UP: u8 = 1 << 1;
const PRIM_RX: u8 = 1 << 0;

// STATUS bits
const RX_DR: u8 = 1 << 6;
const TX_DS: u8 = 1 << 5;
const MAX_RT: u8 = 1 << 4;

// FIFO_STATUS bits
const RX_EMPTY: u8 = 1 << 0;

// RF_SETUP bits
const RF_DR_LOW: u8 = 1 << 5;
const RF_DR_HIGH: u8 = 1 << 3;
const RF_PWR_MASK: u8 = 0b0000_0110;

// FEATURE bits
const EN_DPL: u8 = 1 << 2;

/// Driver failure. SPI and CE errors carry the transport error through;
/// `NotResponding` is the distinct "no hardware" case setup reports.
#[derive(Debug, thiserror::Error)]
pub enum Nrf24Error<S, P> {
    #[error("SPI transfer failed: {0:?}")]
    Spi(S),
    #[error("CE pin error: {0:?}")]
    Pin(P),
    #[error("no nRF24L01+ responding on the bus")]
    NotResponding,
    #[error("transmit did not complete")]
    TxTimeout,
}

/// nRF24L01+ over SPI.
pub struct Nrf24<SPI, CE, D> {
    spi: SPI,
    ce: CE,
    delay: D,
    /// Shadow of CONFIG.
    config: u8,
    dynamic_payloads: bool,
    payload_size: u8,
}

type DriverResult<T, SPI, CE> =
    Result<T, Nrf24Error<<SPI as embedded_hal::spi::ErrorType>::Error, <CE as embedded_hal::digital::ErrorType>::Error>>;

impl<SPI, CE, D> Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    /// Power the chip up and verify it responds.
    ///
    /// Fails with [`Nrf24Error::NotResponding`] when a written register does
    /// not read back, which is what a missing or miswired module looks like.
    pub fn new(spi: SPI, ce: CE, delay: D) -> DriverResult<Self, SPI, CE> {
        let mut radio = Self {
            spi,
            ce,
            delay,
            config: EN_CRC | CRCO,
            dynamic_payloads: false,
            payload_size: 32,
        };
        radio.ce.set_low().map_err(Nrf24Error::Pin)?;
        // Power-on-reset settle.
        radio.delay.delay_ms(5);

        radio.write_register(reg::SETUP_AW, 0x03)?;
        if radio.read_register(reg::SETUP_AW)? != 0x03 {
            return Err(Nrf24Error::NotResponding);
        }

        radio.write_register(reg::SETUP_RETR, 0x00)?;
        let config = radio.config;
        radio.write_register(reg::CONFIG, config)?;
        radio.power_up()?;
        Ok(radio)
    }

    /// Release the bus and pin.
    pub fn release(self) -> (SPI, CE) {
        (self.spi, self.ce)
    }

    fn transfer(&mut self, buf: &mut [u8]) -> DriverResult<(), SPI, CE> {
        self.spi.transfer_in_place(buf).map_err(Nrf24Error::Spi)
    }

    fn read_register(&mut self, register: u8) -> DriverResult<u8, SPI, CE> {
        let mut buf = [cmd::R_REGISTER | register, 0];
        self.transfer(&mut buf)?;
        Ok(buf[1])
    }

    fn write_register(&mut self, register: u8, value: u8) -> DriverResult<(), SPI, CE> {
        let mut buf = [cmd::W_REGISTER | register, value];
        self.transfer(&mut buf)
    }

    fn write_register_bytes(&mut self, register: u8, value: &[u8]) -> DriverResult<(), SPI, CE> {
        let mut buf = [0u8; 6];
        buf[0] = cmd::W_REGISTER | register;
        buf[1..=value.len()].copy_from_slice(value);
        self.transfer(&mut buf[..=value.len()])
    }

    fn command(&mut self, command: u8) -> DriverResult<u8, SPI, CE> {
        let mut buf = [command];
        self.transfer(&mut buf)?;
        Ok(buf[0]) // STATUS is clocked out with every command byte
    }

    fn update_config(&mut self, set: u8, clear: u8) -> DriverResult<(), SPI, CE> {
        self.config = (self.config & !clear) | set;
        let config = self.config;
        self.write_register(reg::CONFIG, config)
    }

    fn power_up(&mut self) -> DriverResult<(), SPI, CE> {
        self.update_config(PWR_UP, 0)?;
        // Tpd2stby
        self.delay.delay_ms(2);
        Ok(())
    }
}

impl<SPI, CE, D> Radio for Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    type Error = Nrf24Error<SPI::Error, CE::Error>;

    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
        self.write_register(reg::RF_CH, channel & 0x7F)
    }

    fn set_auto_ack(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.write_register(reg::EN_AA, if enabled { 0x3F } else { 0x00 })
    }

    fn set_pa_level(&mut self, level: PaLevel) -> Result<(), Self::Error> {
        let setup = self.read_register(reg::RF_SETUP)? & !RF_PWR_MASK;
        let bits = match level {
            PaLevel::Min => 0x00,
            PaLevel::Max => RF_PWR_MASK,
        };
        self.write_register(reg::RF_SETUP, setup | bits)
    }

    fn set_data_rate(&mut self, rate: DataRate) -> Result<(), Self::Error> {
        let setup = self.read_register(reg::RF_SETUP)? & !(RF_DR_LOW | RF_DR_HIGH);
        let bits = match rate {
            DataRate::Kbps250 => RF_DR_LOW,
            DataRate::Mbps1 => 0x00,
            DataRate::Mbps2 => RF_DR_HIGH,
        };
        self.write_register(reg::RF_SETUP, setup | bits)
    }

    fn set_address_width(&mut self, width: u8) -> Result<(), Self::Error> {
        // SETUP_AW holds width - 2; 0 is out of spec and exactly what the
        // promiscuous trick asks for.
        self.write_register(reg::SETUP_AW, width.saturating_sub(2))
    }

    fn open_reading_pipe(&mut self, address: &[u8; 5]) -> Result<(), Self::Error> {
        self.write_register_bytes(reg::RX_ADDR_P0, address)?;
        self.write_register_bytes(reg::TX_ADDR, address)?;
        // Pipe 0 only.
        self.write_register(reg::EN_RXADDR, 0x01)
    }

    fn set_crc_mode(&mut self, mode: CrcMode) -> Result<(), Self::Error> {
        match mode {
            CrcMode::Disabled => self.update_config(0, EN_CRC | CRCO),
            CrcMode::Crc8 => self.update_config(EN_CRC, CRCO),
            CrcMode::Crc16 => self.update_config(EN_CRC | CRCO, 0),
        }
    }

    fn set_payload_size(&mut self, size: u8) -> Result<(), Self::Error> {
        self.write_register(reg::FEATURE, 0x00)?;
        self.write_register(reg::DYNPD, 0x00)?;
        self.write_register(reg::RX_PW_P0, size.min(32))?;
        self.dynamic_payloads = false;
        self.payload_size = size.min(32);
        Ok(())
    }

    fn enable_dynamic_payloads(&mut self) -> Result<(), Self::Error> {
        self.write_register(reg::FEATURE, EN_DPL)?;
        self.write_register(reg::DYNPD, 0x3F)?;
        self.dynamic_payloads = true;
        Ok(())
    }

    fn start_listening(&mut self) -> Result<(), Self::Error> {
        self.update_config(PWR_UP | PRIM_RX, 0)?;
        self.write_register(reg::STATUS, RX_DR | TX_DS | MAX_RT)?;
        self.flush_rx()?;
        self.ce.set_high().map_err(Nrf24Error::Pin)?;
        // RX settling time.
        self.delay.delay_us(130);
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), Self::Error> {
        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.update_config(0, PRIM_RX)
    }

    fn data_available(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read_register(reg::FIFO_STATUS)? & RX_EMPTY == 0)
    }

    fn read(&mut self, buf: &mut RawCapture) -> Result<usize, Self::Error> {
        let len = if self.dynamic_payloads {
            let mut wid = [cmd::R_RX_PL_WID, 0];
            self.transfer(&mut wid)?;
            let len = wid[1] as usize;
            if len == 0 || len > 32 {
                // Corrupt length; the datasheet says flush and move on.
                self.flush_rx()?;
                return Ok(0);
            }
            len
        } else {
            self.payload_size as usize
        };

        let mut frame = [0u8; 33];
        frame[0] = cmd::R_RX_PAYLOAD;
        self.transfer(&mut frame[..=len])?;
        buf[..len].copy_from_slice(&frame[1..=len]);
        self.write_register(reg::STATUS, RX_DR)?;
        Ok(len)
    }

    fn flush_rx(&mut self) -> Result<(), Self::Error> {
        self.command(cmd::FLUSH_RX)?;
        Ok(())
    }

    fn write(&mut self, payload: &[u8]) -> Result<bool, Self::Error> {
        let len = payload.len().min(32);

        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.update_config(PWR_UP, PRIM_RX)?;
        self.write_register(reg::STATUS, TX_DS | MAX_RT)?;
        self.command(cmd::FLUSH_TX)?;

        let mut frame = [0u8; 33];
        frame[0] = cmd::W_TX_PAYLOAD;
        frame[1..=len].copy_from_slice(&payload[..len]);
        self.transfer(&mut frame[..=len])?;

        self.ce.set_high().map_err(Nrf24Error::Pin)?;
        self.delay.delay_us(15);
        self.ce.set_low().map_err(Nrf24Error::Pin)?;

        // One frame at 2Mbps is well under a millisecond; give it plenty.
        for _ in 0..1000 {
            let status = self.read_register(reg::STATUS)?;
            if status & (TX_DS | MAX_RT) != 0 {
                self.write_register(reg::STATUS, TX_DS | MAX_RT)?;
                return Ok(status & TX_DS != 0);
            }
            self.delay.delay_us(10);
        }
        Err(Nrf24Error::TxTimeout)
    }
}
