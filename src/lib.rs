//! nrfjack library — nRF24L01+ pseudo-promiscuous packet recovery.
//!
//! The nRF24L01+ has no promiscuous mode, but tricked into an illegal
//! 2-byte address width and pointed at the `0xAA` preamble it will deliver
//! raw noise-laden buffers from which genuine Enhanced ShockBurst frames
//! can be recovered in software: realign by one bit, parse the 9-bit
//! packet-control field, and recompute the 16-bit checksum over the
//! captured bits.
//!
//! The crate is `no_std` at its core so the acquisition logic runs
//! unchanged on hosts and embedded targets alike:
//! - `bits`, `crc`, `decode`, `packet` — pure frame-recovery logic.
//! - `scan`, `sniff` — the two acquisition loops, written against the
//!   [`radio::Radio`] and [`control::Clock`] traits.
//! - `nrf24` — the SPI register driver implementing [`radio::Radio`] over
//!   `embedded-hal`.
//! - `protocol` — NDJSON records for machine consumers.
//!
//! The `std` feature adds [`control::StdClock`] for host binaries.

#![cfg_attr(not(test), no_std)]

pub mod bits;
pub mod control;
pub mod crc;
pub mod decode;
pub mod defaults;
pub mod nrf24;
pub mod packet;
pub mod protocol;
pub mod radio;
pub mod scan;
pub mod sniff;

#[cfg(test)]
pub(crate) mod testing;
