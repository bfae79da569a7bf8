//! `nrfjack` — capture nRF24L01+ traffic from a Linux host.
//!
//! Drives a transceiver wired to a spidev bus and a gpio-cdev CE line,
//! runs one of the two acquisition loops, and prints recovered packets to
//! stdout as text or NDJSON until Ctrl-C.

use std::fmt::Display;
use std::io::{self, Write};
use std::process::exit;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};

use nrfjack::control::{CancelToken, StdClock};
use nrfjack::nrf24::Nrf24;
use nrfjack::packet::{Address, RecoveredPacket};
use nrfjack::protocol::{serialize_record, PacketRecord, MAX_MSG_LEN};
use nrfjack::scan::{ScanConfig, Scanner};
use nrfjack::sniff::{SniffConfig, Sniffer};

static CANCEL: CancelToken = CancelToken::new();

#[derive(Parser)]
#[command(name = "nrfjack", version, about = "nRF24L01+ pseudo-promiscuous packet capture")]
struct Cli {
    /// SPI device the transceiver is wired to
    #[arg(long, default_value = "/dev/spidev0.0")]
    spidev: String,

    /// GPIO character device holding the CE line
    #[arg(long, default_value = "/dev/gpiochip0")]
    gpiochip: String,

    /// GPIO line number of the CE pin
    #[arg(long, default_value_t = 25)]
    ce_pin: u32,

    /// Emit packets as newline-delimited JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sweep every channel and report any device heard
    Scan {
        /// Seconds to dwell on each channel
        #[arg(short, long, default_value_t = 0.4)]
        timeout: f64,
    },
    /// Follow one known device address across channels
    Sniff {
        /// Target address, e.g. 11:22:33:44:55
        #[arg(short = 'a', long)]
        target: String,

        /// Seconds of silence before trying the next channel
        #[arg(short, long, default_value_t = 2.0)]
        timeout: f64,
    },
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("{err:#}");
        exit(1);
    }
}

fn run() -> Result<()> {
    let args = Cli::parse();

    ctrlc::set_handler(|| CANCEL.cancel()).context("cannot install Ctrl-C handler")?;

    let radio = open_radio(&args)?;
    let clock = StdClock::new();

    match &args.command {
        Command::Scan { timeout } => {
            let config = ScanConfig {
                start_channel: 0,
                dwell_ms: seconds_to_ms(*timeout)?,
            };
            let scanner = Scanner::new(radio, clock, &CANCEL, config)
                .map_err(|e| anyhow!("cannot enter promiscuous receive: {e}"))?;
            consume(scanner, args.json)
        }
        Command::Sniff { target, timeout } => {
            let target = Address::parse(target).context("invalid target address")?;
            let config = SniffConfig {
                timeout_ms: seconds_to_ms(*timeout)?,
                ..SniffConfig::default()
            };
            let sniffer = Sniffer::new(radio, clock, &CANCEL, target, config)
                .map_err(|e| anyhow!("cannot bind to target: {e}"))?;
            consume(sniffer, args.json)
        }
    }
}

fn seconds_to_ms(seconds: f64) -> Result<u32> {
    if !seconds.is_finite() || seconds <= 0.0 || seconds > 3600.0 {
        return Err(anyhow!("timeout out of range: {seconds}"));
    }
    Ok((seconds * 1000.0) as u32)
}

fn open_radio(args: &Cli) -> Result<Nrf24<SpidevDevice, CdevPin, Delay>> {
    let mut spi = SpidevDevice::open(&args.spidev)
        .with_context(|| format!("cannot open {}", args.spidev))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(8_000_000)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.0
        .configure(&options)
        .context("cannot configure SPI bus")?;

    let mut chip = Chip::new(&args.gpiochip)
        .with_context(|| format!("cannot open {}", args.gpiochip))?;
    let handle = chip
        .get_line(args.ce_pin)
        .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, "nrfjack"))
        .with_context(|| format!("cannot claim CE line {}", args.ce_pin))?;
    let ce = CdevPin::new(handle).context("cannot wrap CE line")?;

    Nrf24::new(spi, ce, Delay).map_err(|e| anyhow!("cannot initialize transceiver: {e}"))
}

/// Drain an acquisition loop to stdout until it ends (Ctrl-C).
fn consume<E: Display>(
    packets: impl Iterator<Item = Result<RecoveredPacket, E>>,
    json: bool,
) -> Result<()> {
    let stdout = io::stdout();
    let mut count = 0usize;
    for item in packets {
        let packet = item.map_err(|e| anyhow!("radio failure: {e}"))?;
        if json {
            let record = PacketRecord::from_packet(&packet);
            let mut buf = [0u8; MAX_MSG_LEN];
            if let Some(len) = serialize_record(&record, &mut buf) {
                stdout.lock().write_all(&buf[..len])?;
            }
        } else {
            println!("{packet}");
        }
        count += 1;
    }
    println!("[i] {count} packets captured.");
    Ok(())
}
