// SPDX-License-Identifier: MIT

//! Command-line interface and session wiring.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use embedded_hal::delay::DelayNs;
use log::info;
use spiflasher_core::{Session, INITIAL_BAUD_RATE};

use crate::serial::SerialTransport;
use crate::sim_flash::SimFlash;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "spiflasher")]
#[command(about = "Serial SPI-flash programmer firmware")]
pub struct Cli {
    /// Serial port to serve the protocol on (e.g., /dev/ttyUSB0)
    #[arg(short, long)]
    pub port: String,

    /// Backing image file for the simulated chip; created if missing
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Simulated chip capacity in bytes (default 16 MiB, a W25Q128)
    #[arg(short, long, default_value = "16777216")]
    pub capacity: u32,

    /// JEDEC identity word the simulated chip reports
    #[arg(long, default_value = "0xEF4018", value_parser = parse_u32)]
    pub jedec_id: u32,
}

/// Accept `0x`-prefixed hex or plain decimal.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Delay backed by the OS scheduler.
pub struct SleepDelay;

impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

/// Open the port, build the chip, and hand control to the session loop.
pub fn run(cli: Cli) -> Result<()> {
    let transport = SerialTransport::open(&cli.port, INITIAL_BAUD_RATE)?;
    let flash = match &cli.image {
        Some(path) => SimFlash::with_image(path, cli.capacity, cli.jedec_id)?,
        None => SimFlash::new(cli.capacity, cli.jedec_id),
    };

    info!(
        "serving flasher protocol on {} at {} baud",
        cli.port, INITIAL_BAUD_RATE
    );
    let mut session = Session::new(transport, flash, SleepDelay);
    session.run()
}
