// SPDX-License-Identifier: MIT

//! Serial SPI-flash programmer firmware, hosted build.
//!
//! Serves the flasher line protocol on a serial device, backed by a
//! file-based simulated flash chip. A real chip driver plugs in through
//! `spiflasher_core::FlashDriver` without touching the engine.
//!
//! Usage:
//!   spiflasher --port /dev/ttyUSB0
//!   spiflasher --port /dev/ttyUSB0 --image chip.bin --capacity 16777216

mod cli;
mod serial;
mod sim_flash;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::Cli::parse();
    cli::run(args)
}
