// SPDX-License-Identifier: MIT

//! Polled serial transport over a host serial port.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use serialport::SerialPort;
use spiflasher_core::Transport;

/// Read timeout for the single-byte poll; short enough to keep the control
/// loop responsive, long enough to avoid spinning.
const POLL_TIMEOUT: Duration = Duration::from_millis(5);

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud)
            .timeout(POLL_TIMEOUT)
            .open()
            .with_context(|| format!("Failed to open serial port {}", port_name))?;
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => None,
            Err(e) => {
                warn!("serial read error: {}", e);
                None
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        if let Err(e) = self.port.write_all(bytes) {
            warn!("serial write error: {}", e);
        }
    }

    fn flush(&mut self) {
        let _ = self.port.flush();
    }

    fn set_baud_rate(&mut self, baud: u32) {
        if let Err(e) = self.port.set_baud_rate(baud) {
            warn!("failed to switch to {} baud: {}", baud, e);
        }
    }
}
