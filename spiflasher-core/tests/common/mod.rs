// SPDX-License-Identifier: MIT

//! Shared mock collaborators for the session integration tests.

use std::collections::VecDeque;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use embedded_hal::delay::DelayNs;
use spiflasher_core::{FlashDriver, Transport, ERASE_BLOCK_SIZE};

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport fed from a script of bytes, recording everything sent back.
#[derive(Default)]
pub struct ScriptTransport {
    rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub baud_changes: Vec<u32>,
}

impl ScriptTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Drain recorded output as newline-terminated lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        let text = String::from_utf8_lossy(&self.tx).into_owned();
        self.tx.clear();
        text.split_terminator('\n').map(str::to_owned).collect()
    }
}

impl Transport for ScriptTransport {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }

    fn flush(&mut self) {}

    fn set_baud_rate(&mut self, baud: u32) {
        self.baud_changes.push(baud);
    }
}

/// In-memory flash chip with injectable failures.
pub struct MockFlash {
    pub mem: Vec<u8>,
    pub jedec: u32,
    pub fail_erase_at: Option<u32>,
    pub fail_writes: bool,
    pub erased_blocks: Vec<u32>,
    status: u8,
}

impl MockFlash {
    pub fn new(capacity: u32) -> Self {
        Self {
            mem: vec![0xFF; capacity as usize],
            jedec: 0x00EF_4018,
            fail_erase_at: None,
            fail_writes: false,
            erased_blocks: Vec::new(),
            status: 0,
        }
    }

    /// A chip that does not answer identity reads.
    pub fn disconnected(capacity: u32) -> Self {
        let mut flash = Self::new(capacity);
        flash.jedec = 0;
        flash
    }
}

impl FlashDriver for MockFlash {
    fn capacity(&mut self) -> u32 {
        self.mem.len() as u32
    }

    fn jedec_id(&mut self) -> u32 {
        self.jedec
    }

    fn max_page(&mut self) -> u32 {
        self.mem.len() as u32 / 256
    }

    fn erase_block(&mut self, addr: u32) {
        self.erased_blocks.push(addr);
        if self.fail_erase_at == Some(addr) {
            self.status = 3;
            return;
        }
        self.status = 0;
        let start = addr as usize;
        if start < self.mem.len() {
            let end = (start + ERASE_BLOCK_SIZE as usize).min(self.mem.len());
            self.mem[start..end].fill(0xFF);
        }
    }

    fn write(&mut self, addr: u32, data: &[u8]) {
        if self.fail_writes {
            self.status = 4;
            return;
        }
        let start = addr as usize;
        let end = start + data.len();
        if end > self.mem.len() {
            self.status = 2;
            return;
        }
        self.status = 0;
        self.mem[start..end].copy_from_slice(data);
    }

    fn status(&mut self) -> u8 {
        self.status
    }
}

/// Delay that does not actually wait (the settle delays are uninteresting
/// on a host).
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Build one framed command: marker, base64 payload, terminator.
pub fn cmd(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![marker];
    out.extend_from_slice(BASE64.encode(payload).as_bytes());
    out.push(b'\n');
    out
}

/// Build a command whose payload is a little-endian u32, as the host
/// encodes integers.
pub fn cmd_u32(marker: u8, value: u32) -> Vec<u8> {
    cmd(marker, &value.to_le_bytes())
}
