// SPDX-License-Identifier: MIT

//! File-backed simulated SPI flash chip.
//!
//! Stands in for the real chip driver so the whole protocol can be
//! exercised end to end on a workstation. Out-of-range operations surface
//! as nonzero status codes, the same way a misbehaving chip would.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use spiflasher_core::{FlashDriver, ERASE_BLOCK_SIZE};

const PAGE_SIZE: u32 = 256;

const STATUS_OK: u8 = 0;
/// Operation touched an address past the end of the chip.
const STATUS_ADDR_RANGE: u8 = 1;

pub struct SimFlash {
    mem: Vec<u8>,
    jedec_id: u32,
    status: u8,
    image: Option<PathBuf>,
}

impl SimFlash {
    pub fn new(capacity: u32, jedec_id: u32) -> Self {
        Self {
            mem: vec![0xFF; capacity as usize],
            jedec_id,
            status: STATUS_OK,
            image: None,
        }
    }

    /// Load the chip contents from an image file, starting blank where the
    /// file is missing or shorter than the capacity. Every mutating
    /// operation writes the image back.
    pub fn with_image(path: &Path, capacity: u32, jedec_id: u32) -> Result<Self> {
        let mut flash = Self::new(capacity, jedec_id);
        if path.exists() {
            let data =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let n = data.len().min(flash.mem.len());
            flash.mem[..n].copy_from_slice(&data[..n]);
            debug!("loaded {} bytes from {}", n, path.display());
        }
        flash.image = Some(path.to_path_buf());
        flash.persist();
        Ok(flash)
    }

    fn persist(&self) {
        if let Some(path) = &self.image {
            if let Err(e) = fs::write(path, &self.mem) {
                warn!("failed to persist image {}: {}", path.display(), e);
            }
        }
    }
}

impl FlashDriver for SimFlash {
    fn capacity(&mut self) -> u32 {
        self.mem.len() as u32
    }

    fn jedec_id(&mut self) -> u32 {
        self.jedec_id
    }

    fn max_page(&mut self) -> u32 {
        self.mem.len() as u32 / PAGE_SIZE
    }

    fn erase_block(&mut self, addr: u32) {
        let start = addr as usize;
        if start >= self.mem.len() {
            self.status = STATUS_ADDR_RANGE;
            return;
        }
        let end = (start + ERASE_BLOCK_SIZE as usize).min(self.mem.len());
        self.mem[start..end].fill(0xFF);
        self.status = STATUS_OK;
        debug!("erased block at {}", addr);
        self.persist();
    }

    fn write(&mut self, addr: u32, data: &[u8]) {
        let start = addr as usize;
        let Some(end) = start.checked_add(data.len()).filter(|&e| e <= self.mem.len()) else {
            self.status = STATUS_ADDR_RANGE;
            return;
        };
        self.mem[start..end].copy_from_slice(data);
        self.status = STATUS_OK;
        debug!("wrote {} bytes at {}", data.len(), addr);
        self.persist();
    }

    fn status(&mut self) -> u8 {
        self.status
    }
}
