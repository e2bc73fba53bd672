// SPDX-License-Identifier: MIT

//! Seam to the external flash chip driver.

use crate::protocol::ERASE_BLOCK_SIZE;

/// External SPI flash driver, as the session engine sees it.
///
/// Mirrors the error-flag model of typical SPI memory drivers: erase and
/// write do not return a result, the session polls [`FlashDriver::status`]
/// immediately afterwards and treats any nonzero code as a hardware fault.
/// The electrical and timing details live entirely behind this trait.
pub trait FlashDriver {
    /// Device capacity in bytes. Queried once at session start.
    fn capacity(&mut self) -> u32;

    /// JEDEC identity word (manufacturer/memory/capacity ids).
    /// Zero means the chip did not answer.
    fn jedec_id(&mut self) -> u32;

    /// Number of programmable pages on the device.
    fn max_page(&mut self) -> u32;

    /// Erase one [`ERASE_BLOCK_SIZE`] block starting at `addr`.
    fn erase_block(&mut self, addr: u32);

    /// Program `data` starting at byte address `addr`.
    fn write(&mut self, addr: u32, data: &[u8]);

    /// Status code of the most recent operation; 0 means success.
    fn status(&mut self) -> u8;
}

/// Number of erase blocks needed to cover `capacity` bytes.
pub fn erase_block_count(capacity: u32) -> u32 {
    capacity.div_ceil(ERASE_BLOCK_SIZE)
}
