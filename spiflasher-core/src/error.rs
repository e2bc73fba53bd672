// SPDX-License-Identifier: MIT

//! Session-fatal fault conditions.
//!
//! Every variant's `Display` text is part of the host-visible contract: the
//! supervisor reports it verbatim on an `!ERROR: ` line before resetting the
//! session.

use thiserror::Error;

/// Faults that abort the session and trigger a supervisor reset.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// More message bytes arrived than the framing buffer can hold.
    #[error("Message overflowed buffer; did you mean to send '&' (DO_WRITE)?")]
    MessageOverflow,

    /// A chunk payload decoded to zero bytes.
    #[error("Data length was 0 after conversion from base64")]
    EmptyChunk,

    /// A chunk payload decoded to more bytes than the chunk buffer holds.
    #[error("Data length exceeded 2048 bytes after conversion from base64")]
    ChunkTooLarge,

    /// Requested baud rate above the allowed ceiling.
    #[error("Invalid baudrate '{0:X}'")]
    BaudOutOfRange(u32),

    /// Requested file size larger than the device capacity.
    #[error("File size exceeds flash size")]
    FileTooLarge,

    /// The driver reported a nonzero status while erasing a block.
    #[error("Flash error during erase in block at {addr} | Err {status}")]
    EraseFailed { addr: u32, status: u8 },

    /// The driver reported a nonzero status while programming a chunk.
    #[error("Flash error during write in page at {offset} : Err {status}")]
    WriteFailed { offset: u32, status: u8 },
}
