// SPDX-License-Identifier: MIT

//! Wire protocol constants and the session state machine states.
//!
//! Host -> firmware messages are `<marker><base64 payload>\n`. The marker
//! byte selects the session state immediately; the payload is acted on once
//! the terminator closes the message. Firmware -> host lines carry a prefix
//! identifying their kind.

/// Maximum decoded size of one data chunk, in bytes.
pub const DATA_CHUNK_SIZE: usize = 2048;

/// Maximum length of one framed message: a full chunk in base64 plus slack.
/// base64 expands 3 raw bytes to 4 characters.
pub const MESSAGE_MAX_SIZE: usize = DATA_CHUNK_SIZE * 4 / 3 + 5;

/// Baud rate the transport opens at, and returns to after any fault.
pub const INITIAL_BAUD_RATE: u32 = 9600;

/// Highest baud rate the host may negotiate.
pub const MAX_BAUD_RATE: u32 = 921_600;

/// Erase granule the orchestrator steps the device in (32 KiB blocks).
pub const ERASE_BLOCK_SIZE: u32 = 32_768;

/// Byte that closes a framed message.
pub const MESSAGE_TERMINATOR: u8 = b'\n';

/// Firmware -> host line prefix: error/diagnostic.
pub const PREFIX_ERROR: u8 = b'!';
/// Firmware -> host line prefix: chunk digest for the host to verify.
pub const PREFIX_DIGEST: u8 = b'@';
/// Firmware -> host line prefix: informational/status.
pub const PREFIX_INFO: u8 = b'#';

/// Session operating states, one per host command.
///
/// `Idle` is both the initial state and the quiescent state between
/// commands; none of the states is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    SetBaud,
    SetErase,
    SetWrite,
    SetFileSize,
    RecvChunk,
    DoErase,
    DoWrite,
    Reset,
    QueryInfo,
}

impl State {
    /// Map a reserved command marker byte to its state.
    ///
    /// Returns `None` for ordinary message bytes.
    pub fn from_marker(byte: u8) -> Option<State> {
        Some(match byte {
            b'!' => State::SetBaud,
            b'@' => State::SetErase,
            b'#' => State::SetWrite,
            b'$' => State::SetFileSize,
            b'%' => State::RecvChunk,
            b'^' => State::DoErase,
            b'&' => State::DoWrite,
            b'*' => State::Reset,
            b'(' => State::QueryInfo,
            _ => return None,
        })
    }
}
