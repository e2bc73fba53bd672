// SPDX-License-Identifier: MIT

//! Message framer: accumulates raw transport bytes into bounded messages.
//!
//! One byte at a time: a reserved marker byte becomes a state-change event
//! without touching the buffer, the terminator closes the current message,
//! and anything else is appended. The framer never drops bytes silently;
//! running out of room is a [`Fault::MessageOverflow`].

use crate::error::Fault;
use crate::protocol::{State, MESSAGE_MAX_SIZE, MESSAGE_TERMINATOR};

/// What the framer made of one input byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramerEvent {
    /// Byte appended to the in-flight message.
    Consumed,
    /// Reserved marker byte: the session should switch to this state.
    Marker(State),
    /// Terminator seen: a complete message is now pending.
    Complete,
}

/// Fixed-capacity message buffer with framing bookkeeping.
///
/// Holds at most [`MESSAGE_MAX_SIZE`] bytes: a full chunk in its base64
/// form plus slack. The buffer is repopulated from scratch for every
/// message; the payload of the last completed message stays readable until
/// [`MessageBuf::finish`] or [`MessageBuf::reset`].
pub struct MessageBuf {
    buf: [u8; MESSAGE_MAX_SIZE],
    cursor: usize,
    len: usize,
    pending: bool,
}

impl MessageBuf {
    pub const fn new() -> Self {
        Self {
            buf: [0; MESSAGE_MAX_SIZE],
            cursor: 0,
            len: 0,
            pending: false,
        }
    }

    /// Feed one transport byte through the framer.
    pub fn accept(&mut self, byte: u8) -> Result<FramerEvent, Fault> {
        if let Some(state) = State::from_marker(byte) {
            return Ok(FramerEvent::Marker(state));
        }

        if byte == MESSAGE_TERMINATOR {
            self.len = self.cursor;
            self.cursor = 0;
            self.pending = true;
            return Ok(FramerEvent::Complete);
        }

        if self.cursor >= MESSAGE_MAX_SIZE {
            return Err(Fault::MessageOverflow);
        }
        self.buf[self.cursor] = byte;
        self.cursor += 1;
        Ok(FramerEvent::Consumed)
    }

    /// Payload of the most recently completed message.
    pub fn payload(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Whether a completed message is waiting to be dispatched.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending message, re-arming the framer for the next one.
    pub fn finish(&mut self) {
        self.len = 0;
        self.pending = false;
    }

    /// Discard everything, including any half-received message.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.len = 0;
        self.pending = false;
    }
}

impl Default for MessageBuf {
    fn default() -> Self {
        Self::new()
    }
}
