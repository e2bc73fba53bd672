// SPDX-License-Identifier: MIT

//! Session protocol engine for a serial SPI-flash programmer.
//!
//! A host drives an attached SPI flash chip through this firmware using a
//! line-oriented serial protocol: a single marker byte selects a command,
//! an optional base64 payload carries its argument, and a newline closes the
//! message. The firmware answers with prefixed text lines (`!` error,
//! `@` digest to verify, `#` information).
//!
//! This crate holds the transport-independent half: message framing, the
//! command state machine, chunk decode/verify bookkeeping, and the fault
//! supervisor. The physical flash driver and the serial port plug in through
//! the [`FlashDriver`] and [`Transport`] traits, so the engine runs the same
//! on a microcontroller UART or against mocks on a host.
//!
//! This crate supports both `no_std` (embedded) and `std` environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: enables `std` in the codec dependencies for host tools

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chunk;
pub mod error;
pub mod flash;
pub mod framer;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use chunk::ChunkBuf;
pub use error::Fault;
pub use flash::FlashDriver;
pub use framer::{FramerEvent, MessageBuf};
pub use protocol::State;
pub use protocol::{DATA_CHUNK_SIZE, ERASE_BLOCK_SIZE, MESSAGE_MAX_SIZE};
pub use protocol::{INITIAL_BAUD_RATE, MAX_BAUD_RATE, MESSAGE_TERMINATOR};
pub use protocol::{PREFIX_DIGEST, PREFIX_ERROR, PREFIX_INFO};
pub use session::Session;
pub use transport::Transport;
