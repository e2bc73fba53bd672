// SPDX-License-Identifier: MIT

//! Chunk transfer engine: base64 decode and MD5 digest of one data chunk.
//!
//! The firmware never compares digests itself. It reports the digest of
//! what it decoded; the host decides whether to resend the chunk or commit
//! it with a write command. The decoded chunk stays staged in this buffer
//! until the next submission or a write consumes it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::Fault;
use crate::protocol::{DATA_CHUNK_SIZE, MESSAGE_MAX_SIZE};

/// Decode scratch size: enough for anything the framer can deliver, so the
/// base64 decoder's conservative output-length estimate never rejects a
/// legal full-size chunk (2048 raw bytes arrive as 2732 characters, which
/// the decoder estimates at 2049 bytes).
const DECODE_BUF_SIZE: usize = MESSAGE_MAX_SIZE.div_ceil(4) * 3;

/// Fixed-capacity buffer holding the most recently decoded chunk.
///
/// At most [`DATA_CHUNK_SIZE`] bytes are ever staged; the extra scratch
/// room only absorbs the decoder's estimate slack.
pub struct ChunkBuf {
    buf: [u8; DECODE_BUF_SIZE],
    len: usize,
}

impl ChunkBuf {
    pub const fn new() -> Self {
        Self {
            buf: [0; DECODE_BUF_SIZE],
            len: 0,
        }
    }

    /// Decode a base64 message payload into the chunk buffer.
    ///
    /// A zero-length result or undecodable input is a decode fault, and a
    /// result larger than [`DATA_CHUNK_SIZE`] an oversize fault; the
    /// previously staged chunk is discarded either way.
    pub fn decode_from(&mut self, encoded: &[u8]) -> Result<usize, Fault> {
        let n = BASE64.decode_slice(encoded, &mut self.buf).unwrap_or(0);
        if n > DATA_CHUNK_SIZE {
            self.len = 0;
            return Err(Fault::ChunkTooLarge);
        }
        self.len = n;
        if n == 0 {
            return Err(Fault::EmptyChunk);
        }
        Ok(n)
    }

    /// The staged chunk bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop the staged chunk (after a write consumed it).
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// MD5 digest over exactly the staged bytes.
    pub fn digest(&self) -> md5::Digest {
        md5::compute(self.bytes())
    }
}

impl Default for ChunkBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a base64 payload as a little-endian unsigned integer.
///
/// Only the first four decoded bytes are significant; an empty or
/// undecodable payload yields 0.
pub fn decode_uint(encoded: &[u8]) -> u32 {
    let mut buf = [0u8; 16];
    let n = BASE64.decode_slice(encoded, &mut buf).unwrap_or(0);
    let mut le = [0u8; 4];
    let take = n.min(4);
    le[..take].copy_from_slice(&buf[..take]);
    u32::from_le_bytes(le)
}
