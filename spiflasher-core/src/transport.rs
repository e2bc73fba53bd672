// SPDX-License-Identifier: MIT

//! Seam to the byte-oriented serial transport.

/// Serial transport, as the session engine sees it.
///
/// Reads are polled, never blocking: the engine drains whatever is
/// available each loop iteration. Writes are best-effort; the protocol has
/// no acknowledgement window, so a transport that drops output simply looks
/// to the host like a stalled exchange.
pub trait Transport {
    /// Next received byte, if one is available right now.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue `bytes` for transmission.
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Push any queued output onto the wire.
    fn flush(&mut self);

    /// Reopen the transport at a new baud rate.
    fn set_baud_rate(&mut self, baud: u32);
}
