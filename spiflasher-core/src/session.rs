// SPDX-License-Identifier: MIT

//! The session: command dispatch, flash orchestration, fault supervision.
//!
//! One `Session` lives for the whole program. A single cooperative loop
//! drains transport bytes through the framer, then dispatches at most one
//! pending message to the handler selected by the current state. Handlers
//! run to completion; the protocol is strictly half-duplex, so nothing else
//! ever touches the session concurrently.

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{debug, info, warn};

use crate::chunk::{decode_uint, ChunkBuf};
use crate::error::Fault;
use crate::flash::{erase_block_count, FlashDriver};
use crate::framer::{FramerEvent, MessageBuf};
use crate::protocol::{State, ERASE_BLOCK_SIZE, INITIAL_BAUD_RATE, MAX_BAUD_RATE};
use crate::transport::Transport;

/// Delay before a supervisor reset reopens the transport, letting the host
/// finish reading whatever is still in flight at the old rate.
const RESET_SETTLE_MS: u32 = 1000;

/// Idle delay per loop iteration so the poll loop does not saturate the CPU.
const LOOP_IDLE_MS: u32 = 1;

/// The single long-lived context for one flashing conversation.
pub struct Session<T, F, D> {
    transport: T,
    flash: F,
    delay: D,

    state: State,
    capacity: u32,
    file_size: u32,
    erase_requested: bool,
    write_requested: bool,
    offset: u32,

    msg: MessageBuf,
    chunk: ChunkBuf,
}

impl<T: Transport, F: FlashDriver, D: DelayNs> Session<T, F, D> {
    /// Build a session around its collaborators, querying the device
    /// capacity once. The capacity bounds file-size and chunk-offset checks
    /// for the rest of the program's life.
    pub fn new(transport: T, mut flash: F, delay: D) -> Self {
        let capacity = flash.capacity();
        info!("flash capacity: {} bytes", capacity);
        Self {
            transport,
            flash,
            delay,
            state: State::Idle,
            capacity,
            file_size: 0,
            erase_requested: false,
            write_requested: false,
            offset: 0,
            msg: MessageBuf::new(),
            chunk: ChunkBuf::new(),
        }
    }

    /// The firmware main loop. Never returns; the only exits are power
    /// cycle or a host-issued reset command, which cycles the session
    /// rather than ending it.
    pub fn run(&mut self) -> ! {
        loop {
            self.service();
            self.delay.delay_ms(LOOP_IDLE_MS);
        }
    }

    /// One loop iteration: drain available bytes, then dispatch a pending
    /// message if the framer completed one.
    pub fn service(&mut self) {
        self.drain_serial();
        if self.msg.pending() {
            self.dispatch();
        }
    }

    fn drain_serial(&mut self) {
        while let Some(byte) = self.transport.read_byte() {
            match self.msg.accept(byte) {
                Ok(FramerEvent::Marker(state)) => {
                    debug!("marker {:?} -> {:?}", byte as char, state);
                    self.state = state;
                }
                Ok(FramerEvent::Consumed) | Ok(FramerEvent::Complete) => {}
                Err(fault) => self.fail(fault),
            }
        }
    }

    /// Route the pending message to the handler for the current state.
    ///
    /// The state itself is sticky: it only changes when the framer sees the
    /// next marker byte or the supervisor resets the session.
    fn dispatch(&mut self) {
        debug!(
            "dispatch {:?} ({} payload bytes)",
            self.state,
            self.msg.payload().len()
        );

        let result = match self.state {
            State::Idle => Ok(()),
            State::SetBaud => self.handle_set_baud(),
            State::SetErase => {
                self.erase_requested = decode_uint(self.msg.payload()) != 0;
                Ok(())
            }
            State::SetWrite => {
                self.write_requested = decode_uint(self.msg.payload()) != 0;
                Ok(())
            }
            State::SetFileSize => self.handle_set_file_size(),
            State::RecvChunk => self.handle_recv_chunk(),
            State::DoErase => self.erase_chip(),
            State::DoWrite => self.handle_do_write(),
            State::Reset => {
                self.reset();
                Ok(())
            }
            State::QueryInfo => {
                self.handle_query_info();
                Ok(())
            }
        };

        match result {
            Ok(()) => self.msg.finish(),
            Err(fault) => self.fail(fault),
        }
    }

    fn handle_set_baud(&mut self) -> Result<(), Fault> {
        let baud = decode_uint(self.msg.payload());
        if baud > MAX_BAUD_RATE {
            return Err(Fault::BaudOutOfRange(baud));
        }
        info!("reopening transport at {} baud", baud);
        self.transport.set_baud_rate(baud);
        Ok(())
    }

    fn handle_set_file_size(&mut self) -> Result<(), Fault> {
        let size = decode_uint(self.msg.payload());
        if size > self.capacity {
            return Err(Fault::FileTooLarge);
        }
        self.file_size = size;
        Ok(())
    }

    /// Decode the payload into the chunk buffer and report its digest.
    ///
    /// The chunk stays staged until a write consumes it or the next
    /// submission replaces it; the host resends the same chunk command on a
    /// digest mismatch.
    fn handle_recv_chunk(&mut self) -> Result<(), Fault> {
        let n = self.chunk.decode_from(self.msg.payload())?;
        debug!("staged {} byte chunk", n);
        let digest = self.chunk.digest();
        self.report(format_args!("@{:x}", digest));
        Ok(())
    }

    fn handle_do_write(&mut self) -> Result<(), Fault> {
        let result = self.write_chunk();
        // The staged chunk is spent whether or not the write landed.
        self.chunk.clear();
        result
    }

    /// Program the staged chunk at the current offset. The offset advances
    /// only on success, so a failed write can be retried at the same spot
    /// after the host renegotiates.
    fn write_chunk(&mut self) -> Result<(), Fault> {
        let len = self.chunk.len() as u32;
        self.flash.write(self.offset, self.chunk.bytes());
        let status = self.flash.status();
        if status != 0 {
            return Err(Fault::WriteFailed {
                offset: self.offset,
                status,
            });
        }
        self.report(format_args!("#W_OK"));
        self.transport.flush();
        self.offset += len;
        Ok(())
    }

    /// Erase the whole device, block by block, checking the driver status
    /// after each block.
    fn erase_chip(&mut self) -> Result<(), Fault> {
        self.report(format_args!("#Erasing chip..."));
        self.transport.flush();

        let blocks = erase_block_count(self.capacity);
        info!("erasing {} blocks of {} bytes", blocks, ERASE_BLOCK_SIZE);

        for block in 0..blocks {
            let addr = block * ERASE_BLOCK_SIZE;
            self.flash.erase_block(addr);
            let status = self.flash.status();
            if status != 0 {
                return Err(Fault::EraseFailed { addr, status });
            }
            self.delay.delay_ms(1);
        }

        self.report(format_args!("#Chip erased"));
        Ok(())
    }

    /// Report device identity and geometry. A zero JEDEC id means the chip
    /// is not answering; that is worth a diagnostic but costs no session
    /// state, so it does not trigger a reset.
    fn handle_query_info(&mut self) {
        let jedec = self.flash.jedec_id();
        if jedec == 0 {
            warn!("flash identity read returned 0");
            self.report(format_args!(
                "!ERROR: Connection to flash failed; check wiring."
            ));
            return;
        }

        self.report(format_args!("#JEDEC ID: 0x{:X}", jedec));
        self.report(format_args!("#Man ID: 0x{:X}", (jedec >> 16) as u8));
        self.report(format_args!("#Memory ID: 0x{:X}", (jedec >> 8) as u8));
        let capacity = self.capacity;
        self.report(format_args!("#Capacity: {}", capacity));
        let pages = self.flash.max_page();
        self.report(format_args!("#Max Pages: {}", pages));
    }

    /// Supervisor entry point: report the fault, then cycle the session.
    fn fail(&mut self, fault: Fault) {
        warn!("session fault: {}", fault);
        self.report(format_args!("!ERROR: {}", fault));
        self.reset();
    }

    /// Restore the session to its initial state and reopen the transport at
    /// the initial rate. Any mid-session rate change is undone; the host
    /// must renegotiate after a fault.
    pub fn reset(&mut self) {
        // Settle so the host can finish reading at the old rate.
        self.delay.delay_ms(RESET_SETTLE_MS);
        self.transport.set_baud_rate(INITIAL_BAUD_RATE);

        self.state = State::Idle;
        self.erase_requested = false;
        self.write_requested = false;
        self.file_size = 0;
        self.msg.reset();
        // The write offset survives: a host that hit a transient fault can
        // renegotiate and keep appending where it left off.
    }

    // --- accessors, mainly for wiring code and tests ---

    pub fn state(&self) -> State {
        self.state
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn erase_requested(&self) -> bool {
        self.erase_requested
    }

    pub fn write_requested(&self) -> bool {
        self.write_requested
    }

    /// Length of the currently staged chunk, in bytes.
    pub fn staged_len(&self) -> usize {
        self.chunk.len()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    fn report(&mut self, args: fmt::Arguments<'_>) {
        let mut line: String<128> = String::new();
        if fmt::write(&mut line, args).is_err() {
            warn!("response line truncated");
        }
        self.transport.write_bytes(line.as_bytes());
        self.transport.write_bytes(b"\n");
    }
}
