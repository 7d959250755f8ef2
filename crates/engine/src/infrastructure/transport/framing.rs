//! Stream delimiting: splits the TCP byte stream on `[EOM]`.
//!
//! TCP reads do not line up with messages. [`TerminatorDecoder`] buffers
//! partial input and returns every complete message, terminator included,
//! in arrival order.

use bytes::{Bytes, BytesMut};
use xhaven_shared::TERMINATOR;

use super::TransportError;

const TERMINATOR_BYTES: &[u8] = TERMINATOR.as_bytes();

#[derive(Debug)]
pub struct TerminatorDecoder {
    buf: BytesMut,
    max_frame_bytes: usize,
    /// Buffer offset already known not to start a terminator.
    scanned: usize,
}

impl TerminatorDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_frame_bytes,
            scanned: 0,
        }
    }

    /// Buffers `bytes` and returns every message it completes.
    ///
    /// Fails when a message grows past the size limit; the connection
    /// should then be dropped since the stream position is lost.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Bytes>, TransportError> {
        self.buf.extend_from_slice(bytes);
        let mut messages = Vec::new();

        while let Some(end) = self.find_terminator() {
            if end > self.max_frame_bytes {
                return Err(self.too_long(end));
            }
            messages.push(self.buf.split_to(end).freeze());
            self.scanned = 0;
        }

        if self.buf.len() > self.max_frame_bytes {
            return Err(self.too_long(self.buf.len()));
        }
        Ok(messages)
    }

    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Drops any partial message, e.g. after a reconnect.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }

    /// End offset of the first complete message, if any.
    fn find_terminator(&mut self) -> Option<usize> {
        let found = self.buf[self.scanned..]
            .windows(TERMINATOR_BYTES.len())
            .position(|window| window == TERMINATOR_BYTES)
            .map(|offset| self.scanned + offset + TERMINATOR_BYTES.len());
        if found.is_none() {
            self.scanned = self
                .buf
                .len()
                .saturating_sub(TERMINATOR_BYTES.len() - 1);
        }
        found
    }

    fn too_long(&mut self, length: usize) -> TransportError {
        self.clear();
        TransportError::FrameTooLong {
            length,
            limit: self.max_frame_bytes,
        }
    }
}
