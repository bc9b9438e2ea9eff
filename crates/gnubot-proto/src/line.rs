//! Line framing for the gateway byte stream.
//!
//! The gateway terminates lines with `\r\n`, but the framer treats any run of
//! `~`, `\r` or `\n` bytes as one delimiter. Empty fragments are never
//! emitted, so framing gives the same lines however the stream is chunked.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Returns `true` if `byte` belongs to the line terminator class.
#[inline]
pub fn is_terminator(byte: u8) -> bool {
    matches!(byte, b'~' | b'\r' | b'\n')
}

fn terminator_run(buf: &[u8]) -> usize {
    buf.iter().take_while(|b| is_terminator(**b)).count()
}

/// Codec that splits a byte stream into terminator-delimited lines.
///
/// There is no length limit: a peer that never sends a terminator grows the
/// buffer without bound.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Index of next byte to check for a terminator
    next_index: usize,
}

impl LineCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_line(&mut self, src: &mut BytesMut) -> Option<Bytes> {
        // A terminator run may straddle two reads; drop its remainder.
        let lead = terminator_run(src);
        if lead > 0 {
            src.advance(lead);
            self.next_index = self.next_index.saturating_sub(lead);
        }

        match src[self.next_index..].iter().position(|b| is_terminator(*b)) {
            Some(offset) => {
                let line = src.split_to(self.next_index + offset).freeze();
                let run = terminator_run(src);
                src.advance(run);
                self.next_index = 0;
                Some(line)
            }
            None => {
                // No complete line yet - remember where we stopped
                self.next_index = src.len();
                None
            }
        }
    }
}

impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Bytes>> {
        Ok(self.next_line(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<Bytes>> {
        let line = self.next_line(src);
        if line.is_none() {
            // An unterminated tail is never a complete line.
            src.clear();
            self.next_index = 0;
        }
        Ok(line)
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}

/// Standalone framer that owns its buffer.
///
/// Useful outside of `Framed`, e.g. when bytes arrive from a blocking socket
/// or from a test.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
    codec: LineCodec,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `raw` to the buffer and return the lines it completes.
    ///
    /// The returned iterator is lazy: lines are split off the buffer as it is
    /// advanced. Any trailing partial line stays buffered for the next call.
    pub fn feed(&mut self, raw: &[u8]) -> Lines<'_> {
        self.buffer.extend_from_slice(raw);
        Lines { framer: self }
    }

    /// Bytes still waiting for a terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

/// Lazy iterator over the complete lines of a [`LineFramer`].
#[derive(Debug)]
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for Lines<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        let LineFramer { buffer, codec } = &mut *self.framer;
        codec.next_line(buffer)
    }
}
