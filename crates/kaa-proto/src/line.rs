//! Line-based codec for tokio.
//!
//! Inbound, the codec splits the byte stream on `\r\n` and yields each line
//! with the terminator stripped, keeping any partial line buffered until the
//! rest arrives. A line longer than [`MAX_INBOUND_LEN`] is a decode error,
//! which ends the connection. Outbound, it keeps only the first physical line of an item,
//! caps it at [`MAX_OUTBOUND_LEN`] bytes and appends `\r\n`.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// The two-byte sequence that ends every protocol line.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Maximum outbound line length in bytes, terminator excluded.
///
/// Leaves room for the terminator and the prefix the server prepends when
/// relaying, within the 512-byte protocol limit.
pub const MAX_OUTBOUND_LEN: usize = 500;

/// Maximum inbound line length in bytes, terminator included.
pub const MAX_INBOUND_LEN: usize = 512;

/// CRLF line codec.
///
/// Invalid UTF-8 in inbound lines is replaced rather than rejected so that a
/// single bad byte never tears down the connection.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for a terminator.
    next_index: usize,
    /// Maximum outbound line length.
    max_len: usize,
    /// Maximum inbound line length.
    max_inbound: usize,
}

impl LineCodec {
    /// Create a codec with the default limits.
    pub fn new() -> Self {
        Self::with_max_len(MAX_OUTBOUND_LEN)
    }

    /// Create a codec with a custom outbound limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            max_inbound: MAX_INBOUND_LEN,
        }
    }

    /// Set the inbound limit, terminator included.
    pub fn with_max_inbound(mut self, max_inbound: usize) -> Self {
        self.max_inbound = max_inbound;
        self
    }

    fn too_long(&self, actual: usize) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "inbound line of {actual} bytes exceeds {} byte limit",
                self.max_inbound
            ),
        )
    }

    /// Reduce an outbound item to what may go on the wire.
    ///
    /// - Cuts at the first `\r` or `\n`
    /// - Truncates to `max_len` bytes on a character boundary
    pub fn sanitize(line: &str, max_len: usize) -> &str {
        let first = line.split(['\r', '\n']).next().unwrap_or_default();
        if first.len() <= max_len {
            return first;
        }

        let mut end = max_len;
        while !first.is_char_boundary(end) {
            end -= 1;
        }
        &first[..end]
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        // Back up one byte: a `\r` may have ended the previous chunk.
        let start = self.next_index.saturating_sub(1).min(src.len());

        match src[start..]
            .windows(LINE_TERMINATOR.len())
            .position(|window| window == LINE_TERMINATOR)
        {
            Some(offset) => {
                let end = start + offset;
                if end + LINE_TERMINATOR.len() > self.max_inbound {
                    return Err(self.too_long(end + LINE_TERMINATOR.len()));
                }
                let frame = src.split_to(end + LINE_TERMINATOR.len());
                self.next_index = 0;
                Ok(Some(String::from_utf8_lossy(&frame[..end]).into_owned()))
            }
            None => {
                // A peer that never sends a terminator must not grow the buffer.
                if src.len() > self.max_inbound {
                    return Err(self.too_long(src.len()));
                }
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        if !src.is_empty() {
            trace!(bytes = src.len(), "discarding partial line at end of stream");
            src.clear();
        }
        self.next_index = 0;
        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> io::Result<()> {
        let line = Self::sanitize(&line, self.max_len);
        dst.reserve(line.len() + LINE_TERMINATOR.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(LINE_TERMINATOR);
        Ok(())
    }
}
