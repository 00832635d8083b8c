//! Line framing for the IRC byte stream.
//!
//! The terminator is searched for on raw bytes, and only the byte range in
//! front of it is decoded as UTF-8, so a multi-byte character can never be
//! split by a chunk boundary.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::error::FramerError;

/// Protocol line terminator.
pub const CRLF: &[u8] = b"\r\n";

/// Tokio codec that splits on CR-LF and appends it on the way out.
///
/// There is no length limit unless one is set with [`LineCodec::with_max_len`]:
/// a peer that never sends a terminator grows the read buffer without bound.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Index of the next byte to search from
    next_index: usize,
    max_len: Option<usize>,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`FramerError::LineTooLong`] once a line payload exceeds
    /// `max_len` bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: Some(max_len),
        }
    }

    fn check_len(&self, actual: usize) -> Result<(), FramerError> {
        match self.max_len {
            Some(limit) if actual > limit => Err(FramerError::LineTooLong { actual, limit }),
            _ => Ok(()),
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = FramerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, FramerError> {
        // Back up one byte: the CR may have arrived at the end of the last read.
        let start = self.next_index.saturating_sub(1).min(src.len());

        match src[start..].windows(CRLF.len()).position(|w| w == CRLF) {
            Some(offset) => {
                let end = start + offset;
                let line = src.split_to(end + CRLF.len());
                self.next_index = 0;
                self.check_len(end)?;
                Ok(Some(String::from_utf8_lossy(&line[..end]).into_owned()))
            }
            None => {
                self.next_index = src.len();
                let pending = if src.ends_with(b"\r") {
                    src.len() - 1
                } else {
                    src.len()
                };
                self.check_len(pending)?;
                Ok(None)
            }
        }
    }

    /// An unterminated tail at end of stream is dropped, so the close still
    /// counts as clean.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, FramerError> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if !src.is_empty() {
            debug!(pending = src.len(), "dropping unterminated line at end of stream");
            src.clear();
        }
        self.next_index = 0;
        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = FramerError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), FramerError> {
        dst.reserve(line.len() + CRLF.len());
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(CRLF);
        Ok(())
    }
}

/// Push-style framer: feed raw chunks in, get complete lines out.
///
/// Partial trailing bytes are carried over to the next [`LineFramer::feed`].
/// A fresh framer is used for every connection.
#[derive(Debug, Default)]
pub struct LineFramer {
    codec: LineCodec,
    buffer: BytesMut,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: LineCodec) -> Self {
        Self {
            codec,
            buffer: BytesMut::new(),
        }
    }

    /// Append `bytes` and return every line completed by them, in order,
    /// with the terminator stripped.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>, FramerError> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(line) = self.codec.decode(&mut self.buffer)? {
            lines.push(line);
        }
        Ok(lines)
    }

    /// Number of buffered bytes not yet resolved into a line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
