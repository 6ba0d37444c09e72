//! Line-based codec for tokio.
//!
//! Reads newline-terminated IRC lines as raw bytes with the trailing
//! `\r\n` (or bare `\n`) removed. Inbound lines are limited to 512 bytes
//! including the terminator. Outbound lines are written verbatim.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CodecError;

/// Maximum IRC line length including the terminator.
pub const MAX_LINE_LEN: usize = 512;

/// Byte-oriented line codec.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a codec limited to [`MAX_LINE_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove a trailing `\n` and an optional `\r` before it.
fn strip_terminator(mut line: BytesMut) -> Bytes {
    if line.last() == Some(&b'\n') {
        line.truncate(line.len() - 1);
    }
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line.freeze()
}

impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(CodecError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            Ok(Some(strip_terminator(line)))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(CodecError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                // A partial line at EOF is dropped; the peer closed mid-line
                if !src.is_empty() {
                    tracing::debug!(bytes = src.len(), "Discarding unterminated line at EOF");
                    src.clear();
                }
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl Encoder<Bytes> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, line: Bytes, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.extend_from_slice(&line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_complete_line_strips_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some(Bytes::from_static(b"PING :test")));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_bare_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NOTICE * :hi\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Bytes::from_static(b"NOTICE * :hi"))
        );
    }

    #[test]
    fn decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"more\r\nNEXT");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Bytes::from_static(b"PING :more"))
        );
        assert_eq!(&buf[..], b"NEXT");
    }

    #[test]
    fn decode_multiple_lines_in_order() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(":a 001 me :hi\r\n:a 002 me :there\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Bytes::from_static(b":a 001 me :hi"))
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Bytes::from_static(b":a 002 me :there"))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #c :\xff\xfe\r\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Bytes::from_static(b"PRIVMSG #c :\xff\xfe"))
        );
    }

    #[test]
    fn line_of_exactly_max_len_is_accepted() {
        let mut codec = LineCodec::new();
        let mut line = vec![b'a'; MAX_LINE_LEN - 2];
        line.extend_from_slice(b"\r\n");
        let mut buf = BytesMut::from(&line[..]);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.len(), MAX_LINE_LEN - 2);
    }

    #[test]
    fn decode_too_long() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(CodecError::LineTooLong {
                actual: 21,
                limit: 10
            })
        ));
    }

    #[test]
    fn decode_partial_too_long() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("no newline in sight");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::LineTooLong { .. })
        ));
    }

    #[test]
    fn decode_eof_drops_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :x\r\nPAR");
        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some(Bytes::from_static(b"PING :x"))
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_is_verbatim() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode(Bytes::from_static(b"PONG :test\r\n"), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }
}
