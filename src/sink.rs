//! Character sinks

use crate::charset::{encode_utf16, Charset, Endian};
use crate::error::Result;
use encoding_rs::{Encoder, EncoderResult};
use std::io::Write;

const ENCODE_THRESHOLD: usize = 8192;

/// Ordered character output
pub trait CharSink {
    /// Write a run of characters
    fn write_str(&mut self, s: &str) -> Result<()>;

    /// Write one character
    fn write_char(&mut self, c: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf))
    }

    /// Push buffered output to the underlying destination
    fn flush(&mut self) -> Result<()>;
}

impl<K: CharSink + ?Sized> CharSink for &mut K {
    fn write_str(&mut self, s: &str) -> Result<()> {
        (**self).write_str(s)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl CharSink for String {
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Encodes characters into a byte stream with the output charset
///
/// Characters the charset cannot represent are written as `?`.
pub struct EncodingSink<W: Write> {
    inner: W,
    encoder: Option<Encoder>,
    utf16: Option<Endian>,
    pending: String,
    bytes: Vec<u8>,
}

impl<W: Write> EncodingSink<W> {
    /// Wrap `inner`, encoding with `charset`
    pub fn new(inner: W, charset: Charset) -> Self {
        let utf16 = charset.utf16_endianness();
        EncodingSink {
            inner,
            encoder: match utf16 {
                Some(_) => None,
                None => Some(charset.encoding().new_encoder()),
            },
            utf16,
            pending: String::with_capacity(ENCODE_THRESHOLD),
            bytes: Vec::with_capacity(ENCODE_THRESHOLD),
        }
    }

    /// Encode the tail with end-of-stream semantics, flush and return the writer
    pub fn finish(mut self) -> Result<W> {
        self.encode_pending(true)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn encode_pending(&mut self, last: bool) -> Result<()> {
        self.bytes.clear();
        match (self.utf16, self.encoder.as_mut()) {
            (Some(endian), _) => self.bytes = encode_utf16(&self.pending, endian),
            (None, Some(encoder)) => encode_into(encoder, &self.pending, &mut self.bytes, last),
            (None, None) => {}
        }
        self.pending.clear();
        if !self.bytes.is_empty() {
            self.inner.write_all(&self.bytes)?;
        }
        Ok(())
    }
}

fn encode_into(encoder: &mut Encoder, text: &str, dst: &mut Vec<u8>, last: bool) {
    let mut src = text;
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(src.len())
            .unwrap_or(src.len() * 4 + 16);
        dst.reserve(needed);
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(src, dst, last);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(_) => dst.push(b'?'),
        }
    }
}

impl<W: Write> CharSink for EncodingSink<W> {
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.pending.push_str(s);
        if self.pending.len() >= ENCODE_THRESHOLD {
            self.encode_pending(false)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.encode_pending(false)?;
        self.inner.flush()?;
        Ok(())
    }
}
