//! Character sources with push-back
//!
//! The parser looks ahead while matching multi-character delimiters and
//! closing quotes, then hands back whatever it did not use. Every source
//! therefore supports `unread`, which makes the given characters the next
//! ones returned, in their original order.

use crate::charset::Charset;
use crate::error::Result;
use encoding_rs::{CoderResult, Decoder};
use std::io::{ErrorKind, Read};

const READ_BUFFER_SIZE: usize = 8192;

/// Ordered character input with push-back
pub trait CharSource {
    /// Next character, or `None` at end of input
    fn read_char(&mut self) -> Result<Option<char>>;

    /// Append up to `max` characters to `buf`, returning how many were read
    ///
    /// Fewer than `max` means the input ended.
    fn read_chars(&mut self, buf: &mut Vec<char>, max: usize) -> Result<usize> {
        let mut read = 0;
        while read < max {
            match self.read_char()? {
                Some(c) => {
                    buf.push(c);
                    read += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }

    /// Push characters back so they are read again, first one first
    fn unread(&mut self, chars: &[char]);
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn read_char(&mut self) -> Result<Option<char>> {
        (**self).read_char()
    }

    fn read_chars(&mut self, buf: &mut Vec<char>, max: usize) -> Result<usize> {
        (**self).read_chars(buf, max)
    }

    fn unread(&mut self, chars: &[char]) {
        (**self).unread(chars)
    }
}

/// Decodes a byte stream incrementally into characters
///
/// Malformed input is replaced with U+FFFD. A byte-order mark is not
/// removed here; the pipeline decides what to do with it.
pub struct DecodingSource<R: Read> {
    inner: R,
    decoder: Decoder,
    bytes: Vec<u8>,
    text: String,
    pos: usize,
    pushback: Vec<char>,
    eof: bool,
}

impl<R: Read> DecodingSource<R> {
    /// Wrap `inner`, decoding with `charset`
    pub fn new(inner: R, charset: Charset) -> Self {
        DecodingSource {
            inner,
            decoder: charset.decoder(),
            bytes: vec![0; READ_BUFFER_SIZE],
            text: String::with_capacity(READ_BUFFER_SIZE),
            pos: 0,
            pushback: Vec::new(),
            eof: false,
        }
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> Result<()> {
        let n = loop {
            match self.inner.read(&mut self.bytes) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        let last = n == 0;

        self.text.clear();
        self.pos = 0;

        let mut consumed = 0;
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(n - consumed)
                .unwrap_or((n - consumed) * 3 + 16);
            self.text.reserve(needed);
            let (result, read, _) =
                self.decoder
                    .decode_to_string(&self.bytes[consumed..n], &mut self.text, last);
            consumed += read;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }

        if last {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> CharSource for DecodingSource<R> {
    fn read_char(&mut self) -> Result<Option<char>> {
        if let Some(c) = self.pushback.pop() {
            return Ok(Some(c));
        }
        loop {
            if let Some(c) = self.text[self.pos..].chars().next() {
                self.pos += c.len_utf8();
                return Ok(Some(c));
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    fn unread(&mut self, chars: &[char]) {
        self.pushback.extend(chars.iter().rev());
    }
}
