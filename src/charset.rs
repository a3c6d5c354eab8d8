//! Charset resolution on top of `encoding_rs`

use crate::error::{Result, TranscodeError};
use encoding_rs::{Decoder, Encoding};
use std::fmt;

/// Common vendor labels the WHATWG registry does not know
const EXTRA_LABELS: &[(&str, &str)] = &[
    ("cp949", "euc-kr"),
    ("ms949", "euc-kr"),
    ("x-windows-949", "euc-kr"),
    ("utf-16", "utf-16be"),
    ("utf8", "utf-8"),
];

/// A resolved character set, independently configurable for input and output
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    /// UTF-8
    pub fn utf8() -> Self {
        Charset {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Resolve a charset label such as `UTF-8`, `CP949` or `windows-1252`
    ///
    /// # Examples
    ///
    /// ```
    /// use delimstream::charset::Charset;
    ///
    /// let cs = Charset::for_label("CP949").unwrap();
    /// assert_eq!(cs.name(), "EUC-KR");
    /// ```
    pub fn for_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let effective = EXTRA_LABELS
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, target)| *target)
            .unwrap_or(lowered.as_str());

        Encoding::for_label(effective.as_bytes())
            .map(|encoding| Charset { encoding })
            .ok_or_else(|| TranscodeError::UnknownCharset(trimmed.to_string()))
    }

    /// Canonical name of the charset
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Underlying `encoding_rs` encoding
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether output in this charset is UTF-16 (encoding_rs only decodes UTF-16)
    pub(crate) fn utf16_endianness(&self) -> Option<Endian> {
        if self.encoding == encoding_rs::UTF_16LE {
            Some(Endian::Little)
        } else if self.encoding == encoding_rs::UTF_16BE {
            Some(Endian::Big)
        } else {
            None
        }
    }

    /// Decoder that leaves a byte-order mark in the character stream
    pub(crate) fn decoder(&self) -> Decoder {
        self.encoding.new_decoder_without_bom_handling()
    }

    /// Encode a whole string (used by tests and diagnostics)
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self.utf16_endianness() {
            Some(endian) => encode_utf16(text, endian),
            None => {
                let (bytes, _, _) = self.encoding.encode(text);
                bytes.into_owned()
            }
        }
    }

    /// Decode a whole byte slice, replacing malformed sequences
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = self.encoding.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::utf8()
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

pub(crate) fn encode_utf16(text: &str, endian: Endian) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        let bytes = match endian {
            Endian::Little => unit.to_le_bytes(),
            Endian::Big => unit.to_be_bytes(),
        };
        out.extend_from_slice(&bytes);
    }
    out
}

#[cfg(feature = "serde")]
impl serde::Serialize for Charset {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Charset {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = <String as serde::Deserialize>::deserialize(deserializer)?;
        Charset::for_label(&label).map_err(serde::de::Error::custom)
    }
}
