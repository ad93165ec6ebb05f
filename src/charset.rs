//! Text encodings for reading and writing entries.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A supported text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1 (Latin-1): every byte is the code point of the same value.
    Iso8859_1,
    /// 7-bit US-ASCII.
    UsAscii,
}

impl Charset {
    /// Returns the default charset for an entry path.
    ///
    /// Java properties files are traditionally Latin-1; everything else is
    /// read as UTF-8.
    pub fn default_for(path: &str) -> Self {
        if path.ends_with(".properties") {
            Self::Iso8859_1
        } else {
            Self::Utf8
        }
    }

    /// Returns the canonical name of this charset.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::UsAscii => "US-ASCII",
        }
    }

    /// Decodes `bytes` read from the entry at `path`.
    pub fn decode(self, bytes: Vec<u8>, path: &str) -> Result<String> {
        let invalid = || Error::Decode {
            path: path.to_string(),
            charset: self.name(),
        };
        match self {
            Self::Utf8 => String::from_utf8(bytes).map_err(|_| invalid()),
            Self::Iso8859_1 => Ok(bytes.into_iter().map(char::from).collect()),
            Self::UsAscii => {
                if bytes.is_ascii() {
                    String::from_utf8(bytes).map_err(|_| invalid())
                } else {
                    Err(invalid())
                }
            }
        }
    }

    /// Encodes `text` for writing.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        let limit = match self {
            Self::Utf8 => return Ok(text.as_bytes().to_vec()),
            Self::Iso8859_1 => 0xFF,
            Self::UsAscii => 0x7F,
        };
        text.chars()
            .map(|ch| {
                u8::try_from(u32::from(ch))
                    .ok()
                    .filter(|b| u32::from(*b) <= limit)
                    .ok_or_else(|| Error::Unmappable {
                        charset: self.name(),
                        ch,
                    })
            })
            .collect()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" => Ok(Self::Utf8),
            "iso88591" | "latin1" | "l1" | "cp819" => Ok(Self::Iso8859_1),
            "usascii" | "ascii" => Ok(Self::UsAscii),
            _ => Err(Error::UnknownCharset(s.to_string())),
        }
    }
}
