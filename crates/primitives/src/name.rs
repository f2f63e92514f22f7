//! Base-32 packed identifiers.

use std::{fmt, str::FromStr};

use bytes::{Buf, BufMut};
use commonware_codec::{Error as CodecError, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Maximum number of characters in a name.
const MAX_LEN: usize = 13;

/// Errors returned when parsing a [`Name`] from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The string is longer than 13 characters.
    #[error("name `{0}` is longer than 13 characters")]
    TooLong(String),

    /// The string contains a character outside `.12345a-z`.
    #[error("name `{name}` contains invalid character `{ch}`")]
    InvalidChar {
        /// The rejected input.
        name: String,
        /// The offending character.
        ch: char,
    },

    /// The 13th character must be one of `.12345a-j`.
    #[error("name `{0}` has an invalid 13th character")]
    InvalidTail(String),

    /// The string does not survive an encode/decode round trip (e.g. trailing dots).
    #[error("name `{0}` is not in normalized form")]
    NotNormalized(String),
}

/// A 64-bit identifier with a compact base-32 string representation.
///
/// Up to twelve characters from `.12345abcdefghijklmnopqrstuvwxyz` take five
/// bits each, a thirteenth character takes the remaining four bits. Ordering
/// follows the packed integer, which keeps iteration over name-keyed maps
/// deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u64);

impl Name {
    /// The empty name (all dots).
    pub const EMPTY: Self = Self(0);

    /// Wrap a raw packed value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the packed value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns true for the empty name.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

const fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_LEN {
            return Err(NameError::TooLong(s.to_string()));
        }

        let mut value = 0u64;
        for (i, &c) in bytes.iter().enumerate() {
            let symbol = char_to_symbol(c)
                .ok_or_else(|| NameError::InvalidChar { name: s.to_string(), ch: c as char })?;
            if i < MAX_LEN - 1 {
                value |= (symbol & 0x1f) << (64 - 5 * (i + 1));
            } else {
                if symbol > 0x0f {
                    return Err(NameError::InvalidTail(s.to_string()));
                }
                value |= symbol;
            }
        }

        let name = Self(value);
        if name.to_string() != s {
            return Err(NameError::NotNormalized(s.to_string()));
        }
        Ok(name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_LEN {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            out[MAX_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }
        let len = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // Every byte comes from CHARMAP, which is ASCII.
        f.write_str(std::str::from_utf8(&out[..len]).map_err(|_| fmt::Error)?)
    }
}

impl From<Name> for u64 {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl FixedSize for Name {
    const SIZE: usize = 8;
}

impl Write for Name {
    fn write(&self, buf: &mut impl BufMut) {
        self.0.write(buf);
    }
}

impl Read for Name {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &Self::Cfg) -> Result<Self, CodecError> {
        Ok(Self(u64::read(buf)?))
    }
}
