//! `Accept-Encoding` parsing
//!
//! Only bare content-coding names separated by commas are understood.
//! Quality values (`;q=0.5`), `identity` and `*` make the whole value
//! unparseable.

use crate::{
    bytes::{buffer::ByteBuffer, charset::SP, slice::ByteSlice},
    errors::EncodingError,
};
use std::{fmt, ops};
use tracing::{debug, trace};

/// Initial size of the token scratch buffer. Longer tokens still parse.
const ENCODING_BUFFER_SIZE: usize = 16;

/// Set of content codings a client accepts.
///
/// # Examples
///
/// ```
/// use cell_http::{ByteSlice, EncodingSet};
///
/// let set = EncodingSet::parse(ByteSlice::from("gzip, deflate, br")).unwrap();
///
/// assert_eq!(set, EncodingSet::GZIP | EncodingSet::DEFLATE | EncodingSet::BROTLI);
/// assert!(set.contains(EncodingSet::GZIP));
/// assert!(!set.contains(EncodingSet::ZSTD));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct EncodingSet(u8);

impl EncodingSet {
    pub const NONE: Self = Self(0);
    pub const DEFLATE: Self = Self(1 << 0);
    pub const GZIP: Self = Self(1 << 1);
    pub const BROTLI: Self = Self(1 << 2);
    pub const ZSTD: Self = Self(1 << 3);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::GZIP, "gzip"),
        (Self::DEFLATE, "deflate"),
        (Self::BROTLI, "br"),
        (Self::ZSTD, "zstd"),
    ];

    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every coding of `other` is in `self`.
    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline(always)]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Resolves a single content-coding name. Matching is case-sensitive.
    #[inline]
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"gzip" => Some(Self::GZIP),
            b"deflate" => Some(Self::DEFLATE),
            b"br" => Some(Self::BROTLI),
            b"zstd" => Some(Self::ZSTD),
            _ => None,
        }
    }

    /// Parses a header value like `gzip, deflate, br`.
    ///
    /// Spaces are allowed only after a comma. An unknown or empty token
    /// rejects the whole value.
    pub fn parse(value: ByteSlice<'_>) -> Result<Self, EncodingError> {
        let bytes = value.as_bytes();
        let mut token = ByteBuffer::with_capacity(ENCODING_BUFFER_SIZE);
        let mut state = State::GetEncoding;
        let mut set = Self::NONE;
        let mut cursor = 0;

        loop {
            let byte = bytes.get(cursor).copied();

            match (state, byte) {
                (State::GetEncoding, None | Some(b',')) => {
                    let Some(coding) = Self::from_token(token.as_bytes()) else {
                        debug!(token = %token, "unknown content coding");
                        return Err(EncodingError::UnknownCoding(
                            String::from_utf8_lossy(token.as_bytes()).into_owned(),
                        ));
                    };
                    trace!(token = %token, "accepted content coding");
                    set.insert(coding);

                    if byte.is_none() {
                        return Ok(set);
                    }
                    token.clear();
                    state = State::EatSpaces;
                }
                (State::GetEncoding, Some(SP)) => {
                    debug!(offset = cursor, "space inside content coding");
                    return Err(EncodingError::UnexpectedSpace { offset: cursor });
                }
                (State::GetEncoding, Some(byte)) => token.push(byte),

                (State::EatSpaces, Some(SP)) => {}
                (State::EatSpaces, None) => return Ok(set),
                (State::EatSpaces, Some(_)) => {
                    // Reprocess this byte as the start of the next token
                    state = State::GetEncoding;
                    continue;
                }
            }

            cursor += 1;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    GetEncoding,
    EatSpaces,
}

impl ops::BitOr for EncodingSet {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for EncodingSet {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Debug for EncodingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("EncodingSet(NONE)");
        }

        f.write_str("EncodingSet(")?;
        let mut first = true;
        for (coding, name) in Self::NAMES {
            if self.contains(coding) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}
