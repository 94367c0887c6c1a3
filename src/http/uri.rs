//! Request target parsing and percent-decoding
//!
//! Only the origin form is supported: `/` followed by a path and an optional
//! query string.
//!
//! # Query semantics
//!
//! | Target               | Queries                      |
//! |----------------------|------------------------------|
//! | `/?a=1&b=2`          | `("a", "1"), ("b", "2")`     |
//! | `/?flag`             | `("flag", "")`               |
//! | `/?a=1&a=2`          | `("a", "2")`                 |
//! | `/?a=1&&b=2`         | `("a", "1"), ("b", "2")`     |
//! | `/?=v`               | `("", "v")`                  |
//! | `/?q=a%20b`          | `("q", "a b")`               |
//!
//! Keys are stored as written, values are percent-decoded.

use crate::{
    bytes::{buffer::ByteBuffer, charset, scanner::Scanner, slice::ByteSlice},
    errors::{DecodeError, UriError},
    http::headers::HeaderTable,
    limits::ReqLimits,
};
use memchr::memchr;
use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    GetType,
    GetPath,
    GetQueryKey,
    GetQueryValue,
}

/// Form of the request target
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum UriType {
    /// Origin form, `/path?query`
    #[default]
    Relative,
    /// Anything else. Rejected by the parser.
    Absolute,
}

/// Parsed request target.
///
/// The path is stored without its leading `/`, both raw and percent-decoded.
///
/// # Examples
///
/// ```
/// use cell_http::Uri;
///
/// let mut uri = Uri::from_target(b"/search/caf%C3%A9?q=rust%20lang&page=2");
/// uri.parse().unwrap();
///
/// assert_eq!(uri.path_raw(), "search/caf%C3%A9");
/// assert_eq!(uri.path_str(), Some("search/café"));
/// assert_eq!(uri.query_str("q"), Some("rust lang"));
/// assert_eq!(uri.query_str("page"), Some("2"));
/// ```
#[derive(Debug, Clone)]
pub struct Uri {
    raw: ByteBuffer,
    parts: Parts,
}

// Everything derived from `raw`, kept apart so parsing can borrow `raw`
// while writing here.
#[derive(Debug, Clone)]
struct Parts {
    state: State,
    uri_type: UriType,

    path: ByteBuffer,
    path_decoded: ByteBuffer,

    query_key: ByteBuffer,
    query_value: ByteBuffer,
    query_value_decoded: ByteBuffer,
    queries: HeaderTable,
}

impl Uri {
    #[inline]
    pub fn new() -> Self {
        Self::with_limits(&ReqLimits::default())
    }

    pub fn with_limits(limits: &ReqLimits) -> Self {
        Self {
            raw: ByteBuffer::with_capacity(limits.uri_capacity),
            parts: Parts {
                state: State::GetType,
                uri_type: UriType::default(),

                path: ByteBuffer::with_capacity(limits.path_capacity),
                path_decoded: ByteBuffer::with_capacity(limits.path_capacity),

                query_key: ByteBuffer::with_capacity(limits.query_key_capacity),
                query_value: ByteBuffer::with_capacity(limits.query_value_capacity),
                query_value_decoded: ByteBuffer::with_capacity(limits.query_value_capacity),
                queries: HeaderTable::with_capacity(limits.query_count),
            },
        }
    }

    /// Creates an unparsed `Uri` holding a copy of `target`.
    pub fn from_target(target: &[u8]) -> Self {
        let mut uri = Self::new();
        uri.set_target(target);
        uri
    }

    /// Replaces the raw target and discards previous parse results.
    pub fn set_target(&mut self, target: &[u8]) {
        self.clear();
        self.raw.extend_from_slice(target);
    }

    #[inline(always)]
    pub(crate) fn push_target_byte(&mut self, byte: u8) {
        self.raw.push(byte);
    }

    pub(crate) fn clear(&mut self) {
        self.raw.clear();
        self.parts.reset();
    }
}

// Public API
impl Uri {
    /// Returns the request target exactly as received.
    #[inline(always)]
    pub fn target(&self) -> ByteSlice<'_> {
        self.raw.as_slice()
    }

    #[inline]
    pub fn target_str(&self) -> Option<&str> {
        self.raw.to_str()
    }

    #[inline(always)]
    pub const fn uri_type(&self) -> UriType {
        self.parts.uri_type
    }

    /// Path as received, without the leading `/` and the query string.
    #[inline(always)]
    pub fn path_raw(&self) -> ByteSlice<'_> {
        self.parts.path.as_slice()
    }

    /// Percent-decoded path, without the leading `/`.
    ///
    /// Empty when the path failed to decode.
    #[inline(always)]
    pub fn path(&self) -> ByteSlice<'_> {
        self.parts.path_decoded.as_slice()
    }

    /// Percent-decoded path as `&str`, `None` if it is not valid UTF-8.
    #[inline]
    pub fn path_str(&self) -> Option<&str> {
        self.parts.path_decoded.to_str()
    }

    #[inline(always)]
    pub const fn queries(&self) -> &HeaderTable {
        &self.parts.queries
    }

    /// Decoded value of the query parameter `key`.
    #[inline]
    pub fn query(&self, key: &[u8]) -> Option<ByteSlice<'_>> {
        self.parts.queries.get(key)
    }

    #[inline]
    pub fn query_str(&self, key: &str) -> Option<&str> {
        self.query(key.as_bytes())?.to_str()
    }

    /// Splits the raw target into path and query parameters, decoding both.
    ///
    /// Every call starts from scratch, so a `Uri` can be parsed repeatedly.
    pub fn parse(&mut self) -> Result<(), UriError> {
        self.parts.reset();
        trace!(uri = %self.raw, "parsing request target");

        self.parts.parse_from(&self.raw)
    }
}

impl Parts {
    fn reset(&mut self) {
        self.state = State::GetType;
        self.uri_type = UriType::default();
        self.path.clear();
        self.path_decoded.clear();
        self.query_key.clear();
        self.query_value.clear();
        self.query_value_decoded.clear();
        self.queries.clear();
    }

    fn parse_from(&mut self, raw: &ByteBuffer) -> Result<(), UriError> {
        let mut scanner = Scanner::new(raw);

        loop {
            self.state = match self.state {
                State::GetType => match scanner.next() {
                    Some(b'/') => {
                        self.uri_type = UriType::Relative;
                        State::GetPath
                    }
                    _ => {
                        self.uri_type = UriType::Absolute;
                        debug!(uri = %raw, "only origin-form targets are supported");
                        return Err(UriError::UnsupportedUriType);
                    }
                },
                State::GetPath => {
                    let has_query = scanner.copy_until(&mut self.path, b'?');

                    if let Err(err) = percent_decode(self.path.as_bytes(), &mut self.path_decoded) {
                        debug!(path = %self.path, error = %err, "path decoding failed");
                        self.path_decoded.clear();
                        return Err(UriError::DecodingPathFailed(err));
                    }
                    trace!(path = %self.path_decoded, "decoded path");

                    if !has_query {
                        return Ok(());
                    }
                    State::GetQueryKey
                }
                State::GetQueryKey => match scanner.next() {
                    Some(b'=') => State::GetQueryValue,
                    Some(b'&') => {
                        self.flush_query_key();
                        State::GetQueryKey
                    }
                    Some(byte) => {
                        self.query_key.push(byte);
                        State::GetQueryKey
                    }
                    None => {
                        self.flush_query_key();
                        return Ok(());
                    }
                },
                State::GetQueryValue => match scanner.next() {
                    Some(b'&') => {
                        self.flush_query_pair()?;
                        State::GetQueryKey
                    }
                    Some(byte) => {
                        self.query_value.push(byte);
                        State::GetQueryValue
                    }
                    None => {
                        self.flush_query_pair()?;
                        return Ok(());
                    }
                },
            };
        }
    }

    // Key without `=`
    fn flush_query_key(&mut self) {
        if self.query_key.is_empty() {
            return;
        }

        trace!(key = %self.query_key, "query flag");
        self.queries.add_or_overwrite(self.query_key.as_bytes(), b"");
        self.query_key.clear();
    }

    fn flush_query_pair(&mut self) -> Result<(), UriError> {
        self.query_value_decoded.clear();

        if let Err(err) = percent_decode(self.query_value.as_bytes(), &mut self.query_value_decoded) {
            debug!(key = %self.query_key, error = %err, "query value decoding failed");
            self.query_value_decoded.clear();
            return Err(UriError::DecodingQueryValueFailed(err));
        }
        trace!(key = %self.query_key, value = %self.query_value_decoded, "query parameter");

        self.queries
            .add_or_overwrite(self.query_key.as_bytes(), self.query_value_decoded.as_bytes());
        self.query_key.clear();
        self.query_value.clear();

        Ok(())
    }
}

impl Default for Uri {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Appends `input` to `out`, replacing every `%XX` with the byte it encodes.
///
/// Hex digits are accepted in both cases. A `%` that is not followed by two
/// hex digits fails the whole decode; `out` then holds whatever was decoded
/// before the error.
///
/// # Examples
///
/// ```
/// use cell_http::{uri::percent_decode, ByteBuffer};
///
/// let mut out = ByteBuffer::new();
/// percent_decode(b"/index.asp?%41", &mut out).unwrap();
/// assert_eq!(out, "/index.asp?A");
///
/// assert!(percent_decode(b"%OO", &mut ByteBuffer::new()).is_err());
/// ```
pub fn percent_decode(input: &[u8], out: &mut ByteBuffer) -> Result<(), DecodeError> {
    let mut cursor = 0;

    while cursor < input.len() {
        let rest = &input[cursor..];
        let Some(offset) = memchr(b'%', rest) else {
            out.extend_from_slice(rest);
            break;
        };

        out.extend_from_slice(&rest[..offset]);
        cursor += offset;

        let (Some(&high), Some(&low)) = (input.get(cursor + 1), input.get(cursor + 2)) else {
            return Err(DecodeError::Truncated { offset: cursor });
        };
        match (charset::hex_value(high), charset::hex_value(low)) {
            (Some(high), Some(low)) => out.push((high << 4) | low),
            _ => return Err(DecodeError::InvalidHexDigit { offset: cursor }),
        }

        cursor += 3;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Result<String, DecodeError> {
        let mut out = ByteBuffer::new();
        percent_decode(input.as_bytes(), &mut out)?;
        Ok(out.to_str().unwrap().to_string())
    }

    #[test]
    fn decode_valid() {
        #[rustfmt::skip]
        let cases = [
            ("%2F",                                                "/"),
            ("main/articles/view_page/article.php?%25article=32~", "main/articles/view_page/article.php?%article=32~"),
            ("/index.asp?%41",                                     "/index.asp?A"),
            ("/%D7%A9%D7%9C%D7%95%D7%9D",                          "/שלום"),
            ("%7e%7E",                                             "~~"),
            ("plain",                                              "plain"),
            ("",                                                   ""),
        ];

        for (input, expected) in cases {
            assert_eq!(decode(input).as_deref(), Ok(expected), "{input:?}");
        }
    }

    #[test]
    fn decode_invalid() {
        #[rustfmt::skip]
        let cases = [
            ("%OO",           DecodeError::InvalidHexDigit { offset: 0 }),
            ("/index.asp?%3", DecodeError::Truncated { offset: 11 }),
            ("%",             DecodeError::Truncated { offset: 0 }),
            ("ab%4",          DecodeError::Truncated { offset: 2 }),
            ("%41%G1",        DecodeError::InvalidHexDigit { offset: 3 }),
        ];

        for (input, expected) in cases {
            assert_eq!(decode(input), Err(expected), "{input:?}");
        }
    }

    #[test]
    fn parse_path_and_queries() {
        #[rustfmt::skip]
        let cases = [
            ("/",                        "",               vec![]),
            ("/index.php",               "index.php",      vec![]),
            ("/index.php?query=all",     "index.php",      vec![("query", "all")]),
            ("/a%20b/c?x=%41&y=2",       "a b/c",          vec![("x", "A"), ("y", "2")]),
            ("/?flag",                   "",               vec![("flag", "")]),
            ("/?flag&a=1",               "",               vec![("flag", ""), ("a", "1")]),
            ("/?a=1&a=2",                "",               vec![("a", "2")]),
            ("/?a=1&&b=2",               "",               vec![("a", "1"), ("b", "2")]),
            ("/?a=1&",                   "",               vec![("a", "1")]),
            ("/?=v",                     "",               vec![("", "v")]),
            ("/?a=",                     "",               vec![("a", "")]),
            ("/?",                       "",               vec![]),
            ("/p?a=x=y",                 "p",              vec![("a", "x=y")]),
            ("/%25?%25=%25",             "%",              vec![("%25", "%")]),
        ];

        for (target, path, queries) in cases {
            let mut uri = Uri::from_target(target.as_bytes());

            assert_eq!(uri.parse(), Ok(()), "{target:?}");
            assert_eq!(uri.uri_type(), UriType::Relative);
            assert_eq!(uri.path_str(), Some(path), "{target:?}");
            assert_eq!(
                uri.queries()
                    .iter()
                    .map(|(k, v)| (k.to_str().unwrap(), v.to_str().unwrap()))
                    .collect::<Vec<_>>(),
                queries,
                "{target:?}"
            );
            assert_eq!(uri.target_str(), Some(target));
        }
    }

    #[test]
    fn parse_errors() {
        #[rustfmt::skip]
        let cases = [
            ("",                      UriError::UnsupportedUriType),
            ("http://example.com/",   UriError::UnsupportedUriType),
            ("*",                     UriError::UnsupportedUriType),
            ("/a%zz",                 UriError::DecodingPathFailed(DecodeError::InvalidHexDigit { offset: 1 })),
            ("/a?b=%4",               UriError::DecodingQueryValueFailed(DecodeError::Truncated { offset: 0 })),
            ("/a?b=1&c=%xx&d=2",      UriError::DecodingQueryValueFailed(DecodeError::InvalidHexDigit { offset: 0 })),
        ];

        for (target, expected) in cases {
            let mut uri = Uri::from_target(target.as_bytes());
            assert_eq!(uri.parse(), Err(expected), "{target:?}");
        }

        let mut uri = Uri::from_target(b"http://example.com/");
        let _ = uri.parse();
        assert_eq!(uri.uri_type(), UriType::Absolute);
    }

    #[test]
    fn failed_decode_leaves_no_partial_output() {
        let mut uri = Uri::from_target(b"/ok%20part%zz");
        assert!(uri.parse().is_err());
        assert_eq!(uri.path_raw(), "ok%20part%zz");
        assert!(uri.path().is_empty());

        let mut uri = Uri::from_target(b"/p?a=1&b=ok%20%4");
        assert!(uri.parse().is_err());
        assert_eq!(uri.path_str(), Some("p"));
        assert_eq!(uri.query_str("a"), Some("1"));
        assert_eq!(uri.query(b"b"), None);
        assert!(uri.parts.query_value_decoded.is_empty());
    }

    #[test]
    fn parse_reads_target_in_place() {
        let mut uri = Uri::from_target(b"/keep?x=1");
        let capacity = uri.raw.capacity();

        for _ in 0..3 {
            assert_eq!(uri.parse(), Ok(()));
        }
        assert_eq!(uri.raw.capacity(), capacity);
        assert_eq!(uri.target(), "/keep?x=1");
    }

    #[test]
    fn reparse_starts_over() {
        let mut uri = Uri::from_target(b"/first?a=1");
        assert_eq!(uri.parse(), Ok(()));
        assert_eq!(uri.parse(), Ok(()));
        assert_eq!(uri.path_str(), Some("first"));
        assert_eq!(uri.queries().len(), 1);

        uri.set_target(b"/second");
        assert_eq!(uri.query(b"a"), None);
        assert_eq!(uri.parse(), Ok(()));
        assert_eq!(uri.path_raw(), "second");
        assert!(uri.queries().is_empty());
    }
}
