use thiserror::Error;

/// Reasons a request could not be parsed.
///
/// Each variant maps to the HTTP status a server would answer with, see
/// [`ParseError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid or unsupported HTTP method")]
    MethodInvalid,
    #[error("invalid or unsupported HTTP version")]
    VersionInvalid,
    #[error("invalid request target: {0}")]
    UriInvalid(#[from] UriError),
    #[error("request target is longer than {limit} bytes")]
    UriTooLong { limit: usize },

    #[error("request line is not terminated by CRLF")]
    NoCrlfAfterRequestLine,
    #[error("header field line is not terminated by CRLF")]
    NoCrlfAfterHeaderValue,
    #[error("missing empty line between the header section and the body")]
    NoEndingCrlfBetweenHeadersAndBody,
    #[error("header field line starts with whitespace")]
    FieldLineStartsWithWhitespace,

    #[error("HEAD request carries a body")]
    HeadRequestBodyExists,
}

impl ParseError {
    /// Status code a server should answer this error with.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::VersionInvalid => 505,
            Self::UriTooLong { .. } => 414,
            _ => 400,
        }
    }
}

/// Reasons a request target could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UriError {
    /// Only origin-form targets (starting with `/`) are accepted.
    #[error("unsupported target form, expected a path starting with '/'")]
    UnsupportedUriType,
    #[error("path could not be percent-decoded: {0}")]
    DecodingPathFailed(#[source] DecodeError),
    #[error("query value could not be percent-decoded: {0}")]
    DecodingQueryValueFailed(#[source] DecodeError),
}

/// Malformed percent-encoding. `offset` points at the offending `%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("'%' at offset {offset} is not followed by two characters")]
    Truncated { offset: usize },
    #[error("'%' at offset {offset} is not followed by two hex digits")]
    InvalidHexDigit { offset: usize },
}

/// Reasons an `Accept-Encoding` value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("unexpected space inside a content coding at offset {offset}")]
    UnexpectedSpace { offset: usize },
    #[error("unknown content coding {0:?}")]
    UnknownCoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn status_codes() {
        #[rustfmt::skip]
        let cases = [
            (ParseError::MethodInvalid,                       400),
            (ParseError::VersionInvalid,                      505),
            (ParseError::UriInvalid(UriError::UnsupportedUriType), 400),
            (ParseError::UriTooLong { limit: 8 },             414),
            (ParseError::NoCrlfAfterRequestLine,              400),
            (ParseError::NoCrlfAfterHeaderValue,              400),
            (ParseError::NoEndingCrlfBetweenHeadersAndBody,   400),
            (ParseError::FieldLineStartsWithWhitespace,       400),
            (ParseError::HeadRequestBodyExists,               400),
        ];

        for (err, code) in cases {
            assert_eq!(err.status_code(), code, "{err}");
        }
    }

    #[test]
    fn sources_chain() {
        let err = ParseError::from(UriError::DecodingQueryValueFailed(
            DecodeError::InvalidHexDigit { offset: 3 },
        ));

        assert_eq!(
            err.to_string(),
            "invalid request target: query value could not be percent-decoded: \
             '%' at offset 3 is not followed by two hex digits"
        );

        let uri = err.source().and_then(|e| e.downcast_ref::<UriError>());
        assert_eq!(
            uri,
            Some(&UriError::DecodingQueryValueFailed(DecodeError::InvalidHexDigit { offset: 3 }))
        );
    }
}
