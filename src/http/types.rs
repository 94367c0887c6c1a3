//! Core HTTP protocol types

use std::fmt;

// METHOD

/// HTTP request methods understood by the parser
///
/// # References
///
/// - [RFC 9110, Section 9](https://datatracker.ietf.org/doc/html/rfc9110#section-9)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// GET method - transfer a current representation of the target resource
    /// [[RFC9110, Section 9.3.1](https://datatracker.ietf.org/doc/html/rfc9110#section-9.3.1)]
    Get,
    /// POST method - perform resource-specific processing on the request payload
    /// [[RFC9110, Section 9.3.3](https://datatracker.ietf.org/doc/html/rfc9110#section-9.3.3)]
    Post,
    /// HEAD method - same as GET but without response body
    /// [[RFC9110, Section 9.3.2](https://datatracker.ietf.org/doc/html/rfc9110#section-9.3.2)]
    Head,
    /// Any other token, including an empty one
    #[default]
    Unsupported,
}

impl Method {
    /// Resolves a complete method token. Matching is case-sensitive.
    #[inline(always)]
    pub const fn from_bytes(src: &[u8]) -> Self {
        match src {
            b"GET" => Self::Get,
            b"POST" => Self::Post,
            b"HEAD" => Self::Head,
            _ => Self::Unsupported,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Head => "HEAD",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// VERSION

/// HTTP protocol version named in the request line
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Version {
    /// `HTTP/1`
    Http1,
    /// `HTTP/1.1`
    ///
    /// [RFC 9112](https://datatracker.ietf.org/doc/html/rfc9112)
    Http11,
    /// `HTTP/2`
    Http2,
    /// `HTTP/3`
    Http3,
    /// Any other token
    #[default]
    Unsupported,
}

impl Version {
    #[inline(always)]
    pub const fn from_bytes(src: &[u8]) -> Self {
        match src {
            b"HTTP/1" => Self::Http1,
            b"HTTP/1.1" => Self::Http11,
            b"HTTP/2" => Self::Http2,
            b"HTTP/3" => Self::Http3,
            _ => Self::Unsupported,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http1 => "HTTP/1",
            Self::Http11 => "HTTP/1.1",
            Self::Http2 => "HTTP/2",
            Self::Http3 => "HTTP/3",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// CONNECTION

/// Connection option from the `Connection` header
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Connection {
    #[default]
    Close,
    KeepAlive,
}

impl Connection {
    /// `keep-alive` in any letter case keeps the connection, everything else closes it.
    #[inline]
    pub fn from_bytes(src: &[u8]) -> Self {
        if src.eq_ignore_ascii_case(b"keep-alive") {
            Self::KeepAlive
        } else {
            Self::Close
        }
    }
}
