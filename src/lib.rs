//! cell_http - Byte-level HTTP/1.1 request parser
//!
//! Parses one complete, in-memory HTTP request with explicit finite-state
//! machines that walk the input byte by byte. No general-purpose HTTP
//! library is involved: the parser sits on its own growable byte buffer
//! ([`ByteBuffer`]), borrowed views into it ([`ByteSlice`]) and a cursor
//! ([`Scanner`]).
//!
//! # What gets parsed
//!
//! - **Request line** - [`Method`], origin-form target ([`Uri`]) and [`Version`]
//! - **Target** - path and query string, both percent-decoded
//! - **Headers** - `Connection`, `Accept-Encoding` ([`EncodingSet`]),
//!   `Upgrade-Insecure-Requests`, `Host`, `Referer` and `User-Agent` get
//!   dedicated fields, the rest lands in a [`HeaderTable`]
//! - **Body** - everything after the empty line
//!
//! Each failure has its own [`ParseError`] variant, so the caller can tell
//! exactly where a request broke and pick the status code to answer with.
//!
//! # Examples
//!
//! ```
//! use cell_http::{ByteBuffer, Method, ParseError, Request};
//!
//! let mut request = Request::new();
//!
//! let data = ByteBuffer::from("GET /articles/view.php?id=32 HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! request.parse(&data).unwrap();
//!
//! assert_eq!(request.method(), Method::Get);
//! assert_eq!(request.uri().path_str(), Some("articles/view.php"));
//! assert_eq!(request.uri().query_str("id"), Some("32"));
//! assert_eq!(request.host().to_str(), Some("example.com"));
//!
//! // The same `Request` is reused for the next message
//! let data = ByteBuffer::from("GET / HTTP/1.0\r\n\r\n");
//! let err = request.parse(&data).unwrap_err();
//!
//! assert_eq!(err, ParseError::VersionInvalid);
//! assert_eq!(err.status_code(), 505);
//! ```
//!
//! # Logging
//!
//! Parsing steps are reported through [`tracing`] at `trace` level and
//! rejected input at `debug` level. Nothing is printed unless the
//! application installs a subscriber.

pub(crate) mod bytes {
    pub(crate) mod buffer;
    pub(crate) mod charset;
    pub(crate) mod scanner;
    pub(crate) mod slice;
}
pub(crate) mod http {
    pub mod encoding;
    pub(crate) mod headers;
    pub(crate) mod request;
    pub(crate) mod types;
    pub mod uri;
}
pub(crate) mod errors;
pub mod limits;

pub use crate::{
    bytes::{buffer::ByteBuffer, scanner::Scanner, slice::ByteSlice},
    errors::{DecodeError, EncodingError, ParseError, UriError},
    http::{
        encoding::{self, EncodingSet},
        headers::HeaderTable,
        request::Request,
        types::{Connection, Method, Version},
        uri::{self, Uri, UriType},
    },
};
