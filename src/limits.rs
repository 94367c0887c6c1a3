//! Buffer sizing and request limits
//!
//! # Memory Consumption
//!
//! A [`Request`](crate::Request) allocates all of its scratch and result buffers
//! once, when it is created, and parsing refills them in place. A buffer grows
//! when a request does not fit, and a header or query table gains entries when
//! a request carries more than `header_count` or `query_count`. Both keep the
//! new capacity for the following requests. The remaining per-parse
//! allocations are the small token buffer of an `Accept-Encoding` value and
//! the owned text inside an [`EncodingError`](crate::EncodingError).
//!
//! The up-front allocation is reported by [`ReqLimits::estimated_buffer_size`].
//!
//! # Examples
//!
//! ```
//! use cell_http::{limits::ReqLimits, ByteBuffer, Request};
//!
//! let limits = ReqLimits {
//!     url_size: 2048,          // Reject longer request targets with 414
//!     body_capacity: 64 * 1024, // Room for form uploads without growing
//!     ..ReqLimits::default()
//! };
//!
//! let mut request = Request::with_limits(&limits);
//! let data = ByteBuffer::from("GET /index.html HTTP/1.1\r\n\r\n");
//!
//! assert!(request.parse(&data).is_ok());
//! ```

use crate::bytes::buffer::aligned_capacity;

/// Controls how much memory a [`Request`](crate::Request) reserves and how
/// long a request target may be.
///
/// # Memory allocation strategy
///
/// Every `*_capacity` field is an initial size, not a hard cap. Buffers are
/// rounded up to a multiple of 8 bytes and grow on demand. The only hard
/// limit is [`url_size`](Self::url_size).
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Maximum request target length in bytes (default: unlimited)
    ///
    /// Covers the whole target after the method (e.g., `/api/users/123?sort=name`).
    /// Longer targets are rejected with
    /// [`ParseError::UriTooLong`](crate::ParseError::UriTooLong), which maps to `414`.
    pub url_size: usize,

    /// Initial size of the raw request target buffer (default: `1 KB`)
    pub uri_capacity: usize,
    /// Initial size of the path buffers, raw and decoded (default: `256 B`)
    pub path_capacity: usize,
    /// Initial size of the query key buffer (default: `64 B`)
    pub query_key_capacity: usize,
    /// Initial size of the query value buffers, raw and decoded (default: `256 B`)
    pub query_value_capacity: usize,
    /// Number of query parameters preallocated (default: `8`)
    pub query_count: usize,

    /// Initial size of the method, version and header scratch buffers (default: `4 KB`)
    pub scratch_capacity: usize,
    /// Initial size of the `Host`, `Referer` and `User-Agent` buffers (default: `4 KB`)
    ///
    /// User agents of mobile browsers regularly exceed 200 bytes.
    pub header_capacity: usize,
    /// Number of generic header entries preallocated (default: `16`)
    ///
    /// Typical browsers send 10-12 headers.
    pub header_count: usize,

    /// Initial size of the body buffer (default: `4 KB`)
    pub body_capacity: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            url_size: usize::MAX,

            uri_capacity: 1024,
            path_capacity: 256,      // Fits: /api/v1/users/search/index.php
            query_key_capacity: 64,  // Fits: utm_campaign
            query_value_capacity: 256,
            query_count: 8,

            scratch_capacity: 4 * 1024,
            header_capacity: 4 * 1024,
            header_count: 16, // Typical: 10-12 browser headers + 4-6 custom

            body_capacity: 4 * 1024, // Good for form posts, not file uploads

            _priv: (),
        }
    }
}

impl ReqLimits {
    /// Returns the number of bytes a [`Request`](crate::Request) built with
    /// these limits allocates for its byte buffers.
    ///
    /// Header and query entries are allocated lazily and are not counted.
    ///
    /// # Example
    /// ```
    /// use cell_http::limits::ReqLimits;
    ///
    /// let limits = ReqLimits::default();
    /// println!("Each request needs {} bytes of buffers", limits.estimated_buffer_size());
    /// ```
    pub fn estimated_buffer_size(&self) -> usize {
        // key, value and body
        let request = 2 * aligned_capacity(self.scratch_capacity) + aligned_capacity(self.body_capacity);
        // host, referrer and user agent
        let common = 3 * aligned_capacity(self.header_capacity);
        // raw target, raw and decoded path, query key, raw and decoded query value
        let target = aligned_capacity(self.uri_capacity)
            + 2 * aligned_capacity(self.path_capacity)
            + aligned_capacity(self.query_key_capacity)
            + 2 * aligned_capacity(self.query_value_capacity);

        request + common + target
    }
}
