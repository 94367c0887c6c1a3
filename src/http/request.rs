use crate::{
    bytes::{
        buffer::ByteBuffer,
        charset::{self, CR, LF, SP},
        scanner::Scanner,
        slice::ByteSlice,
    },
    errors::ParseError,
    http::{
        encoding::EncodingSet,
        headers::HeaderTable,
        types::{Connection, Method, Version},
        uri::Uri,
    },
    limits::ReqLimits,
};
use tracing::{debug, trace};

/// Parsed HTTP/1.1 request.
///
/// A `Request` owns every buffer it fills, so one value can parse any number
/// of requests in a row: each [`parse`](Request::parse) call resets all fields
/// first and reuses the allocations.
///
/// # Input data requirements
///
/// The whole request must already be in memory. Bytes after the empty line
/// ending the header section are the body, `Content-Length` is not consulted.
///
/// #### General designations
/// - `SP`: ASCII space (0x20)
/// - `CRLF`: Carriage return + line feed (`"\r\n"`) - **exactly this sequence required**
/// ---
/// - `[METHOD]`: `GET`, `POST` or `HEAD`, case-sensitive
/// - `[TARGET]`: origin-form target, `/` followed by a path and an optional query,
///   see [Uri]
/// - `[VERSION]`: `HTTP/1`, `HTTP/1.1`, `HTTP/2` or `HTTP/3`
///
/// ## First line
///
/// Template string:
/// ```text
/// [METHOD] SP [TARGET] SP [VERSION] CRLF
/// ```
///
/// Any run of whitespace (SP, HTAB, CR, LF, VT, FF) separates the method from
/// the target. The version ends at the CR.
///
/// ## Header
///
/// Template string:
/// ```text
/// [NAME]: OWS [VALUE] CRLF
/// ```
/// Where:
/// - `[NAME]`: Header field name, stored lowercased. A name starting with
///   whitespace is an error (obsolete line folding).
/// - `OWS`: any number of SP or HTAB
/// - `[VALUE]`: Header value, may be empty. Trailing spaces are removed.
///
/// **Note**: The parser extracts semantics from these headers:
///
/// | Header                      | Field                                            | Values                                   |
/// |-----------------------------|--------------------------------------------------|------------------------------------------|
/// | `Connection`                | [connection](Request::connection)                | `keep-alive` (case-insensitive) or other |
/// | `Accept-Encoding`           | [accept_encoding](Request::accept_encoding)      | See [EncodingSet::parse]                 |
/// | `Upgrade-Insecure-Requests` | [upgrade_insecure_requests](Request::upgrade_insecure_requests) | exactly `1`               |
/// | `Host`                      | [host](Request::host)                            | Any                                      |
/// | `Referer`, `Referrer`       | [referrer](Request::referrer)                    | Any                                      |
/// | `User-Agent`                | [user_agent](Request::user_agent)                | Any                                      |
///
/// All other headers go to the [generic table](Request::headers). A repeated
/// header keeps its last value.
///
/// An `Accept-Encoding` value that cannot be parsed does not fail the
/// request, it leaves [`EncodingSet::NONE`].
///
/// ## End of headings
///
/// Template string:
/// ```text
/// CRLF
/// ```
///
/// ## Body
///
/// Everything after the end of headings. A `HEAD` request with a body is an error.
///
/// ## End of input
///
/// The buffer holds exactly one request. Reaching its end is not an error in
/// any state: fields that were not reached keep their reset values and a
/// header line without its CRLF is dropped. A target cut off before its
/// version is still parsed, so a malformed one is reported.
///
/// # Examples
///
/// ```
/// use cell_http::{ByteBuffer, Connection, EncodingSet, Method, Request, Version};
///
/// let data = ByteBuffer::from(
///     "POST /form?lang=en HTTP/1.1\r\n\
///      Host: www.example.com\r\n\
///      Connection: keep-alive\r\n\
///      Accept-Encoding: gzip, br\r\n\
///      X-Request-Id: 42\r\n\
///      \r\n\
///      name=value",
/// );
///
/// let mut request = Request::new();
/// request.parse(&data).unwrap();
///
/// assert_eq!(request.method(), Method::Post);
/// assert_eq!(request.version(), Version::Http11);
/// assert_eq!(request.target(), "/form?lang=en");
/// assert_eq!(request.uri().query_str("lang"), Some("en"));
/// assert_eq!(request.host(), "www.example.com");
/// assert_eq!(request.connection(), Connection::KeepAlive);
/// assert_eq!(request.accept_encoding(), EncodingSet::GZIP | EncodingSet::BROTLI);
/// assert_eq!(request.header_str("x-request-id"), Some("42"));
/// assert_eq!(request.body(), "name=value");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    state: State,
    key: ByteBuffer,
    value: ByteBuffer,
    url_size: usize,

    method: Method,
    version: Version,
    target: Uri,

    common: CommonHeaders,
    headers: HeaderTable,

    body: ByteBuffer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    NeedMethod,
    NeedTarget,
    NeedVersion,
    NeedCrlfAfterRequestLine,
    NeedHeaderKey,
    EatingWhitespaceAfterHeaderKey,
    NeedHeaderValue,
    NeedCrlfAfterHeaderValue,
    NeedCrlfBetweenHeadersAndBody,
    AppendingBody,
}

/// Headers with dedicated fields
#[derive(Debug, Clone)]
struct CommonHeaders {
    connection: Connection,
    accept_encoding: EncodingSet,
    upgrade_insecure_requests: bool,
    host: ByteBuffer,
    referrer: ByteBuffer,
    user_agent: ByteBuffer,
}

impl CommonHeaders {
    fn new(limits: &ReqLimits) -> Self {
        Self {
            connection: Connection::default(),
            accept_encoding: EncodingSet::NONE,
            upgrade_insecure_requests: false,
            host: ByteBuffer::with_capacity(limits.header_capacity),
            referrer: ByteBuffer::with_capacity(limits.header_capacity),
            user_agent: ByteBuffer::with_capacity(limits.header_capacity),
        }
    }

    fn reset(&mut self) {
        self.connection = Connection::default();
        self.accept_encoding = EncodingSet::NONE;
        self.upgrade_insecure_requests = false;
        self.host.clear();
        self.referrer.clear();
        self.user_agent.clear();
    }
}

type HeaderSetter = fn(&mut CommonHeaders, &[u8]);

// Keys are matched after lowercasing
const COMMON_HEADERS: [(&[u8], HeaderSetter); 7] = [
    (b"connection", set_connection),
    (b"accept-encoding", set_accept_encoding),
    (b"upgrade-insecure-requests", set_upgrade_insecure_requests),
    (b"host", set_host),
    (b"referer", set_referrer),
    (b"referrer", set_referrer),
    (b"user-agent", set_user_agent),
];

fn set_connection(common: &mut CommonHeaders, value: &[u8]) {
    common.connection = Connection::from_bytes(value);
}

fn set_accept_encoding(common: &mut CommonHeaders, value: &[u8]) {
    common.accept_encoding = EncodingSet::parse(ByteSlice::new(value)).unwrap_or_else(|err| {
        debug!(error = %err, "ignoring unparseable accept-encoding");
        EncodingSet::NONE
    });
}

fn set_upgrade_insecure_requests(common: &mut CommonHeaders, value: &[u8]) {
    common.upgrade_insecure_requests = value == b"1";
}

fn set_host(common: &mut CommonHeaders, value: &[u8]) {
    common.host.assign(value);
}

fn set_referrer(common: &mut CommonHeaders, value: &[u8]) {
    common.referrer.assign(value);
}

fn set_user_agent(common: &mut CommonHeaders, value: &[u8]) {
    common.user_agent.assign(value);
}

impl Request {
    /// Creates a request with the default [`ReqLimits`].
    #[inline]
    pub fn new() -> Self {
        Self::with_limits(&ReqLimits::default())
    }

    pub fn with_limits(limits: &ReqLimits) -> Self {
        Request {
            state: State::NeedMethod,
            key: ByteBuffer::with_capacity(limits.scratch_capacity),
            value: ByteBuffer::with_capacity(limits.scratch_capacity),
            url_size: limits.url_size,

            method: Method::Unsupported,
            version: Version::Unsupported,
            target: Uri::with_limits(limits),

            common: CommonHeaders::new(limits),
            headers: HeaderTable::with_capacity(limits.header_count),

            body: ByteBuffer::with_capacity(limits.body_capacity),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = State::NeedMethod;
        self.key.clear();
        self.value.clear();

        self.method = Method::Unsupported;
        self.version = Version::Unsupported;
        self.target.clear();

        self.common.reset();
        self.headers.clear();

        self.body.clear();
    }
}

impl Default for Request {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// Public API
impl Request {
    #[inline(always)]
    pub const fn method(&self) -> Method {
        self.method
    }

    #[inline(always)]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the raw request target, e.g. `/index.php?query=all`.
    #[inline(always)]
    pub fn target(&self) -> ByteSlice<'_> {
        self.target.target()
    }

    #[inline]
    pub fn target_str(&self) -> Option<&str> {
        self.target.target_str()
    }

    /// Returns the parsed target with its decoded path and query parameters.
    #[inline(always)]
    pub const fn uri(&self) -> &Uri {
        &self.target
    }

    #[inline(always)]
    pub const fn connection(&self) -> Connection {
        self.common.connection
    }

    #[inline(always)]
    pub fn is_keep_alive(&self) -> bool {
        self.common.connection == Connection::KeepAlive
    }

    #[inline(always)]
    pub const fn accept_encoding(&self) -> EncodingSet {
        self.common.accept_encoding
    }

    #[inline(always)]
    pub const fn upgrade_insecure_requests(&self) -> bool {
        self.common.upgrade_insecure_requests
    }

    #[inline(always)]
    pub fn host(&self) -> ByteSlice<'_> {
        self.common.host.as_slice()
    }

    #[inline(always)]
    pub fn referrer(&self) -> ByteSlice<'_> {
        self.common.referrer.as_slice()
    }

    #[inline(always)]
    pub fn user_agent(&self) -> ByteSlice<'_> {
        self.common.user_agent.as_slice()
    }

    /// Headers without a dedicated field, names lowercased.
    #[inline(always)]
    pub const fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Returns a generic header value with case-insensitive name matching.
    /// Uses linear search.
    #[inline]
    pub fn header(&self, name: &[u8]) -> Option<ByteSlice<'_>> {
        self.headers.get_ignore_case(name)
    }

    #[inline]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name.as_bytes())?.to_str()
    }

    /// Returns the request body, empty if there is none.
    #[inline(always)]
    pub fn body(&self) -> ByteSlice<'_> {
        self.body.as_slice()
    }

    /// Parses one complete request held in `data`.
    ///
    /// All fields are reset first. On error the fields hold whatever was
    /// parsed before the failing byte.
    pub fn parse(&mut self, data: &ByteBuffer) -> Result<(), ParseError> {
        self.reset();
        trace!(len = data.len(), "parsing request");

        let mut scanner = Scanner::new(data);
        while let Some(byte) = scanner.next() {
            self.state = self.step(byte, &mut scanner)?;
        }

        self.finish()
    }

    fn step(&mut self, byte: u8, scanner: &mut Scanner<'_>) -> Result<State, ParseError> {
        let next = match self.state {
            State::NeedMethod if charset::is_whitespace(byte) => {
                self.method = Method::from_bytes(self.key.as_bytes());
                if self.method == Method::Unsupported {
                    debug!(method = %self.key, "unsupported method");
                    return Err(ParseError::MethodInvalid);
                }

                trace!(method = %self.method, "parsed method");
                self.key.clear();
                State::NeedTarget
            }
            State::NeedMethod => {
                self.key.push(byte);
                State::NeedMethod
            }

            State::NeedTarget if charset::is_whitespace(byte) => {
                self.target.parse()?;
                State::NeedVersion
            }
            State::NeedTarget => {
                if self.target.target().len() >= self.url_size {
                    debug!(limit = self.url_size, "request target too long");
                    return Err(ParseError::UriTooLong {
                        limit: self.url_size,
                    });
                }

                self.target.push_target_byte(byte);
                State::NeedTarget
            }

            State::NeedVersion if byte == CR => {
                self.version = Version::from_bytes(self.key.as_bytes());
                if self.version == Version::Unsupported {
                    debug!(version = %self.key, "unsupported version");
                    return Err(ParseError::VersionInvalid);
                }

                trace!(version = %self.version, "parsed version");
                self.key.clear();
                State::NeedCrlfAfterRequestLine
            }
            State::NeedVersion => {
                self.key.push(byte);
                State::NeedVersion
            }

            State::NeedCrlfAfterRequestLine => match byte {
                LF => State::NeedHeaderKey,
                _ => return Err(ParseError::NoCrlfAfterRequestLine),
            },

            State::NeedHeaderKey => match byte {
                CR if self.key.is_empty() => State::NeedCrlfBetweenHeadersAndBody,
                // Field line without a colon
                CR => return Err(ParseError::NoCrlfAfterHeaderValue),
                b':' => {
                    self.key.to_lower();
                    State::EatingWhitespaceAfterHeaderKey
                }
                _ if self.key.is_empty() && charset::is_whitespace(byte) => {
                    debug!("obsolete line folding");
                    return Err(ParseError::FieldLineStartsWithWhitespace);
                }
                _ => {
                    self.key.push(byte);
                    State::NeedHeaderKey
                }
            },

            State::EatingWhitespaceAfterHeaderKey if charset::is_ows(byte) => {
                State::EatingWhitespaceAfterHeaderKey
            }
            State::EatingWhitespaceAfterHeaderKey => {
                scanner.rewind(1);
                State::NeedHeaderValue
            }

            State::NeedHeaderValue if byte == CR => {
                self.dispatch_header();
                State::NeedCrlfAfterHeaderValue
            }
            State::NeedHeaderValue => {
                self.value.push(byte);
                State::NeedHeaderValue
            }

            State::NeedCrlfAfterHeaderValue => match byte {
                LF => State::NeedHeaderKey,
                _ => return Err(ParseError::NoCrlfAfterHeaderValue),
            },

            State::NeedCrlfBetweenHeadersAndBody => match byte {
                LF => State::AppendingBody,
                _ => return Err(ParseError::NoEndingCrlfBetweenHeadersAndBody),
            },

            State::AppendingBody => {
                if self.method == Method::Head {
                    debug!("HEAD request with a body");
                    return Err(ParseError::HeadRequestBodyExists);
                }

                let rest = scanner.remaining();
                self.body.push(byte);
                self.body.extend_from_slice(rest);
                scanner.advance(rest.len());

                trace!(len = self.body.len(), "parsed body");
                State::AppendingBody
            }
        };

        Ok(next)
    }

    fn dispatch_header(&mut self) {
        self.value.trim_right(SP);

        let key = self.key.as_bytes();
        let value = self.value.as_bytes();

        match COMMON_HEADERS.iter().find(|(name, _)| *name == key) {
            Some((_, set)) => {
                trace!(key = %self.key, value = %self.value, "common header");
                set(&mut self.common, value);
            }
            None => {
                trace!(key = %self.key, value = %self.value, "header");
                self.headers.add_or_overwrite(key, value);
            }
        }

        self.key.clear();
        self.value.clear();
    }

    // The whole buffer is one request, so running out of input ends it.
    // A target still being read has not been checked yet.
    fn finish(&mut self) -> Result<(), ParseError> {
        if self.state == State::NeedTarget && !self.target.target().is_empty() {
            self.target.parse()?;
        }

        trace!(state = ?self.state, "end of input");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DecodeError, UriError};

    const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13;) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Version/4.0 Chrome/107.0.5304.141";

    fn parse(req: &str) -> (Request, Result<(), ParseError>) {
        let mut request = Request::new();
        let result = request.parse(&ByteBuffer::from(req));
        (request, result)
    }

    #[test]
    fn reset() {
        let (mut request, result) = parse(
            "POST /qwe?q=1 HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: keep-alive\r\nX-A: b\r\n\r\nbody",
        );
        assert_eq!(result, Ok(()));

        request.reset();
        assert_eq!(request.method(), Method::Unsupported);
        assert_eq!(request.version(), Version::Unsupported);
        assert!(request.target().is_empty());
        assert!(request.uri().queries().is_empty());
        assert!(request.host().is_empty());
        assert_eq!(request.connection(), Connection::Close);
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn head_with_query() {
        let (request, result) = parse("HEAD /index.php?query=all HTTP/1.1\r\n");

        assert_eq!(result, Ok(()));
        assert_eq!(request.method(), Method::Head);
        assert_eq!(request.version(), Version::Http11);
        assert_eq!(request.target_str(), Some("/index.php?query=all"));
        assert_eq!(request.uri().path_str(), Some("index.php"));
        assert_eq!(request.uri().query_str("query"), Some("all"));
        assert_eq!(request.connection(), Connection::Close);
    }

    #[test]
    fn head_keep_alive() {
        let (request, result) = parse("HEAD / HTTP/3\r\nConnection: keep-alive\r\n\r\n");

        assert_eq!(result, Ok(()));
        assert_eq!(request.method(), Method::Head);
        assert_eq!(request.version(), Version::Http3);
        assert_eq!(request.target_str(), Some("/"));
        assert_eq!(request.connection(), Connection::KeepAlive);
        assert!(request.is_keep_alive());
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn browser_headers() {
        #[rustfmt::skip]
        let cases = [
            (
                Method::Head, Version::Http2,
                format!(
                    "HEAD /script.js?query=true HTTP/2\r\nConnection: keep-alive\r\nUser-Agent: {USER_AGENT}\r\n\
                     Upgrade-Insecure-Requests:1\r\nHost: www.example.com\r\nReferrer: www.google.com\r\n\
                     Sec-Fetch-Dest: script\r\nAccept-Encoding: gzip, deflate, br\r\n\r\n"
                ),
                "",
            ),
            (
                Method::Head, Version::Http3,
                format!(
                    "HEAD /script.js?query=true HTTP/3\r\nConnection: keep-alive\r\nUser-Agent: {USER_AGENT}\r\n\
                     Upgrade-Insecure-Requests:1\r\nHost: www.example.com\r\nReferrer: www.google.com\r\n\
                     Sec-Fetch-Dest: script\r\nAccept-Encoding: gzip, deflate, br\r\n\r\n"
                ),
                "",
            ),
            (
                Method::Post, Version::Http11,
                format!(
                    "POST /script.js?query=true HTTP/1.1\r\nConnection: keep-alive\r\nUser-Agent: {USER_AGENT}\r\n\
                     Upgrade-Insecure-Requests:1\r\nHost: www.example.com\r\nReferrer: www.google.com\r\n\
                     Sec-Fetch-Dest: script\r\nAccept-Encoding: gzip, deflate, br\r\n\r\nPost Request Body"
                ),
                "Post Request Body",
            ),
        ];

        for (method, version, req, body) in cases {
            let (request, result) = parse(&req);

            assert_eq!(result, Ok(()));
            assert_eq!(request.method(), method);
            assert_eq!(request.version(), version);
            assert_eq!(request.target_str(), Some("/script.js?query=true"));
            assert_eq!(request.connection(), Connection::KeepAlive);
            assert_eq!(request.user_agent(), USER_AGENT);
            assert!(request.upgrade_insecure_requests());
            assert_eq!(request.host(), "www.example.com");
            assert_eq!(request.referrer(), "www.google.com");
            assert_eq!(request.header_str("sec-fetch-dest"), Some("script"));
            assert_eq!(request.header_str("Sec-Fetch-Dest"), Some("script"));
            assert_eq!(
                request.accept_encoding(),
                EncodingSet::GZIP | EncodingSet::DEFLATE | EncodingSet::BROTLI
            );
            assert_eq!(request.headers().len(), 1);
            assert_eq!(request.body(), body);
        }
    }

    #[test]
    fn parse_request_line() {
        #[rustfmt::skip]
        let cases = [
            ("GET / HTTP/1.1\r\n\r\n",           Ok((Method::Get,  "/",     Version::Http11))),
            ("POST /a HTTP/1\r\n\r\n",           Ok((Method::Post, "/a",    Version::Http1))),
            ("GET /x HTTP/2\r\n\r\n",            Ok((Method::Get,  "/x",    Version::Http2))),
            ("GET\t/tab HTTP/1.1\r\n\r\n",       Ok((Method::Get,  "/tab",  Version::Http11))),

            ("PUT / HTTP/1.1\r\n\r\n",           Err(ParseError::MethodInvalid)),
            ("get / HTTP/1.1\r\n\r\n",           Err(ParseError::MethodInvalid)),
            (" GET / HTTP/1.1\r\n\r\n",          Err(ParseError::MethodInvalid)),
            ("GET / HTTP/1.0\r\n\r\n",           Err(ParseError::VersionInvalid)),
            ("GET / HTTP/1.1 \r\n\r\n",          Err(ParseError::VersionInvalid)),
            ("GET / HTTP/1.1\n\n",               Err(ParseError::VersionInvalid)),
            ("GET / HTTP/1.1\rX\n\r\n",          Err(ParseError::NoCrlfAfterRequestLine)),
            ("GET http://a.com/ HTTP/1.1\r\n",   Err(ParseError::UriInvalid(UriError::UnsupportedUriType))),
            ("GET /%zz HTTP/1.1\r\n",            Err(ParseError::UriInvalid(
                UriError::DecodingPathFailed(DecodeError::InvalidHexDigit { offset: 0 })
            ))),
            ("GET /?a=%2 HTTP/1.1\r\n",          Err(ParseError::UriInvalid(
                UriError::DecodingQueryValueFailed(DecodeError::Truncated { offset: 0 })
            ))),
        ];

        for (req, expected) in cases {
            let (request, result) = parse(req);

            match expected {
                Ok((method, target, version)) => {
                    assert_eq!(result, Ok(()), "{req:?}");
                    assert_eq!(request.method(), method);
                    assert_eq!(request.target_str(), Some(target));
                    assert_eq!(request.version(), version);
                }
                Err(e) => assert_eq!(result, Err(e), "{req:?}"),
            }
        }
    }

    #[test]
    fn truncated_input() {
        #[rustfmt::skip]
        let cases = [
            ("",                                   Method::Unsupported, "",       Version::Unsupported, None),
            ("GET",                                Method::Unsupported, "",       Version::Unsupported, None),
            ("GET ",                               Method::Get,         "",       Version::Unsupported, None),
            ("GET /index",                         Method::Get,         "/index", Version::Unsupported, None),
            ("GET / HTTP/1.1",                     Method::Get,         "/",      Version::Unsupported, None),
            ("GET / HTTP/1.1\r",                   Method::Get,         "/",      Version::Http11,      None),
            ("GET / HTTP/1.1\r\n",                 Method::Get,         "/",      Version::Http11,      None),
            ("GET / HTTP/1.1\r\nHost",             Method::Get,         "/",      Version::Http11,      None),
            ("GET / HTTP/1.1\r\nHost:",            Method::Get,         "/",      Version::Http11,      None),
            ("POST / HTTP/1.1\r\nHost: a",         Method::Post,        "/",      Version::Http11,      None),
            ("GET / HTTP/1.1\r\nHost: a\r",        Method::Get,         "/",      Version::Http11,      Some("a")),
            ("GET / HTTP/1.1\r\nHost: a\r\n",      Method::Get,         "/",      Version::Http11,      Some("a")),
            ("GET / HTTP/1.1\r\nHost: a\r\n\r",    Method::Get,         "/",      Version::Http11,      Some("a")),
            ("GET / HTTP/1.1\r\nHost: a\r\n\r\n",  Method::Get,         "/",      Version::Http11,      Some("a")),
        ];

        for (req, method, target, version, host) in cases {
            let (request, result) = parse(req);

            assert_eq!(result, Ok(()), "{req:?}");
            assert_eq!(request.method(), method, "{req:?}");
            assert_eq!(request.target_str(), Some(target), "{req:?}");
            assert_eq!(request.version(), version, "{req:?}");
            assert_eq!(request.host().to_str(), Some(host.unwrap_or("")), "{req:?}");
        }
    }

    #[test]
    fn truncated_target_is_still_checked() {
        #[rustfmt::skip]
        let cases = [
            ("GET /index?a=b",      Ok(())),
            ("GET http://a.com/",   Err(ParseError::UriInvalid(UriError::UnsupportedUriType))),
            ("GET /%zz",            Err(ParseError::UriInvalid(
                UriError::DecodingPathFailed(DecodeError::InvalidHexDigit { offset: 0 })
            ))),
        ];

        for (req, expected) in cases {
            assert_eq!(parse(req).1, expected, "{req:?}");
        }

        let (request, _) = parse("GET /index?a=b");
        assert_eq!(request.uri().path_str(), Some("index"));
        assert_eq!(request.uri().query_str("a"), Some("b"));
    }

    #[test]
    fn parse_headers() {
        #[rustfmt::skip]
        let cases = [
            ("X-Empty:\r\n",              vec![("x-empty", "")]),
            ("X-Empty: \r\n",             vec![("x-empty", "")]),
            ("X-Tab:\t\tv\r\n",           vec![("x-tab", "v")]),
            ("X-Trail: value   \r\n",     vec![("x-trail", "value")]),
            ("X-Inner: a  b\r\n",         vec![("x-inner", "a  b")]),
            ("CONTENT-TYPE: Text/Plain\r\n", vec![("content-type", "Text/Plain")]),
            ("X-Colon: a:b\r\n",          vec![("x-colon", "a:b")]),
            ("X-A: 1\r\nX-A: 2\r\n",      vec![("x-a", "2")]),
            ("X-A: 1\r\nX-B: 2\r\n",      vec![("x-a", "1"), ("x-b", "2")]),
        ];

        for (headers, expected) in cases {
            let (request, result) = parse(&format!("GET / HTTP/1.1\r\n{headers}\r\n"));

            assert_eq!(result, Ok(()), "{headers:?}");
            assert_eq!(
                request
                    .headers()
                    .iter()
                    .map(|(k, v)| (k.to_str().unwrap(), v.to_str().unwrap()))
                    .collect::<Vec<_>>(),
                expected,
                "{headers:?}"
            );
        }
    }

    #[test]
    fn invalid_headers() {
        #[rustfmt::skip]
        let cases = [
            ("GET / HTTP/1.1\r\n Host: a\r\n\r\n",       ParseError::FieldLineStartsWithWhitespace),
            ("GET / HTTP/1.1\r\n\tHost: a\r\n\r\n",      ParseError::FieldLineStartsWithWhitespace),
            ("GET / HTTP/1.1\r\nHost: a\rX\r\n\r\n",     ParseError::NoCrlfAfterHeaderValue),
            ("GET / HTTP/1.1\r\nNoColon\r\n\r\n",        ParseError::NoCrlfAfterHeaderValue),
            ("GET / HTTP/1.1\r\nHost: a\r\n\rX",         ParseError::NoEndingCrlfBetweenHeadersAndBody),
            ("HEAD / HTTP/1.1\r\n\r\nbody",              ParseError::HeadRequestBodyExists),
        ];

        for (req, expected) in cases {
            assert_eq!(parse(req).1, Err(expected), "{req:?}");
        }
    }

    #[test]
    fn special_headers() {
        #[rustfmt::skip]
        let cases = [
            ("Connection: keep-alive",          Connection::KeepAlive, EncodingSet::NONE, false),
            ("Connection: KEEP-ALIVE",          Connection::KeepAlive, EncodingSet::NONE, false),
            ("Connection: close",               Connection::Close,     EncodingSet::NONE, false),
            ("Connection: keep-alive, Upgrade", Connection::Close,     EncodingSet::NONE, false),
            ("Accept-Encoding: zstd",           Connection::Close,     EncodingSet::ZSTD, false),
            ("Accept-Encoding: gzip;q=0.8",     Connection::Close,     EncodingSet::NONE, false),
            ("Accept-Encoding: gzip ,br",       Connection::Close,     EncodingSet::NONE, false),
            ("Upgrade-Insecure-Requests: 1",    Connection::Close,     EncodingSet::NONE, true),
            ("Upgrade-Insecure-Requests: 0",    Connection::Close,     EncodingSet::NONE, false),
            ("Upgrade-Insecure-Requests: 11",   Connection::Close,     EncodingSet::NONE, false),
        ];

        for (header, connection, encoding, upgrade) in cases {
            let (request, result) = parse(&format!("GET / HTTP/1.1\r\n{header}\r\n\r\n"));

            assert_eq!(result, Ok(()), "{header:?}");
            assert_eq!(request.connection(), connection, "{header:?}");
            assert_eq!(request.is_keep_alive(), connection == Connection::KeepAlive);
            assert_eq!(request.accept_encoding(), encoding, "{header:?}");
            assert_eq!(request.upgrade_insecure_requests(), upgrade, "{header:?}");
            assert!(request.headers().is_empty(), "{header:?}");
        }
    }

    #[test]
    fn body_is_everything_after_headers() {
        #[rustfmt::skip]
        let cases = [
            ("POST / HTTP/1.1\r\n\r\n",                          ""),
            ("POST / HTTP/1.1\r\n\r\nx",                         "x"),
            ("POST / HTTP/1.1\r\n\r\nline1\r\nline2\r\n\r\n",    "line1\r\nline2\r\n\r\n"),
            ("GET / HTTP/1.1\r\nContent-Length: 2\r\n\r\nabcd",  "abcd"),
        ];

        for (req, body) in cases {
            let (request, result) = parse(req);

            assert_eq!(result, Ok(()), "{req:?}");
            assert_eq!(request.body(), body);
        }
    }

    #[test]
    fn url_size_limit() {
        let limits = ReqLimits {
            url_size: 8,
            ..ReqLimits::default()
        };
        let mut request = Request::with_limits(&limits);

        let data = ByteBuffer::from("GET /1234567 HTTP/1.1\r\n\r\n");
        assert_eq!(request.parse(&data), Ok(()));

        let data = ByteBuffer::from("GET /12345678 HTTP/1.1\r\n\r\n");
        assert_eq!(
            request.parse(&data),
            Err(ParseError::UriTooLong { limit: 8 })
        );
        assert_eq!(ParseError::UriTooLong { limit: 8 }.status_code(), 414);
    }

    #[test]
    fn reuse_does_not_leak_fields() {
        let mut request = Request::new();

        let first = ByteBuffer::from(
            "POST /a?x=1 HTTP/1.1\r\nHost: first\r\nReferer: r\r\nUser-Agent: ua\r\n\
             Connection: keep-alive\r\nAccept-Encoding: gzip\r\nUpgrade-Insecure-Requests: 1\r\n\
             X-Custom: 1\r\n\r\nbody",
        );
        assert_eq!(request.parse(&first), Ok(()));
        assert_eq!(request.referrer(), "r");

        let second = ByteBuffer::from("GET /b HTTP/2\r\n\r\n");
        assert_eq!(request.parse(&second), Ok(()));

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.version(), Version::Http2);
        assert_eq!(request.target(), "/b");
        assert_eq!(request.uri().query(b"x"), None);
        assert!(request.host().is_empty());
        assert!(request.referrer().is_empty());
        assert!(request.user_agent().is_empty());
        assert_eq!(request.connection(), Connection::Close);
        assert_eq!(request.accept_encoding(), EncodingSet::NONE);
        assert!(!request.upgrade_insecure_requests());
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn small_limits_grow() {
        let limits = ReqLimits {
            scratch_capacity: 1,
            header_capacity: 1,
            body_capacity: 1,
            uri_capacity: 1,
            path_capacity: 1,
            query_key_capacity: 1,
            query_value_capacity: 1,
            query_count: 0,
            header_count: 0,
            ..ReqLimits::default()
        };
        let mut request = Request::with_limits(&limits);

        let data = ByteBuffer::from(format!(
            "POST /some/long/path?key=a%20long%20value HTTP/1.1\r\nUser-Agent: {USER_AGENT}\r\n\
             X-Forwarded-For: 203.0.113.195, 70.41.3.18\r\n\r\n{USER_AGENT}"
        ).as_str());

        assert_eq!(request.parse(&data), Ok(()));
        assert_eq!(request.uri().path_str(), Some("some/long/path"));
        assert_eq!(request.uri().query_str("key"), Some("a long value"));
        assert_eq!(request.user_agent(), USER_AGENT);
        assert_eq!(request.header_str("x-forwarded-for"), Some("203.0.113.195, 70.41.3.18"));
        assert_eq!(request.body(), USER_AGENT);
    }
}
