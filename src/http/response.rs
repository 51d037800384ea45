use crate::http::headers::HeaderTable;

/// An HTTP status code.
///
/// Any `u16` can be carried; only the codes in the status-line table
/// produce a status line on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

/// Fixed status lines, keyed by code.
static STATUS_LINES: &[(u16, &str, &str)] = &[
    (200, "OK", "HTTP/1.1 200 OK\r\n"),
    (201, "Created", "HTTP/1.1 201 Created\r\n"),
    (204, "No Content", "HTTP/1.1 204 No Content\r\n"),
    (400, "Bad Request", "HTTP/1.1 400 Bad Request\r\n"),
    (404, "Not Found", "HTTP/1.1 404 Not Found\r\n"),
    (405, "Method Not Allowed", "HTTP/1.1 405 Method Not Allowed\r\n"),
    (500, "Internal Server Error", "HTTP/1.1 500 Internal Server Error\r\n"),
    (502, "Bad Gateway", "HTTP/1.1 502 Bad Gateway\r\n"),
];

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use wirehttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the standard reason phrase, if the code is in the table.
    ///
    /// # Example
    ///
    /// ```
    /// # use wirehttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), Some("Not Found"));
    /// assert_eq!(StatusCode(418).reason_phrase(), None);
    /// ```
    pub fn reason_phrase(&self) -> Option<&'static str> {
        self.entry().map(|(_, reason, _)| *reason)
    }

    /// Returns the full CRLF-terminated status line, if the code is in the table.
    pub fn status_line(&self) -> Option<&'static str> {
        self.entry().map(|(_, _, line)| *line)
    }

    fn entry(&self) -> Option<&'static (u16, &'static str, &'static str)> {
        STATUS_LINES.iter().find(|(code, _, _)| *code == self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// The headers every plain response carries unless the caller overrides them.
pub fn default_headers(content_length: usize) -> HeaderTable {
    let mut headers = HeaderTable::new();
    headers.set("Content-Length", content_length.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

/// A fully-buffered response: status, headers and body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderTable,
    pub body: Vec<u8>,
}

/// Builder for constructing responses in a fluent style.
///
/// Starts from [`default_headers`] sized to the body; headers set on the
/// builder replace the defaults.
///
/// # Example
///
/// ```
/// # use wirehttp::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.headers.get("content-length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderTable,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderTable::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        let mut headers = default_headers(self.body.len());
        for (name, value) in self.headers.iter() {
            headers.set(name, value);
        }

        Response {
            status: self.status,
            headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a simple 200 OK plain-text response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::OK).body(body).build()
    }

    /// Creates a response with the given status and HTML body.
    pub fn html(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", "text/html")
            .body(body)
            .build()
    }

    /// Creates a plain-text error response carrying `message` as its body.
    pub fn error(status: StatusCode, message: &str) -> Self {
        ResponseBuilder::new(status).body(message).build()
    }
}
