use std::cmp::Ordering;

use crate::http::error::ParseError;
use crate::http::headers::{HeaderTable, find_crlf};

/// Progress of a [`Request`] through the parser. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for a complete request line.
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// The first line of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// The method token, e.g. `GET`.
    pub method: String,
    /// The request target, kept as sent.
    pub target: String,
    /// Protocol version without the `HTTP/` prefix, e.g. `1.1`.
    pub version: String,
}

impl RequestLine {
    /// Parses a CRLF-terminated request line from the front of `buf`.
    ///
    /// Returns `None` when no complete line is buffered yet, otherwise the
    /// line together with the number of bytes it occupies including the CRLF.
    pub fn parse(buf: &[u8]) -> Result<Option<(Self, usize)>, ParseError> {
        let Some(line_end) = find_crlf(buf) else {
            return Ok(None);
        };

        let line = std::str::from_utf8(&buf[..line_end]).map_err(|_| {
            ParseError::MalformedRequestLine(String::from_utf8_lossy(&buf[..line_end]).into_owned())
        })?;
        let malformed = || ParseError::MalformedRequestLine(line.to_string());

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, protocol] = parts.as_slice() else {
            return Err(malformed());
        };

        let (_, version) = protocol.split_once('/').ok_or_else(malformed)?;

        let request_line = RequestLine {
            method: method.to_string(),
            target: target.to_string(),
            version: version.to_string(),
        };

        Ok(Some((request_line, line_end + 2)))
    }
}

/// A request as read from a connection.
///
/// Created empty, filled in by [`Request::parse`] until the state reaches
/// [`ParserState::Done`], then handed read-only to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: HeaderTable,
    pub body: Vec<u8>,
    state: ParserState,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: HeaderTable::new(),
            body: Vec::new(),
            state: ParserState::Initialized,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn version(&self) -> &str {
        &self.request_line.version
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The declared `Content-Length`, if any.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        self.headers
            .get("content-length")
            .map(|v| {
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidContentLength(v.to_string()))
            })
            .transpose()
    }

    /// Feeds buffered bytes to the state machine.
    ///
    /// Keeps stepping while progress is made and returns the total number of
    /// bytes consumed from the front of `data`. `Ok(0)` means more data is needed.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::AlreadyDone);
        }

        let mut consumed = 0;
        while !self.is_done() {
            let n = self.parse_single(&data[consumed..])?;
            if n == 0 {
                break;
            }
            consumed += n;
        }

        Ok(consumed)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((request_line, n)) = RequestLine::parse(data)? else {
                    return Ok(0);
                };
                tracing::debug!(
                    method = %request_line.method,
                    path = %request_line.target,
                    version = %request_line.version,
                    "parsed request line"
                );
                self.request_line = request_line;
                self.state = ParserState::ParsingHeaders;
                Ok(n)
            }
            ParserState::ParsingHeaders => {
                let (n, done) = self.headers.parse_next(data)?;
                if done {
                    self.state = ParserState::ParsingBody;
                }
                Ok(n)
            }
            ParserState::ParsingBody => {
                let Some(declared) = self.content_length()? else {
                    self.state = ParserState::Done;
                    return Ok(0);
                };

                match data.len().cmp(&declared) {
                    Ordering::Greater => Err(ParseError::FramingViolation {
                        declared,
                        received: data.len(),
                    }),
                    Ordering::Equal => {
                        self.body = data.to_vec();
                        self.state = ParserState::Done;
                        Ok(data.len())
                    }
                    Ordering::Less => Ok(0),
                }
            }
            ParserState::Done => Err(ParseError::AlreadyDone),
        }
    }

    /// Marks the request complete without further input (clean end of stream).
    pub(crate) fn finish(&mut self) {
        self.state = ParserState::Done;
    }
}

/// Builder for constructing already-complete requests, mostly for handlers under test.
pub struct RequestBuilder {
    request_line: RequestLine,
    headers: HeaderTable,
    body: Vec<u8>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            request_line: RequestLine {
                method: "GET".to_string(),
                target: "/".to_string(),
                version: "1.1".to_string(),
            },
            headers: HeaderTable::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request_line.method = method.into();
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.request_line.target = target.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.request_line.version = version.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        Request {
            request_line: self.request_line,
            headers: self.headers,
            body: self.body,
            state: ParserState::Done,
        }
    }
}
