use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::buffer::ReadBuffer;
use crate::http::error::ParseError;
use crate::http::request::{ParserState, Request};

/// Initial capacity of the read buffer. It doubles as needed.
pub const INITIAL_BUFFER_SIZE: usize = 8;

const SUPPORTED_VERSION: &str = "1.1";

/// Reads one request from a byte stream that may deliver data in fragments
/// of any size.
pub struct RequestParser {
    request: Request,
    buffer: ReadBuffer,
    received: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self::with_buffer_size(INITIAL_BUFFER_SIZE)
    }

    pub fn with_buffer_size(size: usize) -> Self {
        Self {
            request: Request::new(),
            buffer: ReadBuffer::with_capacity(size),
            received: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.request.state()
    }

    /// Drives the parser until the request is complete, then validates it.
    ///
    /// Stops reading as soon as the request is done; bytes after a complete
    /// request are left unread or ignored.
    pub async fn read_from<R>(mut self, reader: &mut R) -> Result<Request, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        while !self.request.is_done() {
            let n = reader.read(self.buffer.spare_mut()).await?;

            if n == 0 {
                self.finish_at_eof()?;
                break;
            }

            self.buffer.commit(n);
            self.received += n;

            let consumed = self.request.parse(self.buffer.filled())?;
            self.buffer.consume(consumed);
        }

        validate(&self.request)?;
        Ok(self.request)
    }

    fn finish_at_eof(&mut self) -> Result<(), ParseError> {
        if self.received == 0 {
            return Err(ParseError::ConnectionClosed);
        }

        match self.request.state() {
            ParserState::Initialized | ParserState::ParsingHeaders if !self.buffer.is_empty() => {
                Err(ParseError::UnexpectedEof)
            }
            // A short body is reported by validation.
            _ => {
                self.request.finish();
                Ok(())
            }
        }
    }
}

/// Reads and validates one request from `reader`.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    RequestParser::new().read_from(reader).await
}

/// Checks a completed request for body length, method and version.
pub fn validate(request: &Request) -> Result<(), ParseError> {
    if let Some(declared) = request.content_length()? {
        if request.body.len() < declared {
            return Err(ParseError::TruncatedBody {
                declared,
                received: request.body.len(),
            });
        }
    }

    let method = request.method();
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::MethodNotAllowed(method.to_string()));
    }

    if request.version() != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion(request.version().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut request = Request::new();

        let consumed = request.parse(req).unwrap();

        assert_eq!(request.target(), "/");
        assert_eq!(request.header("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
        assert!(request.is_done());
    }

    #[test]
    fn parse_stops_when_body_incomplete() {
        let req = b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel";
        let mut request = Request::new();

        let consumed = request.parse(req).unwrap();

        assert_eq!(consumed, req.len() - 3);
        assert_eq!(request.state(), ParserState::ParsingBody);
    }

    #[test]
    fn parse_after_done_fails() {
        let mut request = Request::new();
        request.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert!(matches!(request.parse(b"x"), Err(ParseError::AlreadyDone)));
    }

    #[tokio::test]
    async fn read_empty_stream_reports_closed() {
        let mut input: &[u8] = b"";
        let result = read_request(&mut input).await;

        assert!(matches!(result, Err(ParseError::ConnectionClosed)));
    }
}
