use thiserror::Error;

use crate::http::writer::WriterState;

/// Errors raised while reading a request off the wire.
///
/// Every variant is fatal to the request being parsed. The "needs more data"
/// outcome is not an error: parsing functions report it as zero bytes consumed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Bad colon placement, missing colon or an illegal character in a header name.
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    /// The request line does not split into method, target and version.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("http version not supported: {0}")]
    UnsupportedVersion(String),

    #[error("method not allowed: {0:?}")]
    MethodNotAllowed(String),

    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),

    /// More body bytes were buffered than `Content-Length` allows.
    #[error("invalid length: received {received} body bytes, declared {declared}")]
    FramingViolation { declared: usize, received: usize },

    /// The stream ended before the declared body arrived.
    #[error("truncated body: received {received} body bytes, declared {declared}")]
    TruncatedBody { declared: usize, received: usize },

    /// The stream ended with an unterminated request line or header line pending.
    #[error("stream ended in the middle of the request head")]
    UnexpectedEof,

    /// The peer closed the stream without sending anything.
    #[error("connection closed before any request data")]
    ConnectionClosed,

    #[error("request already done")]
    AlreadyDone,

    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`ResponseWriter`](crate::http::writer::ResponseWriter).
#[derive(Debug, Error)]
pub enum WriteError {
    /// A writer method was called outside of its phase. Nothing was written.
    #[error("cannot write {attempted} while writer is {state:?}")]
    OutOfOrder {
        attempted: &'static str,
        state: WriterState,
    },

    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
}
