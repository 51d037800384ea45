use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::WriteError;
use crate::http::headers::HeaderTable;
use crate::http::response::{Response, StatusCode};

/// Phase of a [`ResponseWriter`]. Transitions only go forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    AwaitingStatusLine,
    AwaitingHeaders,
    AwaitingBody,
}

/// Progress of the body inside [`WriterState::AwaitingBody`]. The first body
/// write fixes the framing for the rest of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyState {
    Open,
    Raw,
    Chunked,
    ChunksDone,
    Finished,
}

/// Writes a response onto a sink in strict status line → headers → body order.
///
/// Each method is only legal in its phase; calling one out of order returns
/// [`WriteError::OutOfOrder`] and writes nothing.
///
/// A response body is either raw or chunked, never both.
/// A chunked body is sent with [`write_chunked_body`](Self::write_chunked_body),
/// closed with [`write_chunked_body_done`](Self::write_chunked_body_done) and
/// finished with [`write_trailers`](Self::write_trailers), which may be empty.
pub struct ResponseWriter<W> {
    sink: W,
    state: WriterState,
    body: BodyState,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::AwaitingStatusLine,
            body: BodyState::Open,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state(WriterState::AwaitingStatusLine, "status line")?;

        // Codes missing from the table write nothing.
        let line = status.status_line().unwrap_or("");
        self.sink.write_all(line.as_bytes()).await?;

        self.state = WriterState::AwaitingHeaders;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &HeaderTable) -> Result<(), WriteError> {
        self.expect_state(WriterState::AwaitingHeaders, "headers")?;

        self.sink.write_all(&serialize_fields(headers)).await?;

        self.state = WriterState::AwaitingBody;
        Ok(())
    }

    /// Writes raw body bytes. May be called repeatedly; matching a declared
    /// `Content-Length` is up to the caller.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_body(&[BodyState::Open, BodyState::Raw], "body")?;

        self.sink.write_all(body).await?;
        self.body = BodyState::Raw;
        Ok(body.len())
    }

    /// Writes one chunk: hex length, CRLF, payload, CRLF.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.expect_body(&[BodyState::Open, BodyState::Chunked], "chunked body")?;

        let mut frame = Vec::with_capacity(chunk.len() + 20);
        frame.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        frame.extend_from_slice(chunk);
        frame.extend_from_slice(b"\r\n");
        self.sink.write_all(&frame).await?;

        self.body = BodyState::Chunked;
        Ok(chunk.len())
    }

    /// Writes the terminating zero-length chunk, `0\r\n`.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_body(&[BodyState::Open, BodyState::Chunked], "last chunk")?;

        self.sink.write_all(b"0\r\n").await?;

        self.body = BodyState::ChunksDone;
        Ok(())
    }

    /// Writes trailer fields and the final blank line after the last chunk.
    ///
    /// The trailer names should have been announced in a `Trailer` header.
    pub async fn write_trailers(&mut self, trailers: &HeaderTable) -> Result<(), WriteError> {
        self.expect_body(&[BodyState::ChunksDone], "trailers")?;

        self.sink.write_all(&serialize_fields(trailers)).await?;

        self.body = BodyState::Finished;
        Ok(())
    }

    /// Writes a fully-buffered response through all three phases.
    pub async fn write_response(&mut self, response: &Response) -> Result<(), WriteError> {
        self.write_status_line(response.status).await?;
        self.write_headers(&response.headers).await?;
        self.write_body(&response.body).await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.sink.flush().await?;
        Ok(())
    }

    fn expect_state(&self, expected: WriterState, attempted: &'static str) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::OutOfOrder {
                attempted,
                state: self.state,
            });
        }
        Ok(())
    }

    fn expect_body(&self, allowed: &[BodyState], attempted: &'static str) -> Result<(), WriteError> {
        self.expect_state(WriterState::AwaitingBody, attempted)?;
        if !allowed.contains(&self.body) {
            return Err(WriteError::OutOfOrder {
                attempted,
                state: self.state,
            });
        }
        Ok(())
    }
}

/// `Name: value\r\n` for every field, then the blank line.
fn serialize_fields(fields: &HeaderTable) -> Vec<u8> {
    let mut buf = Vec::new();
    for (name, value) in fields.iter() {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    buf
}
