use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::http::error::{ParseError, WriteError};
use crate::http::parser::RequestParser;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{ResponseWriter, WriterState};

/// Application callback invoked once per connection with the completed request.
///
/// The writer starts in [`WriterState::AwaitingStatusLine`]; the handler must
/// drive it through status line, headers and body before returning. If it
/// fails before writing anything, the connection answers with a 500.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        writer: &mut ResponseWriter<W>,
        request: &Request,
    ) -> impl Future<Output = anyhow::Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// A fallback response written without going through the application handler.
#[derive(Debug, Clone)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub async fn write_to<W>(&self, writer: &mut ResponseWriter<W>) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        let response = Response::error(self.status, &self.message);
        writer.write_response(&response).await
    }
}

/// One request/response cycle over a byte stream. The stream is shut down
/// afterwards; connections are never reused.
pub struct Connection<S> {
    stream: S,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub async fn run<H: Handler>(mut self, handler: &H) -> anyhow::Result<()> {
        let parsed = RequestParser::new().read_from(&mut self.stream).await;

        match parsed {
            Ok(request) => self.respond(handler, &request).await?,
            Err(ParseError::ConnectionClosed) => {
                debug!("peer closed connection without sending a request");
                return Ok(());
            }
            Err(ParseError::Io(e)) => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "rejecting malformed request");
                let mut writer = ResponseWriter::new(&mut self.stream);
                HandlerError::internal(e.to_string())
                    .write_to(&mut writer)
                    .await?;
                writer.flush().await?;
            }
        }

        self.stream.shutdown().await?;
        Ok(())
    }

    async fn respond<H: Handler>(&mut self, handler: &H, request: &Request) -> anyhow::Result<()> {
        info!(
            method = %request.method(),
            path = %request.target(),
            body_len = request.body.len(),
            "handling request"
        );

        let mut writer = ResponseWriter::new(&mut self.stream);

        if let Err(e) = handler.handle(&mut writer, request).await {
            error!(error = %e, path = %request.target(), "handler failed");

            if writer.state() == WriterState::AwaitingStatusLine {
                HandlerError::internal("Internal Server Error")
                    .write_to(&mut writer)
                    .await?;
            }
        }

        writer.flush().await?;
        Ok(())
    }
}
