//! Upstream connection and response streaming
//!
//! A minimal HTTP client used to relay a resource from the configured
//! upstream. Requests go out as `HTTP/1.0` with `Connection: close`, so the
//! upstream answers with a close-delimited body that can be streamed until EOF.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Size of each read from the upstream, and so of each relayed chunk.
pub const CHUNK_SIZE: usize = 1024;

/// Largest response head accepted from the upstream.
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Client for a single upstream base URL.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: Url,
    connect_timeout: Duration,
}

/// An upstream response whose head has been read and whose body is still
/// on the wire.
pub struct UpstreamResponse {
    /// Status code from the upstream status line.
    pub status: u16,
    stream: TcpStream,
    pending: BytesMut,
}

impl Upstream {
    pub fn new(base: Url, connect_timeout: Duration) -> Self {
        Self {
            base,
            connect_timeout,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build the request bytes sent upstream for `target`.
    ///
    /// `target` is appended to the base URL's path.
    pub fn build_request(&self, target: &str) -> Result<Vec<u8>> {
        let host = self.base.host_str().context("Upstream URL missing host")?;
        let host_value = match self.base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let base_path = self.base.path().trim_end_matches('/');
        let path = match target {
            "" => format!("{}/", base_path),
            t if t.starts_with('/') => format!("{}{}", base_path, t),
            t => format!("{}/{}", base_path, t),
        };

        let mut buffer = Vec::new();
        buffer.extend_from_slice(format!("GET {} HTTP/1.0\r\n", path).as_bytes());
        buffer.extend_from_slice(format!("Host: {}\r\n", host_value).as_bytes());
        buffer.extend_from_slice(b"Connection: close\r\n");
        buffer.extend_from_slice(b"\r\n");

        Ok(buffer)
    }

    /// Send `GET target` upstream and read the response head.
    pub async fn fetch(&self, target: &str) -> Result<UpstreamResponse> {
        let host = self.base.host_str().context("Upstream URL missing host")?;
        let port = self.base.port_or_known_default().unwrap_or(80);
        let addr = format!("{}:{}", host, port);

        let mut stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .context("Connection timeout")?
            .with_context(|| format!("Failed to connect to upstream {}", addr))?;

        tracing::trace!(upstream = %addr, "Connected to upstream");

        let request = self.build_request(target)?;
        stream.write_all(&request).await?;
        stream.flush().await?;

        let mut buffer = BytesMut::with_capacity(CHUNK_SIZE * 8);
        loop {
            if let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = buffer.split_to(head_end + 4);
                let status = parse_status_code(&head)?;

                tracing::debug!(upstream = %addr, status, "Upstream responded");

                return Ok(UpstreamResponse {
                    status,
                    stream,
                    pending: buffer,
                });
            }

            if buffer.len() > MAX_HEAD_SIZE {
                bail!("Upstream response head too large");
            }

            let n = stream.read_buf(&mut buffer).await?;
            if n == 0 {
                bail!("Upstream closed connection before complete response head");
            }
        }
    }
}

impl UpstreamResponse {
    /// Next slice of the body, or `None` once the upstream closes the connection.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.pending.is_empty() {
            self.pending.reserve(CHUNK_SIZE);
            let n = self.stream.read_buf(&mut self.pending).await?;
            if n == 0 {
                return Ok(None);
            }
        }

        let take = self.pending.len().min(CHUNK_SIZE);
        Ok(Some(self.pending.split_to(take).freeze()))
    }
}

/// Parse the code out of `HTTP/1.x <code> <reason>`.
fn parse_status_code(head: &[u8]) -> Result<u16> {
    let head = std::str::from_utf8(head).context("Invalid UTF-8 in upstream response head")?;
    let status_line = head.lines().next().context("Empty upstream response")?;

    let code = status_line
        .split(' ')
        .nth(1)
        .with_context(|| format!("Invalid status line: {}", status_line))?;

    code.parse::<u16>()
        .with_context(|| format!("Invalid status code: {}", code))
}
