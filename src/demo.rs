//! Example application handler served by the `wirehttp` binary.

use anyhow::Context;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use tracing::{debug, info};

use crate::http::connection::Handler;
use crate::http::headers::HeaderTable;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode, default_headers};
use crate::http::writer::ResponseWriter;
use crate::proxy::Upstream;

pub const SUCCESS_HTML: &str = "<html>\n  <head>\n    <title>200 OK</title>\n  </head>\n  <body>\n    <h1>Success!</h1>\n    <p>Your request was an absolute banger.</p>\n  </body>\n</html>\r\n";

pub const BAD_REQUEST_HTML: &str = "<html>\n  <head>\n    <title>400 Bad Request</title>\n  </head>\n  <body>\n    <h1>Bad Request</h1>\n    <p>Your request honestly kinda sucked.</p>\n  </body>\n</html>\r\n";

pub const INTERNAL_ERROR_HTML: &str = "<html>\n  <head>\n    <title>500 Internal Server Error</title>\n  </head>\n  <body>\n    <h1>Internal Server Error</h1>\n    <p>Okay, you know what? This one is on me.</p>\n  </body>\n</html>\r\n";

/// Targets under this prefix are relayed to the upstream with the prefix removed.
pub const PROXY_PREFIX: &str = "/httpbin";

pub const CONTENT_SHA256_TRAILER: &str = "X-Content-Sha256";
pub const CONTENT_LENGTH_TRAILER: &str = "X-Content-Length";

pub struct DemoHandler {
    upstream: Upstream,
}

impl DemoHandler {
    pub fn new(upstream: Upstream) -> Self {
        Self { upstream }
    }

    async fn relay<W>(&self, writer: &mut ResponseWriter<W>, target: &str) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        info!(upstream = %self.upstream.base(), path = %target, "proxying request");
        let mut upstream = self
            .upstream
            .fetch(target)
            .await
            .with_context(|| format!("failed to fetch {} from upstream", target))?;

        writer.write_status_line(StatusCode::OK).await?;

        let mut headers = default_headers(0);
        headers.remove("Content-Length");
        headers.set("Transfer-Encoding", "chunked");
        headers.set(
            "Trailer",
            format!("{}, {}", CONTENT_SHA256_TRAILER, CONTENT_LENGTH_TRAILER),
        );
        writer.write_headers(&headers).await?;

        let mut hasher = Sha256::new();
        let mut total = 0;
        while let Some(chunk) = upstream.next_chunk().await? {
            debug!(bytes = chunk.len(), "chunking");
            writer.write_chunked_body(&chunk).await?;
            hasher.update(&chunk);
            total += chunk.len();
        }
        writer.write_chunked_body_done().await?;

        let mut trailers = HeaderTable::new();
        trailers.set(CONTENT_SHA256_TRAILER, format!("{:x}", hasher.finalize()));
        trailers.set(CONTENT_LENGTH_TRAILER, total.to_string());
        writer.write_trailers(&trailers).await?;

        info!(bytes = total, status = upstream.status, "finished proxying");
        Ok(())
    }
}

impl Handler for DemoHandler {
    async fn handle<W>(&self, writer: &mut ResponseWriter<W>, request: &Request) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = request.target();

        if let Some(rest) = target.strip_prefix(PROXY_PREFIX) {
            return self.relay(writer, rest).await;
        }

        let response = match target {
            "/yourproblem" => Response::html(StatusCode::BAD_REQUEST, BAD_REQUEST_HTML),
            "/myproblem" => Response::html(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_HTML),
            _ => Response::html(StatusCode::OK, SUCCESS_HTML),
        };

        writer.write_response(&response).await?;
        Ok(())
    }
}
