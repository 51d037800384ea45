//! Accepts connections one at a time and prints each parsed request.
//!
//! Nothing is written back; the connection is closed after parsing.

use tokio::net::TcpListener;
use tracing::{info, warn};

use wirehttp::config::Config;
use wirehttp::http::parser::read_request;
use wirehttp::http::request::Request;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", cfg.listen_addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        info!("A connection has been accepted from {}", peer);

        match read_request(&mut socket).await {
            Ok(request) => print!("{}", render(&request)),
            Err(e) => warn!(error = %e, "failed to parse request"),
        }

        info!("The connection has been closed");
    }
}

fn render(request: &Request) -> String {
    let mut out = String::new();
    out.push_str("Request line:\n");
    out.push_str(&format!("- Method: {}\n", request.method()));
    out.push_str(&format!("- Target: {}\n", request.target()));
    out.push_str(&format!("- Version: {}\n", request.version()));
    out.push_str("Headers:\n");
    for (name, value) in request.headers.iter() {
        out.push_str(&format!("- {}: {}\n", name, value));
    }
    out.push_str("Body:\n");
    out.push_str(&String::from_utf8_lossy(&request.body));
    out.push('\n');
    out
}
