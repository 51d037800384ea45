use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::http::connection::{Connection, Handler};

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// A running server: one accept loop, one task per accepted connection.
///
/// The accepting flag is the only state shared between the accept loop and
/// the caller. Connections share nothing.
pub struct Server {
    local_addr: SocketAddr,
    listening: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    accept_loop: JoinHandle<()>,
}

impl Server {
    /// Binds `addr` and starts accepting connections in the background.
    pub async fn serve<H: Handler>(addr: &str, handler: H) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let listening = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());

        let accept_loop = tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            Arc::clone(&listening),
            Arc::clone(&shutdown),
        ));

        Ok(Self {
            local_addr,
            listening,
            shutdown,
            accept_loop,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Stops accepting and closes the listener. Connections already accepted
    /// run to completion on their own tasks.
    pub async fn close(self) -> anyhow::Result<()> {
        self.listening.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
        self.accept_loop
            .await
            .context("accept loop panicked")?;
        info!("Server stopped");
        Ok(())
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    listening: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    let mut failures: u32 = 0;
    loop {
        let accepted = tokio::select! {
            _ = shutdown.notified() => {
                if !listening.load(Ordering::SeqCst) {
                    break;
                }
                continue;
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((socket, peer)) => {
                failures = 0;
                info!("Accepted connection from {}", peer);

                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    if let Err(e) = Connection::new(socket).run(&*handler).await {
                        error!("Connection error from {}: {}", peer, e);
                    }
                });
            }
            Err(e) => {
                if !listening.load(Ordering::SeqCst) {
                    break;
                }
                failures = failures.saturating_add(1);
                let delay = accept_backoff(failures);
                error!(error = %e, retry_in = ?delay, "Error accepting connection");

                // Errors like EMFILE persist; wait before retrying.
                tokio::select! {
                    _ = shutdown.notified() => {
                        if !listening.load(Ordering::SeqCst) {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
    // Dropping the listener here closes the socket.
}

/// Delay before the next accept after `failures` consecutive errors:
/// doubles from 10ms and is capped at one second.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_MIN
        .saturating_mul(1 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}
