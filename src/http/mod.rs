//! HTTP/1.1 protocol engine.
//!
//! Requests are parsed incrementally from a stream that may hand over data
//! in fragments of any size, and responses are written under a strict
//! phase order. Connections serve exactly one request and are then closed.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive header table and its line parser
//! - **`buffer`**: growable read buffer with front compaction
//! - **`request`**: request line, request and the per-step state machine
//! - **`parser`**: drives the state machine from a stream and validates the result
//! - **`response`**: status codes, default headers and buffered responses
//! - **`writer`**: phased response writer with chunked bodies and trailers
//! - **`connection`**: the handler contract and the one-shot connection cycle
//! - **`error`**: parse and write error types
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │ Initialized │ ← Wait for a complete request line
//!        └──────┬──────┘
//!               │ METHOD SP TARGET SP HTTP/VERSION CRLF
//!               ▼
//!        ┌────────────────┐
//!        │ ParsingHeaders │ ← One header line per step
//!        └──────┬─────────┘
//!               │ blank line
//!               ▼
//!        ┌────────────────┐
//!        │  ParsingBody   │ ← Exactly Content-Length bytes
//!        └──────┬─────────┘
//!               ▼
//!        ┌────────────────┐
//!        │      Done      │
//!        └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wirehttp::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! let listener = TcpListener::bind("127.0.0.1:42069").await?;
//! loop {
//!     let (socket, _addr) = listener.accept().await?;
//!     let handler = handler.clone();
//!     tokio::spawn(async move {
//!         if let Err(e) = Connection::new(socket).run(&*handler).await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     });
//! }
//! ```

pub mod buffer;
pub mod connection;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
