//! wirehttp - a minimal HTTP/1.1 engine over raw byte streams.
//!
//! Core library for incremental request parsing, phased response writing
//! and the one-request-per-connection server.

pub mod config;
pub mod demo;
pub mod http;
pub mod proxy;
pub mod server;
