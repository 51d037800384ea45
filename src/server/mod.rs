//! TCP server: accept loop and per-connection tasks.

pub mod listener;

pub use listener::Server;
