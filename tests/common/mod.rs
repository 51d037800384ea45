//! Shared helpers for integration tests.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// A stream that hands out at most `step` bytes per read, then reports EOF.
pub struct ChunkReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl ChunkReader {
    pub fn new(data: impl Into<Vec<u8>>, step: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            step: step.max(1),
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.step).min(buf.remaining());
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}
