/// Contiguous read buffer that doubles its capacity when full.
///
/// Unconsumed bytes always start at offset 0: [`consume`](Self::consume)
/// shifts the remainder to the front, so a parser scanning [`filled`](Self::filled)
/// never has to track a read cursor.
#[derive(Debug)]
pub struct ReadBuffer {
    buf: Vec<u8>,
    filled: usize,
}

impl ReadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of buffered, unconsumed bytes.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Returns the free tail of the buffer, doubling the capacity first if
    /// there is no room left. Never returns an empty slice.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        if self.filled == self.buf.len() {
            let grown = self.buf.len() * 2;
            tracing::trace!(from = self.buf.len(), to = grown, "growing read buffer");
            self.buf.resize(grown, 0);
        }
        &mut self.buf[self.filled..]
    }

    /// Marks `n` bytes written into [`spare_mut`](Self::spare_mut) as filled.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.buf.len());
        self.filled = (self.filled + n).min(self.buf.len());
    }

    /// Drops `n` bytes from the front and moves the remainder to offset 0.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.filled);
        if n == 0 {
            return;
        }
        self.buf.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}
