use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

/// Backlog of input bytes not yet consumed by an extractor.
///
/// Chunks are kept as received until an extractor needs a contiguous view.
/// `len` always equals the sum of the held chunk lengths.
#[derive(Debug, Default)]
pub struct Accumulator {
    chunks: VecDeque<Bytes>,
    len: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Zero-length chunks are dropped.
    pub fn push(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        self.len += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Total buffered bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First buffered byte, if any.
    pub fn first_byte(&self) -> Option<u8> {
        self.chunks.front().map(|chunk| chunk[0])
    }

    /// Copy up to `n` leading bytes, crossing chunk boundaries as needed.
    pub fn peek_prefix(&self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n.min(self.len));
        for chunk in &self.chunks {
            let take = (n - out.len()).min(chunk.len());
            out.extend_from_slice(&chunk[..take]);
            if out.len() == n {
                break;
            }
        }
        out
    }

    /// Contiguous view of the whole backlog.
    ///
    /// Multiple chunks are concatenated once and replace the held chunks, so
    /// repeated calls without new input do not copy again.
    pub fn materialize(&mut self) -> Bytes {
        match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks[0].clone(),
            _ => {
                let mut joined = BytesMut::with_capacity(self.len);
                for chunk in self.chunks.drain(..) {
                    joined.extend_from_slice(&chunk);
                }
                let joined = joined.freeze();
                self.chunks.push_back(joined.clone());
                joined
            }
        }
    }

    /// Drop everything, then re-seed with `leftover` if it is non-empty.
    pub fn reset(&mut self, leftover: Bytes) {
        self.chunks.clear();
        self.len = 0;
        self.push(leftover);
    }
}
