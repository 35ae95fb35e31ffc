use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::config::ReaderConfig;
use crate::demuxer::Demuxer;
use crate::error::{DemuxError, Result};
use crate::message::Message;

/// Reads demultiplexed messages from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete messages.
pub struct MessageReader<T> {
    inner: T,
    demuxer: Demuxer,
    ready: VecDeque<Message>,
    config: ReaderConfig,
    finished: bool,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: ReaderConfig) -> Self {
        Self {
            inner,
            demuxer: Demuxer::with_config(config.demux),
            ready: VecDeque::new(),
            config,
            finished: false,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Ok(None)` at EOF on a message boundary and
    /// `Err(DemuxError::ConnectionClosed)` at EOF inside a message.
    pub fn read_message(&mut self) -> Result<Option<Message>> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                return Ok(Some(message));
            }

            let mut chunk = BytesMut::zeroed(self.config.read_chunk_size.max(1));
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DemuxError::Io(err)),
            };

            if read == 0 {
                let buffered = self.demuxer.buffered_len();
                if buffered == 0 {
                    return Ok(None);
                }
                return Err(DemuxError::ConnectionClosed { buffered });
            }

            chunk.truncate(read);
            self.ready.extend(self.demuxer.feed(chunk.freeze())?);
        }
    }

    /// Borrow the demuxer, e.g. to inspect buffered state.
    pub fn demuxer(&self) -> &Demuxer {
        &self.demuxer
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<T: Read> Iterator for MessageReader<T> {
    type Item = Result<Message>;

    /// Yields messages until EOF or the first error, then stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.read_message().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}
