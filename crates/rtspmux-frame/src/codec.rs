//! `tokio_util::codec` adapter over [`Demuxer`].

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::config::DemuxConfig;
use crate::demuxer::Demuxer;
use crate::error::DemuxError;
use crate::message::Message;

/// Decoder yielding one [`Message`] per item, for use with `FramedRead`.
#[derive(Debug, Default)]
pub struct MessageCodec {
    demuxer: Demuxer,
    ready: VecDeque<Message>,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DemuxConfig) -> Self {
        Self {
            demuxer: Demuxer::with_config(config),
            ready: VecDeque::new(),
        }
    }

    pub fn demuxer(&self) -> &Demuxer {
        &self.demuxer
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = DemuxError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, DemuxError> {
        if !src.is_empty() {
            let chunk = src.split().freeze();
            self.ready.extend(self.demuxer.feed(chunk)?);
        }
        Ok(self.ready.pop_front())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>, DemuxError> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }
        match self.demuxer.buffered_len() {
            0 => Ok(None),
            buffered => Err(DemuxError::ConnectionClosed { buffered }),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::test_support::{frame, session_stream};

    #[tokio::test]
    async fn framed_read_yields_every_message() {
        let stream = session_stream();
        let expected = Demuxer::new().feed(stream.clone()).unwrap();

        let framed = FramedRead::new(&stream[..], MessageCodec::new());
        let messages: Vec<Message> = framed.map(|m| m.unwrap()).collect().await;
        assert_eq!(messages, expected);
    }

    #[tokio::test]
    async fn one_byte_writes_produce_same_messages() {
        let stream = session_stream();
        let expected = Demuxer::new().feed(stream.clone()).unwrap();

        let (mut tx, rx) = tokio::io::duplex(1);
        let writer = tokio::spawn(async move {
            tx.write_all(&stream).await.unwrap();
        });

        let framed = FramedRead::new(rx, MessageCodec::new());
        let messages: Vec<Message> = framed.map(|m| m.unwrap()).collect().await;
        writer.await.unwrap();
        assert_eq!(messages, expected);
    }

    #[tokio::test]
    async fn eof_mid_message_is_an_error() {
        let wire = frame(0, b"cut short");
        let mut framed = FramedRead::new(&wire[..6], MessageCodec::new());
        let err = framed.next().await.unwrap().unwrap_err();
        assert!(matches!(err, DemuxError::ConnectionClosed { buffered: 6 }));
    }
}
