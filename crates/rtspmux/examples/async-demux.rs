//! Demux an interleaved stream with `FramedRead` and `MessageCodec`.
//!
//! Run with:
//!   cargo run --example async-demux --features async

use bytes::BytesMut;
use futures_util::StreamExt;
use rtspmux::frame::encode_interleaved;
use rtspmux::{Message, MessageCodec};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::FramedRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = BytesMut::new();
    wire.extend_from_slice(b"RTSP/1.0 200 OK\r\nCSeq: 4\r\nSession: 1\r\n\r\n");
    for seq in 0..3u8 {
        encode_interleaved(0, &[0x80, 0x60, 0x00, seq], &mut wire)?;
    }

    let (mut tx, rx) = tokio::io::duplex(7);
    let writer = tokio::spawn(async move { tx.write_all(&wire).await });

    let mut framed = FramedRead::new(rx, MessageCodec::new());
    while let Some(message) = framed.next().await {
        match message? {
            Message::Media { channel, payload } => {
                eprintln!("[media] channel={channel} seq={}", payload[3]);
            }
            other => eprintln!("[{}]", other.kind()),
        }
    }

    writer.await??;
    Ok(())
}
