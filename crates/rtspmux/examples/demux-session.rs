//! Demux a synthetic PLAY session from an in-memory stream.
//!
//! Run with:
//!   cargo run --example demux-session

use std::io::Cursor;

use bytes::BytesMut;
use rtspmux::frame::encode_interleaved;
use rtspmux::{Message, MessageReader};

fn session_bytes() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let sdp = "v=0\r\ns=Example\r\nt=0 0\r\nm=video 0 RTP/AVP 96\r\na=control:trackID=0\r\n";
    let mut wire = BytesMut::new();
    wire.extend_from_slice(
        format!(
            "RTSP/1.0 200 OK\r\nCSeq: 2\r\nContent-Type: application/sdp\r\nContent-Length: {}\r\n\r\n{sdp}",
            sdp.len()
        )
        .as_bytes(),
    );
    wire.extend_from_slice(b"RTSP/1.0 200 OK\r\nCSeq: 3\r\nSession: 1\r\n\r\n");
    encode_interleaved(0, b"\x80\x60\x00\x01media", &mut wire)?;
    encode_interleaved(1, &[0x80, 201, 0x00, 0x01, 0, 0, 0, 7], &mut wire)?;
    Ok(wire.to_vec())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for message in MessageReader::new(Cursor::new(session_bytes()?)) {
        match message? {
            Message::Control(raw) => {
                let status = raw.split(|&b| b == b'\r').next().unwrap_or_default();
                eprintln!("[control] {}", String::from_utf8_lossy(status));
            }
            Message::SessionDescription(sdp) => {
                eprintln!("[sdp] {} media section(s)", sdp.media.len());
            }
            Message::Media { channel, payload } => {
                eprintln!("[media] channel={channel} size={}", payload.len());
            }
            Message::Report { channel, packet } => {
                eprintln!("[report] channel={channel} type={}", packet.type_name());
            }
        }
    }
    Ok(())
}
