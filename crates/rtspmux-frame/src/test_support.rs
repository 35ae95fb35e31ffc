//! Stream builders shared by the unit tests.

use bytes::{BufMut, Bytes, BytesMut};

use crate::interleaved::encode_interleaved;

pub const SDP: &str = "v=0\r\n\
    o=- 0 0 IN IP4 127.0.0.1\r\n\
    s=Stream\r\n\
    t=0 0\r\n\
    m=video 0 RTP/AVP 96\r\n\
    a=rtpmap:96 H264/90000\r\n\
    a=control:trackID=0\r\n";

pub fn options_response(cseq: u32) -> Vec<u8> {
    format!("RTSP/1.0 200 OK\r\nCSeq: {cseq}\r\nPublic: DESCRIBE, SETUP, PLAY\r\n\r\n").into_bytes()
}

pub fn describe_response(cseq: u32, body: &str) -> Vec<u8> {
    format!(
        "RTSP/1.0 200 OK\r\nCSeq: {cseq}\r\nContent-Type: application/sdp\r\ncontent-length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

pub fn frame(channel: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_interleaved(channel, payload, &mut buf).unwrap();
    buf.to_vec()
}

/// A receiver report with no report blocks.
pub fn receiver_report(ssrc: u32) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u8(0x80);
    buf.put_u8(201);
    buf.put_u16(1);
    buf.put_u32(ssrc);
    buf.to_vec()
}

/// A sender report with no report blocks.
pub fn sender_report(ssrc: u32, rtp_timestamp: u32) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u8(0x80);
    buf.put_u8(200);
    buf.put_u16(6);
    buf.put_u32(ssrc);
    buf.put_u64(0);
    buf.put_u32(rtp_timestamp);
    buf.put_u32(0);
    buf.put_u32(0);
    buf.to_vec()
}

/// A realistic session: OPTIONS, DESCRIBE, then interleaved traffic.
pub fn session_stream() -> Bytes {
    let mut wire = Vec::new();
    wire.extend(options_response(1));
    wire.extend(describe_response(2, SDP));
    wire.extend(b"RTSP/1.0 200 OK\r\nCSeq: 3\r\nSession: 12345678\r\n\r\n");
    wire.extend(frame(0, b"\x80\x60\x00\x01rtp-one"));
    wire.extend(frame(0, b"\x80\x60\x00\x02rtp-two"));

    let mut compound = sender_report(0xDEAD_BEEF, 3000);
    compound.extend(receiver_report(0x0102_0304));
    wire.extend(frame(1, &compound));

    wire.extend(options_response(4));
    wire.extend(frame(2, b""));
    wire.extend(frame(3, &receiver_report(7)));
    Bytes::from(wire)
}
