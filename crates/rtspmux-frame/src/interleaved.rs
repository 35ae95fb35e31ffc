//! Interleaved binary frames embedded in the control connection.
//!
//! Wire format:
//! ```text
//! ┌──────────────┬───────────┬──────────────┬─────────────────┐
//! │ Sentinel     │ Channel   │ Length       │ Payload          │
//! │ 0x24 "$"     │ (1B)      │ (2B BE)      │ (Length bytes)   │
//! └──────────────┴───────────┴──────────────┴─────────────────┘
//! ```
//!
//! Even channels carry media packets. Odd channels carry compound report
//! packets, which are split into their sub-packets here.

use bytes::{BufMut, Bytes, BytesMut};
use rtspmux_payload::parse_report_packet;

use crate::accumulator::Accumulator;
use crate::demuxer::Extraction;
use crate::error::{DemuxError, Result};
use crate::message::Message;

/// Frame sentinel byte (`$`).
pub const SENTINEL: u8 = 0x24;

/// Frame header: sentinel (1) + channel (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// A parsed frame header whose payload may not have arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleavedHeader {
    pub channel: u8,
    /// Offset of the first payload byte in the backlog.
    pub payload_start: usize,
    /// Offset one past the last payload byte in the backlog.
    pub payload_end: usize,
}

impl InterleavedHeader {
    /// Parse a header whose first byte is already known to be the sentinel.
    pub fn parse(header: [u8; HEADER_SIZE]) -> Self {
        let length = usize::from(u16::from_be_bytes([header[2], header[3]]));
        Self {
            channel: header[1],
            payload_start: HEADER_SIZE,
            payload_end: HEADER_SIZE + length,
        }
    }

    pub fn payload_len(&self) -> usize {
        self.payload_end - self.payload_start
    }

    /// Odd channels carry report packets.
    pub fn is_report_channel(&self) -> bool {
        self.channel % 2 == 1
    }
}

/// Encode one interleaved frame.
pub fn encode_interleaved(channel: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(DemuxError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(SENTINEL);
    dst.put_u8(channel);
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Pull one frame off the front of the backlog.
///
/// `pending` caches the parsed header between calls that lack the payload;
/// it is cleared exactly when the frame is consumed.
pub(crate) fn extract(
    backlog: &mut Accumulator,
    pending: &mut Option<InterleavedHeader>,
) -> Result<Extraction> {
    if backlog.len() < HEADER_SIZE {
        return Ok(Extraction::Incomplete);
    }

    let header = match *pending {
        Some(header) => header,
        None => {
            let prefix = backlog.peek_prefix(HEADER_SIZE);
            let header = InterleavedHeader::parse([prefix[0], prefix[1], prefix[2], prefix[3]]);
            tracing::debug!(
                channel = header.channel,
                payload_len = header.payload_len(),
                "interleaved header parsed"
            );
            *pending = Some(header);
            header
        }
    };

    if backlog.len() < header.payload_end {
        return Ok(Extraction::Incomplete);
    }

    let buf = backlog.materialize();
    let payload = buf.slice(header.payload_start..header.payload_end);
    *pending = None;
    backlog.reset(buf.slice(header.payload_end..));

    tracing::trace!(
        channel = header.channel,
        size = payload.len(),
        "interleaved frame extracted"
    );

    if header.is_report_channel() {
        split_compound(header.channel, payload).map(Extraction::Consumed)
    } else {
        Ok(Extraction::Consumed(vec![Message::Media {
            channel: header.channel,
            payload,
        }]))
    }
}

/// Split a compound report payload into its sub-packets.
fn split_compound(channel: u8, payload: Bytes) -> Result<Vec<Message>> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while offset < payload.len() {
        let remaining = payload.len() - offset;
        if remaining < HEADER_SIZE {
            return Err(DemuxError::MalformedCompoundPacket {
                channel,
                offset,
                declared: HEADER_SIZE,
                remaining,
            });
        }

        let words = u16::from_be_bytes([payload[offset + 2], payload[offset + 3]]);
        let declared = (usize::from(words) + 1) * 4;
        if declared > remaining {
            return Err(DemuxError::MalformedCompoundPacket {
                channel,
                offset,
                declared,
                remaining,
            });
        }

        let packet = parse_report_packet(channel, payload.slice(offset..offset + declared))?;
        messages.push(Message::Report { channel, packet });
        offset += declared;
    }

    Ok(messages)
}
