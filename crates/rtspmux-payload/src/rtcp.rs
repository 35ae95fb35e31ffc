//! RTP control protocol report packets.
//!
//! Each report sub-packet starts with a 4-byte header:
//!
//! ```text
//! ┌───┬───┬─────────┬──────────────┬──────────────────────┐
//! │ V │ P │ count   │ packet type  │ length               │
//! │ 2b│ 1b│ 5 bits  │ (1B)         │ (2B BE, words - 1)   │
//! └───┴───┴─────────┴──────────────┴──────────────────────┘
//! ```
//!
//! Sender reports, receiver reports and goodbye packets are decoded; every
//! other type keeps its body as raw bytes.

use bytes::{Buf, Bytes};
use serde::Serialize;

use crate::error::{PayloadError, Result};

/// Size of the common report header.
pub const REPORT_HEADER_SIZE: usize = 4;

/// The only protocol version in use.
pub const REPORT_VERSION: u8 = 2;

pub const PT_SENDER_REPORT: u8 = 200;
pub const PT_RECEIVER_REPORT: u8 = 201;
pub const PT_SOURCE_DESCRIPTION: u8 = 202;
pub const PT_GOODBYE: u8 = 203;
pub const PT_APPLICATION: u8 = 204;

const SENDER_INFO_SIZE: usize = 20;
const REPORT_BLOCK_SIZE: usize = 24;

/// Common header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportHeader {
    pub version: u8,
    pub padding: bool,
    /// Report count, source count or subtype depending on the packet type.
    pub count: u8,
    pub packet_type: u8,
    /// Length in 32-bit words minus one, as on the wire.
    pub length: u16,
}

impl ReportHeader {
    /// Total packet size in bytes, header included.
    pub fn packet_size(&self) -> usize {
        (usize::from(self.length) + 1) * 4
    }
}

/// A decoded report sub-packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPacket {
    pub channel: u8,
    pub header: ReportHeader,
    pub body: ReportBody,
}

impl ReportPacket {
    /// Short name of the packet type (`SR`, `RR`, `BYE`, ...).
    pub fn type_name(&self) -> &'static str {
        packet_type_name(self.header.packet_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBody {
    SenderReport {
        ssrc: u32,
        sender_info: SenderInfo,
        blocks: Vec<ReportBlock>,
    },
    ReceiverReport {
        ssrc: u32,
        blocks: Vec<ReportBlock>,
    },
    Goodbye {
        sources: Vec<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Other {
        payload: Bytes,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SenderInfo {
    pub ntp_timestamp: u64,
    pub rtp_timestamp: u32,
    pub packet_count: u32,
    pub octet_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportBlock {
    pub ssrc: u32,
    pub fraction_lost: u8,
    /// Signed 24-bit cumulative loss, sign-extended.
    pub cumulative_lost: i32,
    pub highest_sequence: u32,
    pub jitter: u32,
    pub last_sender_report: u32,
    pub delay_since_last_sender_report: u32,
}

/// Returns a short name for a report packet type.
pub fn packet_type_name(packet_type: u8) -> &'static str {
    match packet_type {
        PT_SENDER_REPORT => "SR",
        PT_RECEIVER_REPORT => "RR",
        PT_SOURCE_DESCRIPTION => "SDES",
        PT_GOODBYE => "BYE",
        PT_APPLICATION => "APP",
        205 => "RTPFB",
        206 => "PSFB",
        207 => "XR",
        _ => "UNKNOWN",
    }
}

/// Decode one report sub-packet received on `channel`.
///
/// `data` must start at the sub-packet header. Bytes past the declared
/// length are ignored.
pub fn parse_report_packet(channel: u8, data: Bytes) -> Result<ReportPacket> {
    if data.len() < REPORT_HEADER_SIZE {
        return Err(PayloadError::Truncated {
            channel,
            len: data.len(),
            needed: REPORT_HEADER_SIZE,
        });
    }

    let header = ReportHeader {
        version: data[0] >> 6,
        padding: data[0] & 0x20 != 0,
        count: data[0] & 0x1F,
        packet_type: data[1],
        length: u16::from_be_bytes([data[2], data[3]]),
    };

    if header.version != REPORT_VERSION {
        return Err(PayloadError::UnsupportedVersion {
            channel,
            version: header.version,
        });
    }

    let size = header.packet_size();
    if data.len() < size {
        return Err(PayloadError::Truncated {
            channel,
            len: data.len(),
            needed: size,
        });
    }

    let mut body = data.slice(REPORT_HEADER_SIZE..size);
    if header.padding {
        let padding = body.last().copied().map(usize::from).unwrap_or(0);
        if padding == 0 || padding > body.len() {
            return Err(PayloadError::InvalidPadding { channel, padding });
        }
        body.truncate(body.len() - padding);
    }

    let body = match header.packet_type {
        PT_SENDER_REPORT => {
            let needed = 4 + SENDER_INFO_SIZE + REPORT_BLOCK_SIZE * usize::from(header.count);
            ensure_len(channel, &body, needed)?;
            let ssrc = body.get_u32();
            let sender_info = SenderInfo {
                ntp_timestamp: body.get_u64(),
                rtp_timestamp: body.get_u32(),
                packet_count: body.get_u32(),
                octet_count: body.get_u32(),
            };
            ReportBody::SenderReport {
                ssrc,
                sender_info,
                blocks: read_blocks(&mut body, header.count),
            }
        }
        PT_RECEIVER_REPORT => {
            let needed = 4 + REPORT_BLOCK_SIZE * usize::from(header.count);
            ensure_len(channel, &body, needed)?;
            let ssrc = body.get_u32();
            ReportBody::ReceiverReport {
                ssrc,
                blocks: read_blocks(&mut body, header.count),
            }
        }
        PT_GOODBYE => read_goodbye(channel, body, header.count)?,
        _ => ReportBody::Other { payload: body },
    };

    tracing::trace!(
        channel,
        packet_type = packet_type_name(header.packet_type),
        size,
        "parsed report packet"
    );

    Ok(ReportPacket {
        channel,
        header,
        body,
    })
}

fn ensure_len(channel: u8, body: &Bytes, needed: usize) -> Result<()> {
    if body.len() < needed {
        return Err(PayloadError::Truncated {
            channel,
            len: REPORT_HEADER_SIZE + body.len(),
            needed: REPORT_HEADER_SIZE + needed,
        });
    }
    Ok(())
}

// Caller has checked that `count` blocks are available.
fn read_blocks(body: &mut Bytes, count: u8) -> Vec<ReportBlock> {
    (0..count)
        .map(|_| {
            let ssrc = body.get_u32();
            let loss = body.get_u32();
            ReportBlock {
                ssrc,
                fraction_lost: (loss >> 24) as u8,
                cumulative_lost: ((loss << 8) as i32) >> 8,
                highest_sequence: body.get_u32(),
                jitter: body.get_u32(),
                last_sender_report: body.get_u32(),
                delay_since_last_sender_report: body.get_u32(),
            }
        })
        .collect()
}

fn read_goodbye(channel: u8, mut body: Bytes, count: u8) -> Result<ReportBody> {
    ensure_len(channel, &body, 4 * usize::from(count))?;
    let sources = (0..count).map(|_| body.get_u32()).collect();

    let reason = if body.has_remaining() {
        let len = usize::from(body.get_u8());
        ensure_len(channel, &body, len)?;
        Some(String::from_utf8_lossy(&body[..len]).into_owned())
    } else {
        None
    };

    Ok(ReportBody::Goodbye { sources, reason })
}
