use bytes::Bytes;
use rtspmux_payload::{ReportPacket, SessionDescription};

/// One unit produced by the demuxer, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A control message: raw header block plus body, unparsed.
    Control(Bytes),
    /// The decoded body of the control message emitted just before it.
    SessionDescription(SessionDescription),
    /// An interleaved frame on an even channel.
    Media { channel: u8, payload: Bytes },
    /// One report sub-packet from an interleaved frame on an odd channel.
    Report { channel: u8, packet: ReportPacket },
}

impl Message {
    /// Interleaved channel, for binary-derived messages.
    pub fn channel(&self) -> Option<u8> {
        match self {
            Message::Media { channel, .. } | Message::Report { channel, .. } => Some(*channel),
            Message::Control(_) | Message::SessionDescription(_) => None,
        }
    }

    /// Short kind label used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Control(_) => "control",
            Message::SessionDescription(_) => "session-description",
            Message::Media { .. } => "media",
            Message::Report { .. } => "report",
        }
    }
}
