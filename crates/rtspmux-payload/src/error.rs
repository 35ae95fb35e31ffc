/// Errors produced while decoding control-message bodies and report packets.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The session description is not valid UTF-8.
    #[error("session description is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The report packet is shorter than its header or declared length.
    #[error("report packet on channel {channel} truncated ({len} bytes, need {needed})")]
    Truncated {
        channel: u8,
        len: usize,
        needed: usize,
    },

    /// The report packet carries an unsupported protocol version.
    #[error("report packet on channel {channel} has unsupported version {version}")]
    UnsupportedVersion { channel: u8, version: u8 },

    /// The padding count in the last byte does not fit the packet.
    #[error("report packet on channel {channel} has invalid padding ({padding} bytes)")]
    InvalidPadding { channel: u8, padding: usize },
}

pub type Result<T> = std::result::Result<T, PayloadError>;
