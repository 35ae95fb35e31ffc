use rtspmux_payload::PayloadError;

/// Errors that can occur while demultiplexing an interleaved stream.
///
/// Every error returned from [`Demuxer::feed`](crate::Demuxer::feed) is
/// fatal: the stream is desynchronized and the instance must be discarded.
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// The backlog starts with neither the frame sentinel nor a control
    /// protocol signature.
    #[error("unrecognized framing (leading bytes {prefix:02x?})")]
    UnrecognizedFraming { prefix: Vec<u8> },

    /// A report sub-packet declares more bytes than its frame has left.
    #[error(
        "malformed compound packet on channel {channel}: sub-packet at offset {offset} \
         declares {declared} bytes, {remaining} remaining"
    )]
    MalformedCompoundPacket {
        channel: u8,
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// The `Content-Length` header value is not a decimal byte count.
    #[error("invalid Content-Length value {0:?}")]
    InvalidContentLength(String),

    /// A control message header block exceeds the configured maximum.
    #[error("control header too large ({size} bytes, max {max})")]
    HeaderTooLarge { size: usize, max: usize },

    /// A declared control message body exceeds the configured maximum.
    #[error("control body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// An interleaved payload does not fit the 16-bit length field.
    #[error("interleaved payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The session description or report parser rejected its input.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// The demuxer already failed and cannot be fed further bytes.
    #[error("demuxer poisoned by an earlier framing error")]
    Poisoned,

    /// An I/O error occurred while reading from the underlying stream.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a message.
    #[error("connection closed ({buffered} bytes of incomplete message buffered)")]
    ConnectionClosed { buffered: usize },
}

impl DemuxError {
    /// Returns true if the stream cannot be resumed after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DemuxError::Io(_) | DemuxError::PayloadTooLarge { .. })
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
