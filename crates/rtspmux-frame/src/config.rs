/// Default maximum control header block size: 64 KiB.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 64 * 1024;

/// Default maximum declared control body size: 16 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Default chunk size for blocking reads.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Limits and options for a [`Demuxer`](crate::Demuxer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemuxConfig {
    /// Maximum control header block size, terminator included.
    pub max_header_size: usize,
    /// Maximum `Content-Length` accepted before waiting for a body.
    pub max_body_size: usize,
    /// Also classify server-to-client request lines (`ANNOUNCE`,
    /// `SET_PARAMETER`, ...) as control messages.
    pub accept_server_requests: bool,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            accept_server_requests: false,
        }
    }
}

/// Configuration for [`MessageReader`](crate::MessageReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes requested from the stream per read call.
    pub read_chunk_size: usize,
    pub demux: DemuxConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            demux: DemuxConfig::default(),
        }
    }
}
