//! Incremental demultiplexing of RTSP control connections.
//!
//! One TCP connection carries two interleaved sub-protocols:
//! - Textual control messages, starting with `RTSP` and ending at the
//!   first blank line, optionally followed by a `Content-Length` body
//! - Binary frames: a `$` sentinel, a 1-byte channel and a 2-byte
//!   big-endian length, then the payload
//!
//! [`Demuxer::feed`] accepts bytes in any chunking, down to one byte at a
//! time, and returns every message that became complete. It never blocks.

pub mod accumulator;
#[cfg(feature = "async")]
pub mod codec;
pub mod config;
pub mod control;
pub mod demuxer;
pub mod error;
pub mod interleaved;
pub mod message;
pub mod mode;
pub mod reader;

#[cfg(test)]
mod test_support;

#[cfg(feature = "async")]
pub use codec::MessageCodec;
pub use config::{
    DemuxConfig, ReaderConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_SIZE,
    DEFAULT_READ_CHUNK_SIZE,
};
pub use demuxer::Demuxer;
pub use error::{DemuxError, Result};
pub use interleaved::{encode_interleaved, InterleavedHeader, HEADER_SIZE, MAX_PAYLOAD, SENTINEL};
pub use message::Message;
pub use mode::Mode;
pub use reader::MessageReader;
