//! Demultiplex RTSP control connections with interleaved RTP/RTCP.
//!
//! # Crate Structure
//!
//! - [`frame`]: Incremental demuxer, blocking reader and async codec
//! - [`payload`]: Session description and report packet decoders

/// Re-export demuxer types.
pub mod frame {
    pub use rtspmux_frame::*;
}

/// Re-export payload decoder types.
pub mod payload {
    pub use rtspmux_payload::*;
}

pub use rtspmux_frame::{Demuxer, DemuxConfig, DemuxError, Message, MessageReader};
#[cfg(feature = "async")]
pub use rtspmux_frame::MessageCodec;
