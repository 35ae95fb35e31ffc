//! Body and report decoders for interleaved RTSP streams.
//!
//! The demultiplexer in `rtspmux-frame` only finds message boundaries. The
//! two conversions it delegates live here:
//!
//! - [`parse_session_description`] turns a control-message body into a
//!   [`SessionDescription`]
//! - [`parse_report_packet`] turns one report sub-packet from an odd
//!   channel into a [`ReportPacket`]
//!
//! Both are pure functions over byte slices; neither keeps state between
//! calls.

pub mod error;
pub mod rtcp;
pub mod sdp;

pub use error::{PayloadError, Result};
pub use rtcp::{
    parse_report_packet, packet_type_name, ReportBlock, ReportBody, ReportHeader, ReportPacket,
    SenderInfo, REPORT_HEADER_SIZE,
};
pub use sdp::{parse_session_description, Attribute, MediaDescription, Origin, SessionDescription};
