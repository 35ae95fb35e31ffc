//! Textual control messages and their optional bodies.
//!
//! Only two things are read from a control message: where its header block
//! ends and the declared `Content-Length`. A message without that header,
//! or with a value of zero, has no body. A body is handed to the session
//! description parser and emitted as a second message.

use rtspmux_payload::parse_session_description;

use crate::accumulator::Accumulator;
use crate::config::DemuxConfig;
use crate::demuxer::Extraction;
use crate::error::{DemuxError, Result};
use crate::message::Message;

const CONTENT_LENGTH: &[u8] = b"content-length";

/// Offset just past the first blank line, accepting `\n\n` and `\n\r\n`.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    for (i, &byte) in buf.iter().enumerate() {
        if byte != b'\n' {
            continue;
        }
        match buf.get(i + 1) {
            Some(b'\n') => return Some(i + 2),
            Some(b'\r') if buf.get(i + 2) == Some(&b'\n') => return Some(i + 3),
            _ => {}
        }
    }
    None
}

/// Value of the first `Content-Length` header in a header block.
///
/// The first line is the status or request line and is never a header.
pub fn content_length(header: &[u8]) -> Result<Option<usize>> {
    for line in header.split(|&b| b == b'\n').skip(1) {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        if !line[..colon].trim_ascii().eq_ignore_ascii_case(CONTENT_LENGTH) {
            continue;
        }

        let value = line[colon + 1..].trim_ascii();
        if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
            return Err(invalid_length(value));
        }
        return std::str::from_utf8(value)
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Some)
            .ok_or_else(|| invalid_length(value));
    }
    Ok(None)
}

fn invalid_length(value: &[u8]) -> DemuxError {
    DemuxError::InvalidContentLength(String::from_utf8_lossy(value).into_owned())
}

/// Pull one control message off the front of the backlog.
pub(crate) fn extract(backlog: &mut Accumulator, config: &DemuxConfig) -> Result<Extraction> {
    let buf = backlog.materialize();

    let Some(header_end) = find_header_end(&buf) else {
        if buf.len() > config.max_header_size {
            return Err(DemuxError::HeaderTooLarge {
                size: buf.len(),
                max: config.max_header_size,
            });
        }
        return Ok(Extraction::Incomplete);
    };
    if header_end > config.max_header_size {
        return Err(DemuxError::HeaderTooLarge {
            size: header_end,
            max: config.max_header_size,
        });
    }

    let body_len = match content_length(&buf[..header_end])? {
        None | Some(0) => {
            let header = buf.slice(..header_end);
            backlog.reset(buf.slice(header_end..));
            tracing::trace!(size = header.len(), "control message extracted");
            return Ok(Extraction::Consumed(vec![Message::Control(header)]));
        }
        Some(len) => len,
    };

    if body_len > config.max_body_size {
        return Err(DemuxError::BodyTooLarge {
            size: body_len,
            max: config.max_body_size,
        });
    }
    if buf.len() - header_end < body_len {
        return Ok(Extraction::Incomplete);
    }

    let end = header_end + body_len;
    let description = parse_session_description(&buf[header_end..end])?;
    let message = buf.slice(..end);
    backlog.reset(buf.slice(end..));

    tracing::trace!(
        size = message.len(),
        body = body_len,
        "control message with body extracted"
    );

    Ok(Extraction::Consumed(vec![
        Message::Control(message),
        Message::SessionDescription(description),
    ]))
}
