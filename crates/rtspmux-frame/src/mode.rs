//! Sub-protocol detection from the leading bytes of the backlog.

use std::iter;

use crate::accumulator::Accumulator;
use crate::error::{DemuxError, Result};
use crate::interleaved::SENTINEL;

/// Status lines of control responses start with this signature.
pub const CONTROL_SIGNATURE: &[u8; 4] = b"RTSP";

/// Request lines a server may send to its client on the same connection.
pub const SERVER_REQUEST_METHODS: &[&[u8]] = &[
    b"ANNOUNCE ",
    b"GET_PARAMETER ",
    b"OPTIONS ",
    b"REDIRECT ",
    b"SET_PARAMETER ",
];

/// Bytes needed to tell any signature apart from a prefix of one.
const LONGEST_SIGNATURE: usize = longest_signature();

const fn longest_signature() -> usize {
    let mut longest = CONTROL_SIGNATURE.len();
    let mut i = 0;
    while i < SERVER_REQUEST_METHODS.len() {
        if SERVER_REQUEST_METHODS[i].len() > longest {
            longest = SERVER_REQUEST_METHODS[i].len();
        }
        i += 1;
    }
    longest
}

/// Which extractor applies to the front of the backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No data yet, or not enough to classify.
    Idle,
    /// An interleaved binary frame (`$` sentinel).
    Binary,
    /// A textual control message.
    Control,
}

/// Classify the backlog.
///
/// A backlog shorter than a signature that is still a prefix of one stays
/// `Idle` until more bytes arrive. Anything else that matches no signature
/// fails with [`DemuxError::UnrecognizedFraming`].
pub fn detect(backlog: &Accumulator, accept_server_requests: bool) -> Result<Mode> {
    let Some(first) = backlog.first_byte() else {
        return Ok(Mode::Idle);
    };
    if first == SENTINEL {
        return Ok(Mode::Binary);
    }

    let server_requests: &[&[u8]] = if accept_server_requests {
        SERVER_REQUEST_METHODS
    } else {
        &[]
    };
    let prefix = backlog.peek_prefix(if accept_server_requests {
        LONGEST_SIGNATURE
    } else {
        CONTROL_SIGNATURE.len()
    });

    let mut waiting = false;
    let signatures = iter::once(&CONTROL_SIGNATURE[..]).chain(server_requests.iter().copied());
    for signature in signatures {
        if prefix.starts_with(signature) {
            return Ok(Mode::Control);
        }
        if signature.starts_with(&prefix) {
            waiting = true;
        }
    }

    if waiting {
        return Ok(Mode::Idle);
    }

    tracing::warn!(prefix = ?prefix, "unrecognized framing");
    Err(DemuxError::UnrecognizedFraming { prefix })
}
