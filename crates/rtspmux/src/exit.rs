use std::fmt;
use std::io;

use rtspmux_frame::DemuxError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const NOT_FOUND: i32 = 51;
pub const DATA_INVALID: i32 = 60;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn demux_error(context: &str, err: DemuxError) -> CliError {
    match err {
        DemuxError::Io(source) => io_error(context, source),
        DemuxError::ConnectionClosed { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        DemuxError::Poisoned => CliError::new(INTERNAL, format!("{context}: {err}")),
        DemuxError::UnrecognizedFraming { .. }
        | DemuxError::MalformedCompoundPacket { .. }
        | DemuxError::InvalidContentLength(_)
        | DemuxError::HeaderTooLarge { .. }
        | DemuxError::BodyTooLarge { .. }
        | DemuxError::PayloadTooLarge { .. }
        | DemuxError::Payload(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}
