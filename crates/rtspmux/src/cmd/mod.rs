use clap::{Args, Subcommand};
use std::path::PathBuf;

use rtspmux_frame::{DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_SIZE, DEFAULT_READ_CHUNK_SIZE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod demux;
pub mod envinfo;
pub mod stats;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every demultiplexed message of a captured stream.
    Demux(DemuxArgs),
    /// Summarize message counts per kind and channel.
    Stats(StatsArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Demux(args) => demux::run(args, format),
        Command::Stats(args) => stats::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

/// Where to read the stream from and how to split it.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Capture file holding the raw connection bytes (`-` for stdin).
    pub path: PathBuf,
    /// Bytes handed to the demuxer per read.
    #[arg(
        long,
        env = "RTSPMUX_CHUNK_SIZE",
        default_value_t = DEFAULT_READ_CHUNK_SIZE,
        value_parser = parse_chunk_size
    )]
    pub chunk_size: usize,
    /// Maximum control header block size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_HEADER_SIZE)]
    pub max_header_size: usize,
    /// Maximum declared control body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,
    /// Also accept server-to-client requests (ANNOUNCE, SET_PARAMETER, ...).
    #[arg(long)]
    pub accept_server_requests: bool,
}

#[derive(Args, Debug)]
pub struct DemuxArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Only print binary messages from these channels (comma-separated).
    /// Control messages are always printed.
    #[arg(long, value_delimiter = ',')]
    pub channels: Option<Vec<u8>>,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|err| format!("invalid chunk size {value:?}: {err}"))?;
    if size == 0 {
        return Err("chunk size must be at least 1".to_string());
    }
    Ok(size)
}
