use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use rtspmux_frame::{DemuxConfig, MessageReader, ReaderConfig};

use crate::cmd::InputArgs;
use crate::exit::{io_error, CliResult};

/// Open the capture named by `args` (`-` is stdin) as a message reader.
pub fn open(args: &InputArgs) -> CliResult<MessageReader<Box<dyn Read>>> {
    let source: Box<dyn Read> = if args.path == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&args.path)
            .map_err(|err| io_error(&format!("cannot open {}", args.path.display()), err))?;
        Box::new(file)
    };

    tracing::debug!(
        path = %args.path.display(),
        chunk_size = args.chunk_size,
        "opened capture"
    );
    Ok(MessageReader::with_config(source, reader_config(args)))
}

pub fn reader_config(args: &InputArgs) -> ReaderConfig {
    ReaderConfig {
        read_chunk_size: args.chunk_size,
        demux: DemuxConfig {
            max_header_size: args.max_header_size,
            max_body_size: args.max_body_size,
            accept_server_requests: args.accept_server_requests,
        },
    }
}
