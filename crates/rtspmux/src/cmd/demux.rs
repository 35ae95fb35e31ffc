use crate::cmd::DemuxArgs;
use crate::exit::{demux_error, CliResult, SUCCESS};
use crate::input;
use crate::output::{print_message, OutputFormat};

pub fn run(args: DemuxArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = input::open(&args.input)?;
    let mut index = 0usize;
    let mut printed = 0usize;

    while let Some(message) = reader
        .read_message()
        .map_err(|err| demux_error("demux failed", err))?
    {
        index += 1;

        if let (Some(channels), Some(channel)) = (&args.channels, message.channel()) {
            if !channels.contains(&channel) {
                continue;
            }
        }

        print_message(index, &message, format);
        printed += 1;

        if args.count.is_some_and(|limit| printed >= limit) {
            break;
        }
    }

    tracing::info!(
        messages = index,
        printed,
        buffered = reader.demuxer().buffered_len(),
        "demux finished"
    );
    Ok(SUCCESS)
}
