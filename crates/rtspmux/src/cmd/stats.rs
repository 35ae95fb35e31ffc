use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rtspmux_frame::Message;
use serde::Serialize;

use crate::cmd::StatsArgs;
use crate::exit::{demux_error, CliResult, SUCCESS};
use crate::input;
use crate::output::OutputFormat;

#[derive(Debug, Default, Serialize)]
struct StreamStats {
    messages: usize,
    control: usize,
    control_bytes: usize,
    session_descriptions: usize,
    channels: BTreeMap<u8, ChannelStats>,
}

#[derive(Debug, Default, Serialize)]
struct ChannelStats {
    media_packets: usize,
    media_bytes: usize,
    reports: BTreeMap<&'static str, usize>,
}

impl StreamStats {
    fn record(&mut self, message: &Message) {
        self.messages += 1;
        match message {
            Message::Control(raw) => {
                self.control += 1;
                self.control_bytes += raw.len();
            }
            Message::SessionDescription(_) => self.session_descriptions += 1,
            Message::Media { channel, payload } => {
                let stats = self.channels.entry(*channel).or_default();
                stats.media_packets += 1;
                stats.media_bytes += payload.len();
            }
            Message::Report { channel, packet } => {
                let stats = self.channels.entry(*channel).or_default();
                *stats.reports.entry(packet.type_name()).or_default() += 1;
            }
        }
    }
}

pub fn run(args: StatsArgs, format: OutputFormat) -> CliResult<i32> {
    let reader = input::open(&args.input)?;
    let mut stats = StreamStats::default();

    for message in reader {
        let message = message.map_err(|err| demux_error("demux failed", err))?;
        stats.record(&message);
    }

    print_stats(&stats, format);
    Ok(SUCCESS)
}

fn print_stats(stats: &StreamStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(stats).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "MEDIA PACKETS", "MEDIA BYTES", "REPORTS"]);
            table.add_row(vec![
                "control".to_string(),
                "-".to_string(),
                stats.control_bytes.to_string(),
                format!(
                    "{} messages, {} session descriptions",
                    stats.control, stats.session_descriptions
                ),
            ]);
            for (channel, channel_stats) in &stats.channels {
                table.add_row(vec![
                    channel.to_string(),
                    channel_stats.media_packets.to_string(),
                    channel_stats.media_bytes.to_string(),
                    report_counts(channel_stats),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "messages={} control={} session_descriptions={}",
                stats.messages, stats.control, stats.session_descriptions
            );
            for (channel, channel_stats) in &stats.channels {
                println!(
                    "channel={channel} media_packets={} media_bytes={} reports=[{}]",
                    channel_stats.media_packets,
                    channel_stats.media_bytes,
                    report_counts(channel_stats)
                );
            }
        }
        OutputFormat::Raw => println!("{}", stats.messages),
    }
}

fn report_counts(stats: &ChannelStats) -> String {
    stats
        .reports
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rtspmux_frame::{encode_interleaved, Demuxer};

    use super::*;

    #[test]
    fn records_counts_per_channel() {
        let mut wire = BytesMut::new();
        wire.extend_from_slice(b"RTSP/1.0 200 OK\r\nCSeq: 1\r\n\r\n");
        encode_interleaved(0, b"aaaa", &mut wire).unwrap();
        encode_interleaved(0, b"bb", &mut wire).unwrap();
        encode_interleaved(1, &[0x80, 201, 0, 1, 0, 0, 0, 1, 0x80, 201, 0, 1, 0, 0, 0, 2], &mut wire)
            .unwrap();

        let mut stats = StreamStats::default();
        for message in Demuxer::new().feed(wire.freeze()).unwrap() {
            stats.record(&message);
        }

        assert_eq!(stats.messages, 5);
        assert_eq!(stats.control, 1);
        assert_eq!(stats.channels[&0].media_packets, 2);
        assert_eq!(stats.channels[&0].media_bytes, 6);
        assert_eq!(stats.channels[&1].reports["RR"], 2);
        assert_eq!(report_counts(&stats.channels[&1]), "RR=2");

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["channels"]["1"]["reports"]["RR"], 2);
    }
}
