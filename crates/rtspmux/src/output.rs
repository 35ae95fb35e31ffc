use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rtspmux_frame::Message;
use rtspmux_payload::ReportBody;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput {
    index: usize,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
}

pub fn print_message(index: usize, message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                index,
                kind: message.kind(),
                channel: message.channel(),
                size: message_size(message),
                summary: summarize(message),
                detail: detail(message),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "KIND", "CHANNEL", "SIZE", "SUMMARY"])
                .add_row(vec![
                    index.to_string(),
                    message.kind().to_string(),
                    optional(message.channel()),
                    optional(message_size(message)),
                    summarize(message),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{index} {} channel={} size={} {}",
                message.kind(),
                optional(message.channel()),
                optional(message_size(message)),
                summarize(message)
            );
        }
        OutputFormat::Raw => match message {
            Message::Control(raw) => print_raw(raw),
            Message::Media { payload, .. } => print_raw(payload),
            Message::SessionDescription(_) | Message::Report { .. } => {}
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// One-line description of a message.
pub fn summarize(message: &Message) -> String {
    match message {
        Message::Control(raw) => {
            let first_line = raw.split(|&b| b == b'\n').next().unwrap_or_default();
            String::from_utf8_lossy(first_line).trim_end().to_string()
        }
        Message::SessionDescription(sdp) if sdp.version.is_none() && sdp.media.is_empty() => {
            format!("<body, {} unparsed lines>", sdp.unparsed.len())
        }
        Message::SessionDescription(sdp) => {
            let media: Vec<&str> = sdp.media.iter().map(|m| m.media.as_str()).collect();
            format!(
                "{} ({} media: {})",
                sdp.session_name.as_deref().unwrap_or("-"),
                media.len(),
                media.join(", ")
            )
        }
        Message::Media { payload, .. } => format!("<binary {} bytes>", payload.len()),
        Message::Report { packet, .. } => match &packet.body {
            ReportBody::SenderReport { ssrc, blocks, .. }
            | ReportBody::ReceiverReport { ssrc, blocks } => {
                format!("{} ssrc={ssrc:#010x} blocks={}", packet.type_name(), blocks.len())
            }
            ReportBody::Goodbye { sources, .. } => {
                format!("{} sources={}", packet.type_name(), sources.len())
            }
            ReportBody::Other { payload } => {
                format!("{} <{} bytes>", packet.type_name(), payload.len())
            }
        },
    }
}

fn message_size(message: &Message) -> Option<usize> {
    match message {
        Message::Control(raw) => Some(raw.len()),
        Message::Media { payload, .. } => Some(payload.len()),
        Message::Report { packet, .. } => Some(packet.header.packet_size()),
        Message::SessionDescription(_) => None,
    }
}

fn detail(message: &Message) -> Option<serde_json::Value> {
    match message {
        Message::SessionDescription(sdp) => serde_json::to_value(sdp).ok(),
        Message::Report { packet, .. } => serde_json::to_value(packet).ok(),
        Message::Control(_) | Message::Media { .. } => None,
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
