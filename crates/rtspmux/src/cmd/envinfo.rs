use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rtspmux_frame::{DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_SIZE, DEFAULT_READ_CHUNK_SIZE};
use serde::Serialize;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

const ENV_VARS: &[&str] = &["RTSPMUX_CHUNK_SIZE", "RTSPMUX_LOG_LEVEL", "RUST_LOG"];

#[derive(Serialize)]
struct BuildInfo {
    version: &'static str,
    target: String,
    git_hash: &'static str,
    os: &'static str,
    arch: &'static str,
    features: Vec<&'static str>,
}

/// Limits a capture is demultiplexed with unless overridden by flags.
#[derive(Serialize)]
struct DemuxDefaults {
    chunk_size: usize,
    max_header_size: usize,
    max_body_size: usize,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    build: BuildInfo,
    defaults: DemuxDefaults,
    environment: BTreeMap<&'static str, Option<String>>,
}

impl EnvInfoOutput {
    fn collect() -> Self {
        Self {
            build: BuildInfo {
                version: env!("CARGO_PKG_VERSION"),
                target: target_triple(),
                git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
                os: std::env::consts::OS,
                arch: std::env::consts::ARCH,
                features: active_features(),
            },
            defaults: DemuxDefaults {
                chunk_size: DEFAULT_READ_CHUNK_SIZE,
                max_header_size: DEFAULT_MAX_HEADER_SIZE,
                max_body_size: DEFAULT_MAX_BODY_SIZE,
            },
            environment: ENV_VARS
                .iter()
                .map(|&name| (name, std::env::var(name).ok()))
                .collect(),
        }
    }

    /// Flattened `(key, value)` pairs shared by the text formats.
    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("version".to_string(), self.build.version.to_string()),
            ("target".to_string(), self.build.target.clone()),
            ("git_hash".to_string(), self.build.git_hash.to_string()),
            (
                "platform".to_string(),
                format!("{} ({})", self.build.os, self.build.arch),
            ),
            ("features".to_string(), self.build.features.join(", ")),
            (
                "chunk_size".to_string(),
                self.defaults.chunk_size.to_string(),
            ),
            (
                "max_header_size".to_string(),
                self.defaults.max_header_size.to_string(),
            ),
            (
                "max_body_size".to_string(),
                self.defaults.max_body_size.to_string(),
            ),
        ];
        rows.extend(self.environment.iter().map(|(name, value)| {
            (
                name.to_string(),
                value.clone().unwrap_or_else(|| "(not set)".to_string()),
            )
        }));
        rows
    }
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let output = EnvInfoOutput::collect();

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KEY", "VALUE"]);
            for (key, value) in output.rows() {
                table.add_row(vec![key, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (key, value) in output.rows() {
                println!("{key:<20} {value}");
            }
        }
        OutputFormat::Raw => println!("{}", output.build.version),
    }

    Ok(SUCCESS)
}

fn target_triple() -> String {
    option_env!("RTSPMUX_BUILD_TARGET")
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "{}-unknown-{}",
                std::env::consts::ARCH,
                std::env::consts::OS
            )
        })
}

fn active_features() -> Vec<&'static str> {
    let mut features = vec!["cli"];
    if cfg!(feature = "async") {
        features.push("async");
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_nests_build_and_defaults() {
        let json = serde_json::to_value(EnvInfoOutput::collect())
            .expect("envinfo output should serialize");
        assert_eq!(json["build"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["build"]["features"][0], "cli");
        assert_eq!(json["defaults"]["max_body_size"], DEFAULT_MAX_BODY_SIZE);
        assert!(json["environment"]
            .as_object()
            .expect("environment should be an object")
            .contains_key("RTSPMUX_CHUNK_SIZE"));
    }

    #[test]
    fn rows_cover_every_environment_variable() {
        let rows = EnvInfoOutput::collect().rows();
        for name in ENV_VARS {
            assert!(rows.iter().any(|(key, _)| key == name), "missing {name}");
        }
        assert_eq!(rows[0].0, "version");
    }

    #[test]
    fn target_looks_like_triple() {
        assert!(target_triple().split('-').count() >= 3);
    }
}
