//! CLI subcommands — serve, send, check, config.

mod check;
mod config_cmd;
mod send;
mod serve;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use stripd_lib::command::Command as StripCommand;
pub(super) use stripd_lib::config::Config;
pub(super) use stripd_lib::error::Result;
pub(super) use stripd_lib::settings::Settings;

const PADDING: usize = 2;

/// Default target for `send`: a controller on this host.
fn default_send_target() -> String {
    format!("127.0.0.1:{}", stripd_lib::listener::DEFAULT_PORT)
}

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Print any serializable output as pretty JSON.
pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}

/// Load the daemon config from `custom_path`, or the platform default.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub daemon: Config,
    pub settings_file: String,
    pub settings_file_exists: bool,
    pub settings: Option<Settings>,
    pub settings_error: Option<String>,
}

#[derive(Serialize)]
pub(super) struct CheckOutput {
    pub valid: bool,
    pub canonical: Option<String>,
    pub parsed: Option<StripCommand>,
    pub error: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Listen for UDP commands and drive the strip
    Serve {
        /// Override the bind address from the config (e.g. 0.0.0.0:8089)
        #[arg(long)]
        bind: Option<String>,
        /// Override the settings file path from the config
        #[arg(long)]
        settings: Option<String>,
    },

    /// Send one command datagram to a running controller
    Send {
        /// Command text, e.g. "pixel(2,0xFFFFFF)"
        command: String,
        /// Controller address
        #[arg(long, default_value_t = default_send_target())]
        to: String,
        /// Send the text as-is, without validating it first
        #[arg(long)]
        no_check: bool,
    },

    /// Parse a command locally and print its canonical form
    Check {
        /// Command text, e.g. "stroke(2,6,0xFFFFFF)"
        command: String,
    },

    /// Show daemon configuration and strip settings
    Config {
        /// Write a config file with the default values instead, if none exists
        #[arg(long)]
        init: bool,
    },
}

impl Command {
    /// Whether the subcommand runs as a long-lived daemon.
    pub fn is_daemon(&self) -> bool {
        matches!(self, Command::Serve { .. })
    }
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Serve { bind, settings } => {
            if json {
                warn_json_unsupported("serve");
            }
            let mut config = load_config(config_path);
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(settings) = settings {
                config.settings_path = settings;
            }
            serve::cmd_serve(&config)
        }
        Command::Send {
            command,
            to,
            no_check,
        } => {
            if json {
                warn_json_unsupported("send");
            }
            send::cmd_send(&command, &to, no_check)
        }
        Command::Check { command } => check::cmd_check(&command, json),
        Command::Config { init: true } => {
            if json {
                warn_json_unsupported("config --init");
            }
            config_cmd::cmd_config_init(config_path)
        }
        Command::Config { init: false } => config_cmd::cmd_config(json, config_path),
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        let w = kv_width(&["A:"], &["Very long indent key:"]);
        // "Very long indent key:" = 21 + PADDING + 2 = 25
        assert_eq!(w, 25);
    }

    #[test]
    fn values_align_across_levels() {
        let w = kv_width(&["Top:"], &["Indent:"]);
        let top = format_kv("Top:", "V", w);
        let indent = format!("  {:<width$}{}", "Indent:", "V", width = w - 2);
        assert_eq!(top.find('V'), indent.find('V'));
    }

    #[test]
    fn format_kv_exact_width() {
        // "pixel_count:" is 12 chars — exceeds width, no padding added
        assert_eq!(format_kv("pixel_count:", 60, 10), "pixel_count:60");
    }

    #[test]
    fn kv_width_empty_both() {
        assert_eq!(kv_width(&[], &[]), 0);
    }
}
