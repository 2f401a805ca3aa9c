//! Daemon configuration — TOML-based, platform-aware paths.
//!
//! This is deployment configuration (where to listen, where the settings
//! file lives, how frames leave the process). Strip settings that users
//! edit over the wire live in [`crate::settings`].

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::ProtocolParams;
use crate::listener::DEFAULT_PORT;
use crate::settings::ConfigStore;
use crate::signal::FlashDurations;

/// Header comment prepended to config files written by `stripd config --init`.
const CONFIG_HEADER: &str = "# stripd daemon configuration. Every key is optional; \
     missing keys take the values shown here.\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// UDP address to listen on. Default: "0.0.0.0:8089".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path to the JSON settings file (brightness, pixel_count). Relative
    /// paths resolve against the working directory.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    /// Device node or FIFO that receives encoded frames. Empty = log only.
    #[serde(default)]
    pub output: String,

    /// How long the ready flash stays lit, in milliseconds.
    #[serde(default = "default_ready_flash_ms")]
    pub ready_flash_ms: u64,

    /// How long the error flash stays lit, in milliseconds.
    #[serde(default = "default_error_flash_ms")]
    pub error_flash_ms: u64,

    /// Strip wiring and chip protocol.
    #[serde(default)]
    pub driver: ProtocolParams,
}

fn default_bind() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}
fn default_settings_path() -> String {
    "settings.json".into()
}
fn default_ready_flash_ms() -> u64 {
    2000
}
fn default_error_flash_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: default_bind(),
            settings_path: default_settings_path(),
            output: String::new(),
            ready_flash_ms: default_ready_flash_ms(),
            error_flash_ms: default_error_flash_ms(),
            driver: ProtocolParams::default(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `bind` does not resolve to a socket address.
    InvalidBind(String),
    /// `settings_path` is empty.
    EmptySettingsPath,
    /// A flash duration is zero (`field` is `"ready_flash_ms"` or `"error_flash_ms"`).
    ZeroFlashDuration { field: &'static str },
    /// `driver.frequency` is zero.
    ZeroFrequency,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBind(e) => write!(f, "Invalid bind address: {e}"),
            ValidationError::EmptySettingsPath => write!(f, "settings_path cannot be empty"),
            ValidationError::ZeroFlashDuration { field } => {
                write!(f, "{field} must be greater than zero")
            }
            ValidationError::ZeroFrequency => write!(f, "driver.frequency must be greater than zero"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stripd"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Resolve `bind` to the first matching socket address.
    pub fn bind_addr(&self) -> crate::error::Result<SocketAddr> {
        self.bind
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| crate::StripdError::Config(format!("cannot resolve \"{}\"", self.bind)))
    }

    /// Settings store for `settings_path`.
    pub fn settings_store(&self) -> ConfigStore {
        ConfigStore::new(&self.settings_path)
    }

    /// Frame output path, if one is configured.
    pub fn output_path(&self) -> Option<PathBuf> {
        let output = self.output.trim();
        (!output.is_empty()).then(|| PathBuf::from(output))
    }

    pub fn flash_durations(&self) -> FlashDurations {
        FlashDurations {
            ready: Duration::from_millis(self.ready_flash_ms),
            error: Duration::from_millis(self.error_flash_ms),
        }
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.bind_addr() {
            errors.push(ValidationError::InvalidBind(e.to_string()));
        }
        if self.settings_path.trim().is_empty() {
            errors.push(ValidationError::EmptySettingsPath);
        }
        if self.ready_flash_ms == 0 {
            errors.push(ValidationError::ZeroFlashDuration {
                field: "ready_flash_ms",
            });
        }
        if self.error_flash_ms == 0 {
            errors.push(ValidationError::ZeroFlashDuration {
                field: "error_flash_ms",
            });
        }
        if self.driver.frequency == 0 {
            errors.push(ValidationError::ZeroFrequency);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
