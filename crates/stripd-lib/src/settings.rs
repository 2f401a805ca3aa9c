//! Strip settings — flat JSON record with read-modify-write updates.
//!
//! `brightness` and `pixel_count` are read once at startup. The `settings()`
//! wire command rewrites the file, but the running strip keeps its size and
//! brightness until the process is restarted.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Brightness used when the record has no `brightness` key.
pub const DEFAULT_BRIGHTNESS: u8 = 255;

/// Strip length used when the record has no `pixel_count` key.
pub const DEFAULT_PIXEL_COUNT: usize = 60;

/// Longest strip accepted. A WS2812 frame for this many pixels takes about
/// 120 ms on the wire at 800 kHz.
pub const MAX_PIXEL_COUNT: usize = 4096;

/// Value of a `settings(key,value)` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Text(String),
}

impl SettingValue {
    /// Classify a wire token: anything that parses as an integer is one.
    pub fn from_token(token: &str) -> Self {
        match token.parse::<i64>() {
            Ok(n) => SettingValue::Integer(n),
            Err(_) => SettingValue::Text(token.to_string()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            SettingValue::Integer(n) => Value::from(*n),
            SettingValue::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Integer(n) => write!(f, "{n}"),
            SettingValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Settings file failures.
#[derive(Debug)]
pub enum StorageError {
    /// File could not be read or written.
    Io(std::io::Error),
    /// File contents are not valid JSON.
    Json(serde_json::Error),
    /// File is valid JSON but not a flat object.
    NotAnObject,
    /// A known key holds a value outside its allowed range.
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "{e}"),
            StorageError::Json(e) => write!(f, "invalid JSON: {e}"),
            StorageError::NotAnObject => write!(f, "settings file must hold a JSON object"),
            StorageError::InvalidValue { key, reason } => write!(f, "invalid {key}: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Startup-time strip settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub brightness: u8,
    pub pixel_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            brightness: DEFAULT_BRIGHTNESS,
            pixel_count: DEFAULT_PIXEL_COUNT,
        }
    }
}

impl Settings {
    /// Extract typed settings from a raw record. Missing keys take defaults.
    ///
    /// Integers are accepted either as JSON numbers or numeric strings, since
    /// older files stored every value as a string.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, StorageError> {
        let brightness = match record.get("brightness") {
            Some(v) => check_brightness(json_integer(v))?,
            None => DEFAULT_BRIGHTNESS,
        };
        let pixel_count = match record.get("pixel_count") {
            Some(v) => check_pixel_count(json_integer(v))?,
            None => DEFAULT_PIXEL_COUNT,
        };
        Ok(Settings {
            brightness,
            pixel_count,
        })
    }
}

fn json_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_brightness(v: Option<i64>) -> Result<u8, StorageError> {
    v.and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| StorageError::InvalidValue {
            key: "brightness".into(),
            reason: "must be an integer between 0 and 255".into(),
        })
}

fn check_pixel_count(v: Option<i64>) -> Result<usize, StorageError> {
    v.and_then(|n| usize::try_from(n).ok())
        .filter(|n| (1..=MAX_PIXEL_COUNT).contains(n))
        .ok_or_else(|| StorageError::InvalidValue {
            key: "pixel_count".into(),
            reason: format!("must be an integer between 1 and {MAX_PIXEL_COUNT}"),
        })
}

/// Reject values for known keys that would break the next startup.
/// Unknown keys are stored as given.
pub fn validate_setting(key: &str, value: &SettingValue) -> Result<(), StorageError> {
    let as_int = match value {
        SettingValue::Integer(n) => Some(*n),
        SettingValue::Text(_) => None,
    };
    match key {
        "brightness" => check_brightness(as_int).map(|_| ()),
        "pixel_count" => check_pixel_count(as_int).map(|_| ()),
        _ => Ok(()),
    }
}

/// Settings persisted as a flat JSON object on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the whole record. A missing file reads as an empty record.
    pub fn read_record(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("settings file {} not found", self.path.display());
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::NotAnObject),
        }
    }

    /// Read the startup settings.
    pub fn load(&self) -> Result<Settings, StorageError> {
        Settings::from_record(&self.read_record()?)
    }

    /// Look up a single raw value.
    pub fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.read_record()?.remove(key))
    }

    /// Read the record, set `key = value`, write it back.
    ///
    /// Not safe against concurrent writers; the listener serializes all
    /// calls.
    pub fn set(&self, key: &str, value: &SettingValue) -> Result<(), StorageError> {
        validate_setting(key, value)?;
        let mut record = self.read_record()?;
        record.insert(key.to_string(), value.to_json());
        self.write_record(&record)
    }

    /// Write the record atomically (write to temp file, then rename).
    pub fn write_record(&self, record: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let mut contents = serde_json::to_string_pretty(record)?;
        contents.push('\n');
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(&self.path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result.map_err(StorageError::from)
            }
        }
    }
}
