//! Unified error type for the stripd-lib crate.
//!
//! [`StripdError`] wraps module-specific errors (`ParseError`, `BoundsError`,
//! `StorageError`, `DriverError`) plus plain I/O and configuration failures.
//! `From` impls allow `?` to propagate across module boundaries seamlessly.

use std::fmt;

use crate::command::ParseError;
use crate::driver::DriverError;
use crate::pixels::BoundsError;
use crate::settings::StorageError;

/// Unified error type for stripd-lib operations.
#[derive(Debug)]
pub enum StripdError {
    /// Datagram text could not be turned into a command.
    Parse(ParseError),
    /// Index or range outside the pixel buffer.
    Bounds(BoundsError),
    /// Settings file unreadable, unwritable or rejected.
    Storage(StorageError),
    /// The LED driver failed to push a frame.
    Driver(DriverError),
    /// Socket or other standard I/O error.
    Io(std::io::Error),
    /// Daemon configuration error.
    Config(String),
}

impl fmt::Display for StripdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripdError::Parse(e) => write!(f, "Parse error: {e}"),
            StripdError::Bounds(e) => write!(f, "Bounds error: {e}"),
            StripdError::Storage(e) => write!(f, "Storage error: {e}"),
            StripdError::Driver(e) => write!(f, "Driver error: {e}"),
            StripdError::Io(e) => write!(f, "I/O error: {e}"),
            StripdError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for StripdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StripdError::Parse(e) => Some(e),
            StripdError::Bounds(e) => Some(e),
            StripdError::Storage(e) => Some(e),
            StripdError::Driver(e) => Some(e),
            StripdError::Io(e) => Some(e),
            StripdError::Config(_) => None,
        }
    }
}

impl From<ParseError> for StripdError {
    fn from(e: ParseError) -> Self {
        StripdError::Parse(e)
    }
}

impl From<BoundsError> for StripdError {
    fn from(e: BoundsError) -> Self {
        StripdError::Bounds(e)
    }
}

impl From<StorageError> for StripdError {
    fn from(e: StorageError) -> Self {
        StripdError::Storage(e)
    }
}

impl From<DriverError> for StripdError {
    fn from(e: DriverError) -> Self {
        StripdError::Driver(e)
    }
}

impl From<std::io::Error> for StripdError {
    fn from(e: std::io::Error) -> Self {
        StripdError::Io(e)
    }
}

/// Crate-level Result alias using [`StripdError`].
pub type Result<T> = std::result::Result<T, StripdError>;
