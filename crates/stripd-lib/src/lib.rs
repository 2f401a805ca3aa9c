//! stripd — UDP text-command controller for addressable LED strips.

pub mod color;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod listener;
pub mod pixels;
pub mod settings;
pub mod signal;

pub use error::StripdError;
