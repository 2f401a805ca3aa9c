//! LED driver boundary — allocate a strip, push frames to hardware.
//!
//! [`LedDriver`] is the only seam between the pixel buffer and the physical
//! strip. [`allocate`] picks an implementation from the daemon config:
//! [`FrameDriver`] streams encoded frames to a device node, [`LogDriver`]
//! only logs them.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color;

#[derive(Debug)]
pub enum DriverError {
    /// Opening or writing the output failed.
    Io(std::io::Error),
    /// Frame length differs from the allocated strip length.
    FrameSize { expected: usize, got: usize },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Io(e) => write!(f, "LED output failed: {e}"),
            DriverError::FrameSize { expected, got } => {
                write!(f, "frame has {got} pixels, strip has {expected}")
            }
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Io(e) => Some(e),
            DriverError::FrameSize { .. } => None,
        }
    }
}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        DriverError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

/// Byte order the strip chips expect on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StripType {
    /// WS2812 / WS2812B — green, red, blue.
    #[default]
    #[serde(rename = "WS2812")]
    Ws2812,
    /// WS2811 — red, green, blue.
    #[serde(rename = "WS2811")]
    Ws2811,
}

/// Protocol parameters for the strip. Only `strip_type` and `invert`
/// affect frame encoding; the rest describe the wiring for whatever
/// consumes the frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    pub gpio: u8,
    pub dma: u8,
    pub frequency: u32,
    pub invert: bool,
    pub strip_type: StripType,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        ProtocolParams {
            gpio: 18,
            dma: 10,
            frequency: 800_000,
            invert: false,
            strip_type: StripType::Ws2812,
        }
    }
}

/// Everything needed to allocate a strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub pixel_count: usize,
    pub brightness: u8,
    pub protocol: ProtocolParams,
}

pub trait LedDriver {
    /// Transmit one full frame (one `0xRRGGBB` value per slot).
    fn push(&self, frame: &[u32]) -> Result<()>;
}

impl<T: LedDriver + ?Sized> LedDriver for Box<T> {
    fn push(&self, frame: &[u32]) -> Result<()> {
        (**self).push(frame)
    }
}

/// Encode a frame as chip-order bytes, 3 per pixel, scaled by brightness.
pub fn encode_frame(frame: &[u32], brightness: u8, protocol: &ProtocolParams) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frame.len() * 3);
    for &pixel in frame {
        let (r, g, b) = color::channels(pixel);
        let (r, g, b) = (
            color::scale_channel(r, brightness),
            color::scale_channel(g, brightness),
            color::scale_channel(b, brightness),
        );
        let ordered = match protocol.strip_type {
            StripType::Ws2812 => [g, r, b],
            StripType::Ws2811 => [r, g, b],
        };
        if protocol.invert {
            bytes.extend(ordered.iter().map(|v| !v));
        } else {
            bytes.extend_from_slice(&ordered);
        }
    }
    bytes
}

fn check_len(frame: &[u32], expected: usize) -> Result<()> {
    if frame.len() != expected {
        return Err(DriverError::FrameSize {
            expected,
            got: frame.len(),
        });
    }
    Ok(())
}

/// Writes each encoded frame to a device node or FIFO, one write per push.
///
/// A regular file (or a path that does not exist yet) holds only the latest
/// frame: it is truncated on open and each push overwrites it from the start.
#[derive(Debug)]
pub struct FrameDriver {
    output: File,
    path: PathBuf,
    options: DriverOptions,
    rewind: bool,
}

impl FrameDriver {
    pub fn open(path: &Path, options: DriverOptions) -> Result<Self> {
        let rewind = match std::fs::metadata(path) {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        let output = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(rewind)
            .open(path)?;
        Ok(FrameDriver {
            output,
            path: path.to_path_buf(),
            options,
            rewind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedDriver for FrameDriver {
    fn push(&self, frame: &[u32]) -> Result<()> {
        check_len(frame, self.options.pixel_count)?;
        let bytes = encode_frame(frame, self.options.brightness, &self.options.protocol);
        // `&File` implements `Write`, so pushes need no interior mutability.
        let mut out = &self.output;
        if self.rewind {
            out.seek(SeekFrom::Start(0))?;
        }
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }
}

/// Dry-run driver: logs frames at debug level.
#[derive(Debug)]
pub struct LogDriver {
    options: DriverOptions,
}

impl LogDriver {
    pub fn new(options: DriverOptions) -> Self {
        LogDriver { options }
    }
}

impl LedDriver for LogDriver {
    fn push(&self, frame: &[u32]) -> Result<()> {
        check_len(frame, self.options.pixel_count)?;
        if log::log_enabled!(log::Level::Debug) {
            let lit = frame.iter().filter(|&&c| c != color::OFF).count();
            let head: Vec<String> = frame.iter().take(8).map(|&c| color::format_color(c)).collect();
            log::debug!(
                "[driver] push {} pixels ({lit} lit): {}{}",
                frame.len(),
                head.join(" "),
                if frame.len() > 8 { " ..." } else { "" }
            );
        }
        Ok(())
    }
}

/// Allocate the strip driver: a [`FrameDriver`] on `output` if given,
/// otherwise a [`LogDriver`].
pub fn allocate(options: DriverOptions, output: Option<&Path>) -> Result<Box<dyn LedDriver>> {
    log::info!(
        "[driver] {} pixels, brightness {}, {:?} on GPIO {} (DMA {}, {} Hz)",
        options.pixel_count,
        options.brightness,
        options.protocol.strip_type,
        options.protocol.gpio,
        options.protocol.dma,
        options.protocol.frequency
    );
    match output {
        Some(path) => {
            let driver = FrameDriver::open(path, options)?;
            log::info!("[driver] writing frames to {}", driver.path().display());
            Ok(Box::new(driver))
        }
        None => {
            log::info!("[driver] no output configured, frames are only logged");
            Ok(Box::new(LogDriver::new(options)))
        }
    }
}

// ── Mock driver for testing ──

/// In-memory mock driver for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Records every pushed frame.
    #[derive(Default)]
    pub struct MockDriver {
        /// Every frame pushed, oldest first.
        pub pushes: RefCell<Vec<Vec<u32>>>,
        /// If true, `push` returns an error.
        pub fail_push: Cell<bool>,
    }

    impl MockDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_count(&self) -> usize {
            self.pushes.borrow().len()
        }

        pub fn last_frame(&self) -> Option<Vec<u32>> {
            self.pushes.borrow().last().cloned()
        }
    }

    impl LedDriver for MockDriver {
        fn push(&self, frame: &[u32]) -> Result<()> {
            if self.fail_push.get() {
                return Err(DriverError::Io(std::io::Error::other(
                    "mock: push failure injected",
                )));
            }
            self.pushes.borrow_mut().push(frame.to_vec());
            Ok(())
        }
    }
}
