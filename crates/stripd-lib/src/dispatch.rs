//! Command dispatch — applies parsed commands to the strip and settings.
//!
//! [`Dispatcher::handle`] is the error boundary for one datagram: every
//! failure (parse, bounds, storage, driver) is logged with the raw input,
//! flashed red on slot 0, and swallowed. Senders never get a reply.

use std::time::Instant;

use crate::command::{self, Command};
use crate::driver::LedDriver;
use crate::error::Result;
use crate::pixels::PixelBuffer;
use crate::settings::ConfigStore;
use crate::signal::{StatusFlasher, StatusSignal};

/// Result of handling one datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command applied.
    Applied,
    /// Command rejected; the error flash has been shown.
    Rejected,
    /// `restart()` received; the caller should exit with code 0.
    Restart,
}

/// Owns the strip, the settings store and the status flasher.
pub struct Dispatcher<D: LedDriver> {
    buffer: PixelBuffer<D>,
    store: ConfigStore,
    flasher: StatusFlasher,
}

impl<D: LedDriver> Dispatcher<D> {
    pub fn new(buffer: PixelBuffer<D>, store: ConfigStore, flasher: StatusFlasher) -> Self {
        Dispatcher {
            buffer,
            store,
            flasher,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer<D> {
        &self.buffer
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn flasher(&self) -> &StatusFlasher {
        &self.flasher
    }

    /// Apply a command. Each strip command ends with exactly one push.
    pub fn apply(&mut self, command: &Command) -> Result<Outcome> {
        match command {
            Command::Pixel { index, color } => {
                self.buffer.set(*index, *color)?;
                self.buffer.push()?;
            }
            Command::Stroke { from, to, color } => {
                self.buffer.set_range(*from, *to, *color)?;
                self.buffer.push()?;
            }
            Command::Clear => {
                self.buffer.clear();
                self.buffer.push()?;
            }
            Command::Fill { color } => {
                self.buffer.fill(*color);
                self.buffer.push()?;
            }
            Command::SetSetting { key, value } => {
                self.store.set(key, value)?;
                log::info!(
                    "[settings] {key} = {value} written to {} (applies after restart)",
                    self.store.path().display()
                );
            }
            Command::Restart => {
                log::info!("[dispatch] restart requested");
                return Ok(Outcome::Restart);
            }
        }
        Ok(Outcome::Applied)
    }

    /// Parse and apply a raw payload without any error handling.
    pub fn process(&mut self, payload: &[u8]) -> Result<Outcome> {
        let command = command::parse(payload)?;
        log::debug!("[dispatch] {command}");
        self.apply(&command)
    }

    /// Handle one datagram: process it, and on failure log and flash red.
    pub fn handle(&mut self, payload: &[u8], now: Instant) -> Outcome {
        match self.process(payload) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!(
                    "[dispatch] rejected {:?}: {e}",
                    String::from_utf8_lossy(payload)
                );
                self.reject(now)
            }
        }
    }

    /// Flash the error signal for input that could not be used.
    pub fn reject(&mut self, now: Instant) -> Outcome {
        self.signal(StatusSignal::Error, now);
        Outcome::Rejected
    }

    /// Show the ready flash.
    pub fn ready(&mut self, now: Instant) {
        self.signal(StatusSignal::Ready, now);
    }

    /// Run status restores that are due.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.flasher.run_due(&mut self.buffer, now)
    }

    /// Earliest pending status restore.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.flasher.next_deadline()
    }

    /// Turn the strip off before exiting.
    pub fn shutdown(&mut self) {
        self.buffer.clear();
        if let Err(e) = self.buffer.push() {
            log::warn!("[dispatch] could not blank strip on shutdown: {e}");
        }
    }

    fn signal(&mut self, signal: StatusSignal, now: Instant) {
        if let Err(e) = self.flasher.flash(&mut self.buffer, signal, now) {
            log::warn!("[signal] {signal:?} flash push failed: {e}");
        }
    }
}
