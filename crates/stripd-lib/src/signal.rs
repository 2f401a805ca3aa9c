//! Status flashes on slot 0 — green when ready, red on a rejected command.
//!
//! A flash writes slot 0, pushes immediately and schedules a one-shot
//! restore. Restores are plain deadlines; the listener loop runs them via
//! [`StatusFlasher::run_due`] between datagrams, so nothing here blocks or
//! spawns threads.
//!
//! Flashes neither queue nor cancel each other. Every flash gets its own
//! restore, so the earliest pending restore turns slot 0 off even if a
//! later flash is still meant to be visible.

use std::time::{Duration, Instant};

use crate::color;
use crate::driver::{self, LedDriver};
use crate::pixels::PixelBuffer;

/// Slot used for status flashes.
pub const STATUS_SLOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSignal {
    /// Socket bound, accepting commands.
    Ready,
    /// A datagram was rejected.
    Error,
}

impl StatusSignal {
    pub fn color(self) -> u32 {
        match self {
            StatusSignal::Ready => color::GREEN,
            StatusSignal::Error => color::RED,
        }
    }
}

/// How long each flash stays lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashDurations {
    pub ready: Duration,
    pub error: Duration,
}

impl Default for FlashDurations {
    fn default() -> Self {
        FlashDurations {
            ready: Duration::from_millis(2000),
            error: Duration::from_millis(1000),
        }
    }
}

impl FlashDurations {
    pub fn for_signal(&self, signal: StatusSignal) -> Duration {
        match signal {
            StatusSignal::Ready => self.ready,
            StatusSignal::Error => self.error,
        }
    }
}

/// Pending slot-0 restores, soonest first.
#[derive(Debug, Default)]
pub struct StatusFlasher {
    durations: FlashDurations,
    restores: Vec<Instant>,
}

impl StatusFlasher {
    pub fn new(durations: FlashDurations) -> Self {
        StatusFlasher {
            durations,
            restores: Vec::new(),
        }
    }

    pub fn durations(&self) -> FlashDurations {
        self.durations
    }

    /// Light slot 0, push, and schedule the restore at `now + duration`.
    ///
    /// The restore is scheduled even if the push fails, so slot 0 does not
    /// stay lit in memory.
    pub fn flash<D: LedDriver>(
        &mut self,
        buffer: &mut PixelBuffer<D>,
        signal: StatusSignal,
        now: Instant,
    ) -> driver::Result<()> {
        if buffer.set(STATUS_SLOT, signal.color()).is_err() {
            log::warn!("[signal] strip has no pixels, skipping {signal:?} flash");
            return Ok(());
        }
        let due = now + self.durations.for_signal(signal);
        let pos = self.restores.partition_point(|&t| t <= due);
        self.restores.insert(pos, due);
        buffer.push()
    }

    /// Earliest pending restore, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.restores.first().copied()
    }

    pub fn pending(&self) -> usize {
        self.restores.len()
    }

    /// Run every restore due at or before `now`: slot 0 off, push.
    ///
    /// Returns how many restores ran. Push failures are logged, not
    /// returned; there is nobody to report them to.
    pub fn run_due<D: LedDriver>(&mut self, buffer: &mut PixelBuffer<D>, now: Instant) -> usize {
        let due = self.restores.partition_point(|&t| t <= now);
        for _ in self.restores.drain(..due) {
            // Restores to off rather than the pre-flash color.
            if buffer.set(STATUS_SLOT, color::OFF).is_ok()
                && let Err(e) = buffer.push()
            {
                log::warn!("[signal] restore push failed: {e}");
            }
        }
        due
    }
}
