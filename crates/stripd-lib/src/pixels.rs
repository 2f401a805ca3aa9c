//! Pixel buffer — fixed-length slot array in front of an [`LedDriver`].
//!
//! Writes only touch memory. Nothing reaches the strip until [`PixelBuffer::push`],
//! so callers batch a whole command into one push.

use std::fmt;

use crate::color;
use crate::driver::{self, LedDriver};

/// Slot access outside `0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsError {
    Index { index: usize, len: usize },
    Range { from: usize, to: usize, len: usize },
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundsError::Index { index, len } => {
                write!(f, "index {index} out of bounds for {len} pixels")
            }
            BoundsError::Range { from, to, len } => {
                write!(f, "range {from}..={to} out of bounds for {len} pixels")
            }
        }
    }
}

impl std::error::Error for BoundsError {}

pub struct PixelBuffer<D: LedDriver> {
    slots: Vec<u32>,
    driver: D,
}

impl<D: LedDriver> PixelBuffer<D> {
    /// Allocate `pixel_count` slots, all off. The length never changes.
    pub fn new(pixel_count: usize, driver: D) -> Self {
        PixelBuffer {
            slots: vec![color::OFF; pixel_count],
            driver,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.slots.get(index).copied()
    }

    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn set(&mut self, index: usize, color: u32) -> Result<(), BoundsError> {
        debug_assert!(color <= color::MAX_COLOR);
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BoundsError::Index { index, len })?;
        *slot = color;
        Ok(())
    }

    /// Set slots `from..=to`. Nothing is written unless the whole range fits.
    pub fn set_range(&mut self, from: usize, to: usize, color: u32) -> Result<(), BoundsError> {
        debug_assert!(color <= color::MAX_COLOR);
        let len = self.slots.len();
        if from > to || to >= len {
            return Err(BoundsError::Range { from, to, len });
        }
        self.slots[from..=to].fill(color);
        Ok(())
    }

    pub fn fill(&mut self, color: u32) {
        debug_assert!(color <= color::MAX_COLOR);
        self.slots.fill(color);
    }

    pub fn clear(&mut self) {
        self.fill(color::OFF);
    }

    /// Send the current contents to the strip.
    pub fn push(&self) -> driver::Result<()> {
        self.driver.push(&self.slots)
    }
}
