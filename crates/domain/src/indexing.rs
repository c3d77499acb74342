//! Synthetic indexing progress.
//!
//! The service exposes no progress endpoint, so the client animates a
//! percentage on a fixed interval after indexing is accepted and refetches
//! the repository once the bar is full.

use serde::Serialize;

/// Default increment per tick, in percent.
pub const DEFAULT_PROGRESS_STEP: u8 = 10;

/// Outcome of a single progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressTick {
    /// The bar moved to `percent`.
    Advanced {
        /// New percentage (`1..=100`).
        percent: u8,
    },
    /// The bar was already full; the animation is over.
    Complete,
}

/// Client-side progress counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingProgress {
    percent: u8,
    step: u8,
}

impl IndexingProgress {
    /// Start at 0% with the given step (a zero step is treated as 1).
    #[must_use]
    pub const fn new(step: u8) -> Self {
        Self {
            percent: 0,
            step: if step == 0 { 1 } else { step },
        }
    }

    /// Current percentage.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.percent
    }

    /// Advance one tick.
    ///
    /// Once the percentage reaches 100, the following tick reports
    /// [`ProgressTick::Complete`], as does every tick after it.
    pub fn tick(&mut self) -> ProgressTick {
        if self.percent >= 100 {
            return ProgressTick::Complete;
        }
        self.percent = self.percent.saturating_add(self.step).min(100);
        ProgressTick::Advanced {
            percent: self.percent,
        }
    }
}

impl Default for IndexingProgress {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_STEP)
    }
}
