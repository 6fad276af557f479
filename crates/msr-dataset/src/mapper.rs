//! Mapping host ticks onto dataset rows.

use msr_core::Tick;

use crate::Dataset;

// ── StepWindow ────────────────────────────────────────────────────────────────

/// Half-open range `[start, end)` of dataset rows aggregated for one host
/// step.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct StepWindow {
    pub start: usize,
    pub end:   usize,
}

impl StepWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end: end.max(start) }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

// ── TimestepMapper ────────────────────────────────────────────────────────────

/// Converts host time since activation into a dataset row bound.
#[derive(Clone, Debug)]
pub struct TimestepMapper {
    dataset_step_secs: f64,
    host_step_secs:    u32,
    valid_len:         usize,
}

impl TimestepMapper {
    /// `valid_len` is the number of dataset rows carrying data; indices are
    /// clamped below it.
    pub fn new(dataset_step_secs: f64, host_step_secs: u32, valid_len: usize) -> Self {
        Self { dataset_step_secs, host_step_secs, valid_len }
    }

    pub fn for_dataset(dataset: &Dataset, host_step_secs: u32) -> Self {
        Self::new(dataset.step_secs(), host_step_secs, dataset.valid_len())
    }

    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    /// The dataset row reached after `elapsed_secs` of reactor operation,
    /// clamped to the last valid row.  `None` for a dataset with no data.
    pub fn dataset_index(&self, elapsed_secs: f64) -> Option<usize> {
        let last = self.valid_len.checked_sub(1)?;
        let raw = (elapsed_secs.max(0.0) / self.dataset_step_secs).floor();
        // `as` saturates for out-of-range floats.
        Some((raw as usize).min(last))
    }

    /// Exclusive row bound for host tick `now`.
    ///
    /// `None` is the "no new data" sentinel: the reactor has not been
    /// activated yet, or the dataset is empty.
    pub fn upper_bound(&self, now: Tick, activated_at: Option<Tick>) -> Option<usize> {
        let start = activated_at?;
        let elapsed = now.since(start) as f64 * self.host_step_secs as f64;
        self.dataset_index(elapsed).map(|i| i + 1)
    }
}

// ── StepCursor ────────────────────────────────────────────────────────────────

/// Tracks the first dataset row not yet consumed.
///
/// The cursor never moves backwards, so consecutive windows tile the
/// dataset without overlap.
#[derive(Clone, Debug, Default)]
pub struct StepCursor {
    prev: usize,
}

impl StepCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// First row the next window will include.
    pub fn position(&self) -> usize {
        self.prev
    }

    /// The most recent row already consumed, if any.
    pub fn last_consumed(&self) -> Option<usize> {
        self.prev.checked_sub(1)
    }

    /// Window `[prev, upper)` without moving the cursor.
    pub fn peek(&self, upper: usize) -> StepWindow {
        StepWindow::new(self.prev, upper)
    }

    /// Return the window `[prev, upper)` and move the cursor to its end.
    ///
    /// An `upper` below the current position yields an empty window and
    /// leaves the cursor where it is.
    pub fn advance(&mut self, upper: usize) -> StepWindow {
        let window = self.peek(upper);
        self.prev = window.end;
        window
    }
}
