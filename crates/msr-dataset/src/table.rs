//! Time-series tables: `[timestep][isotope]` grids of quantities.

use std::fmt;

use msr_core::{IsotopeVector, MsrError, MsrResult};

use crate::StepWindow;

// ── TableId ───────────────────────────────────────────────────────────────────

/// The named tables a reactor dataset can carry.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TableId {
    /// Waste stream leaving the reprocessing loop.
    Waste,
    /// Surplus fissile material extracted from the blanket.
    Fissile,
    /// Material the driver salt consumes (stored negative).
    DriverRefill,
    /// Material the blanket salt consumes (stored negative).
    BlanketRefill,
    /// Driver salt composition after reprocessing.
    DriverCore,
    /// Blanket salt composition after reprocessing.
    BlanketCore,
}

impl TableId {
    pub const ALL: [TableId; 6] = [
        TableId::Waste,
        TableId::Fissile,
        TableId::DriverRefill,
        TableId::BlanketRefill,
        TableId::DriverCore,
        TableId::BlanketCore,
    ];

    /// File stem inside the dataset directory (`<stem>.csv`).
    pub fn file_stem(self) -> &'static str {
        match self {
            TableId::Waste         => "waste",
            TableId::Fissile       => "fissile",
            TableId::DriverRefill  => "driver_refill",
            TableId::BlanketRefill => "blanket_refill",
            TableId::DriverCore    => "driver_core",
            TableId::BlanketCore   => "blanket_core",
        }
    }

    /// Flow tables record per-step amounts and may be stored cumulatively.
    /// Core tables are composition snapshots and are never differenced.
    pub fn is_flow(self) -> bool {
        !matches!(self, TableId::DriverCore | TableId::BlanketCore)
    }

    /// Tables every dataset must provide.
    pub fn is_required(self) -> bool {
        matches!(self, TableId::Waste | TableId::Fissile | TableId::DriverRefill)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

// ── TimeSeriesTable ───────────────────────────────────────────────────────────

/// A dense `[timestep][isotope]` grid.
///
/// Every row has exactly `width` entries.  Tables are built once by the
/// loader and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesTable {
    width: usize,
    rows:  Vec<IsotopeVector>,
}

impl TimeSeriesTable {
    /// # Errors
    /// [`MsrError::LengthMismatch`] if any row is not `width` wide.
    pub fn new(width: usize, rows: Vec<IsotopeVector>) -> MsrResult<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(MsrError::LengthMismatch { expected: width, got: bad.len() });
        }
        Ok(Self { width, rows })
    }

    /// Convenience constructor from plain nested vectors.
    pub fn from_rows(width: usize, rows: Vec<Vec<f64>>) -> MsrResult<Self> {
        Self::new(width, rows.into_iter().map(IsotopeVector).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, i: usize) -> Option<&IsotopeVector> {
        self.rows.get(i)
    }

    pub fn rows(&self) -> &[IsotopeVector] {
        &self.rows
    }

    /// Index of the last populated row.
    ///
    /// Producers pre-allocate their tables and leave unreached steps as
    /// all-zero rows; a row counts as populated when any entry is nonzero.
    pub fn last_valid_row(&self) -> Option<usize> {
        self.rows.iter().rposition(|r| !r.is_zero())
    }

    /// Number of rows up to and including the last populated one.
    pub fn valid_len(&self) -> usize {
        self.last_valid_row().map_or(0, |i| i + 1)
    }

    /// Convert running totals into per-step deltas.
    ///
    /// The result is truncated to [`valid_len`][Self::valid_len]; row 0 is
    /// kept as-is and row `i` becomes `row[i] - row[i - 1]`.
    pub fn to_incremental(&self) -> TimeSeriesTable {
        let n = self.valid_len();
        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let row = if i == 0 {
                self.rows[0].clone()
            } else {
                self.rows[i].minus(&self.rows[i - 1])
            };
            rows.push(row);
        }
        TimeSeriesTable { width: self.width, rows }
    }

    /// Running totals of this table (inverse of [`to_incremental`][Self::to_incremental]).
    pub fn to_cumulative(&self) -> TimeSeriesTable {
        let mut acc = IsotopeVector::zeros(self.width);
        let rows = self
            .rows
            .iter()
            .map(|r| {
                acc += r;
                acc.clone()
            })
            .collect();
        TimeSeriesTable { width: self.width, rows }
    }

    /// Sum of the rows inside `window`, clipped to the table length.
    ///
    /// An empty or out-of-range window yields the all-zero vector.
    pub fn window_sum(&self, window: StepWindow) -> IsotopeVector {
        let mut sum = IsotopeVector::zeros(self.width);
        let end = window.end.min(self.rows.len());
        for row in self.rows.iter().take(end).skip(window.start) {
            sum += row;
        }
        sum
    }
}
