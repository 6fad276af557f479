//! `msr-dataset`: the reactor dataset and its mapping onto host time.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`table`]  | `TimeSeriesTable`, `TableId`, cumulative → incremental       |
//! | [`loader`] | `Dataset::open`, `DatasetOptions`, `TableFormat`             |
//! | [`mapper`] | `TimestepMapper`, `StepCursor`, `StepWindow`                 |
//! | [`error`]  | `DatasetOpenError`, `DatasetResult<T>`                       |
//!
//! # Time model (summary)
//!
//! The dataset advances in fixed steps of `step_secs`; the host in ticks of
//! `tick_duration_secs`.  Once the reactor is activated at tick `a`, host
//! tick `t` has consumed every dataset row below
//!
//! ```text
//! upper = min(floor((t - a) * tick_duration_secs / step_secs), valid_len - 1) + 1
//! ```
//!
//! and each host step aggregates the rows `[prev, upper)` it has not yet
//! seen.

pub mod error;
pub mod loader;
pub mod mapper;
pub mod table;

#[cfg(test)]
mod tests;

pub use error::{DatasetOpenError, DatasetResult};
pub use loader::{Dataset, DatasetOptions, TableFormat};
pub use mapper::{StepCursor, StepWindow, TimestepMapper};
pub use table::{TableId, TimeSeriesTable};
