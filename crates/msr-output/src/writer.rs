//! The `OutputWriter` trait implemented by all backend writers.

use crate::{InventoryRow, OutputResult, TransactionRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of transactions.
    fn write_transactions(&mut self, rows: &[TransactionRow]) -> OutputResult<()>;

    /// Write a batch of inventory levels.
    fn write_inventory(&mut self, rows: &[InventoryRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
