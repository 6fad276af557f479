//! `msr-output`: transaction and inventory writers for rust_msr runs.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend     | Files created                           |
//! |-----------|-------------|-----------------------------------------|
//! | *(none)*  | CSV         | `transactions.csv`, `inventory.csv`     |
//! | `sqlite`  | SQLite      | `output.db`                             |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `msr_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use msr_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{InventoryRow, TransactionRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
