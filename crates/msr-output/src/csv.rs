//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `transactions.csv`
//! - `inventory.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{InventoryRow, OutputResult, TransactionRow};

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    transactions: Writer<File>,
    inventory:    Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut transactions = Writer::from_path(dir.join("transactions.csv"))?;
        transactions.write_record(["tick", "commodity", "sender", "receiver", "quantity"])?;

        let mut inventory = Writer::from_path(dir.join("inventory.csv"))?;
        inventory.write_record(["tick", "buffer", "quantity", "capacity"])?;

        Ok(Self { transactions, inventory, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_transactions(&mut self, rows: &[TransactionRow]) -> OutputResult<()> {
        for row in rows {
            self.transactions.write_record(&[
                row.tick.to_string(),
                row.commodity.clone(),
                row.sender.clone(),
                row.receiver.clone(),
                row.quantity.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_inventory(&mut self, rows: &[InventoryRow]) -> OutputResult<()> {
        for row in rows {
            self.inventory.write_record(&[
                row.tick.to_string(),
                row.buffer.to_owned(),
                row.quantity.to_string(),
                row.capacity.map(|c| c.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.transactions.flush()?;
        self.inventory.flush()?;
        Ok(())
    }
}
