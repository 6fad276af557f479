//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `transactions` and `inventory`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{InventoryRow, OutputResult, TransactionRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS transactions (
                 tick      INTEGER NOT NULL,
                 commodity TEXT    NOT NULL,
                 sender    TEXT    NOT NULL,
                 receiver  TEXT    NOT NULL,
                 quantity  REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS inventory (
                 tick     INTEGER NOT NULL,
                 buffer   TEXT    NOT NULL,
                 quantity REAL    NOT NULL,
                 capacity REAL,
                 PRIMARY KEY (tick, buffer)
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_transactions(&mut self, rows: &[TransactionRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO transactions (tick, commodity, sender, receiver, quantity) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.commodity,
                    row.sender,
                    row.receiver,
                    row.quantity,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_inventory(&mut self, rows: &[InventoryRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO inventory (tick, buffer, quantity, capacity) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick as i64, row.buffer, row.quantity, row.capacity])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
