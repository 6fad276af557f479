//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use msr_core::{SimConfig, Tick};
use msr_inventory::InventoryLevel;
use msr_sim::{SimObserver, Transaction};

use crate::row::{InventoryRow, TransactionRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes transactions and inventory levels to any
/// [`OutputWriter`] backend.
///
/// Inventory rows are written every `config.output_interval_ticks` ticks
/// (never, if the interval is 0).  Errors from the writer are stored
/// internally because `SimObserver` methods have no return value.  After
/// `sim.run()` returns, check for errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    interval:   u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self { writer, interval: config.output_interval_ticks, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_transaction(&mut self, tx: &Transaction) {
        let row = TransactionRow {
            tick:      tx.tick.0,
            commodity: tx.commodity.as_str().to_owned(),
            sender:    tx.sender.clone(),
            receiver:  tx.receiver.clone(),
            quantity:  tx.quantity,
        };
        let result = self.writer.write_transactions(&[row]);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, tick: Tick, levels: &[InventoryLevel]) {
        if self.interval == 0 || tick.0 % self.interval != 0 || levels.is_empty() {
            return;
        }
        let rows: Vec<InventoryRow> = levels
            .iter()
            .map(|l| InventoryRow {
                tick:     tick.0,
                buffer:   l.kind.name(),
                quantity: l.quantity,
                capacity: l.capacity.is_finite().then_some(l.capacity),
            })
            .collect();
        let result = self.writer.write_inventory(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
