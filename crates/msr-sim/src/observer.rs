//! Simulation observer trait for progress reporting and data collection.

use msr_core::{Commodity, Tick};
use msr_inventory::InventoryLevel;

/// One material movement between two named parties.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub tick:      Tick,
    pub commodity: Commodity,
    pub sender:    String,
    pub receiver:  String,
    pub quantity:  f64,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: waste tally
///
/// ```rust,ignore
/// struct WasteTally(f64);
///
/// impl SimObserver for WasteTally {
///     fn on_transaction(&mut self, tx: &Transaction) {
///         if tx.commodity.as_str() == "waste" {
///             self.0 += tx.quantity;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every completed transfer, in the order they happen.
    fn on_transaction(&mut self, _tx: &Transaction) {}

    /// Called at the end of each tick with the facility's buffer levels.
    fn on_tick_end(&mut self, _tick: Tick, _levels: &[InventoryLevel]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
