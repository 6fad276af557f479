//! Plain data row types written by output backends.

/// One material transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub tick:      u64,
    pub commodity: String,
    pub sender:    String,
    pub receiver:  String,
    /// Kilograms moved.
    pub quantity:  f64,
}

/// The level of one facility buffer at the end of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub tick:     u64,
    pub buffer:   &'static str,
    pub quantity: f64,
    /// `None` for an unbounded buffer.
    pub capacity: Option<f64>,
}
