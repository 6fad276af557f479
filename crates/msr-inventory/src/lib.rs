//! `msr-inventory`: material buffers.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`buffer`] | `MaterialBuffer`: FIFO lots under a capacity             |
//! | [`store`]  | `BufferKind`, `Inventory` (typed `BufferKind → buffer` map) |
//! | [`error`]  | `BufferError`, `BufferResult<T>`                          |
//!
//! # Overflow policy
//!
//! Buffers never hold more than their capacity.  A push that does not fit is
//! truncated to the free space and the excess is handed back to the caller
//! as an overflow lot; a pop larger than the holdings returns what there is.
//! Neither case is an error.

pub mod buffer;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

pub use buffer::MaterialBuffer;
pub use error::{BufferError, BufferResult};
pub use store::{BufferKind, Inventory, InventoryLevel};
