//! `msr-core`: foundational types for the `rust_msr` reactor adapter.
//!
//! This crate is a dependency of every other `msr-*` crate.  It has no
//! `msr-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `RequestId`, `TradeId`                     |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`commodity`]   | `Commodity` name newtype                              |
//! | [`composition`] | `IsotopeVector`, `IsotopeIndex`, `IsotopeMap`, `Composition` |
//! | [`material`]    | `Material`: one lot of mass with a composition       |
//! | [`error`]       | `MsrError`, `MsrResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod commodity;
pub mod composition;
pub mod error;
pub mod ids;
pub mod material;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use commodity::Commodity;
pub use composition::{Composition, IsotopeIndex, IsotopeMap, IsotopeVector};
pub use error::{MsrError, MsrResult};
pub use ids::{AgentId, RequestId, TradeId};
pub use material::Material;
pub use time::{SimClock, SimConfig, Tick};

/// Mass tolerance in kilograms for full/empty/zero comparisons.
///
/// Quantities closer than this are treated as equal; lots lighter than this
/// are treated as "no material".
pub const EPS_MASS: f64 = 1e-9;
