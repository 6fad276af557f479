//! `msr-agent`: the reactor facility and its host contract.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`facility`]  | `Facility`: the fixed callback set a host drives          |
//! | [`context`]   | `SimContext`: read-only per-tick host view                |
//! | [`exchange`]  | Requests, bids, trades, and responses                      |
//! | [`lifecycle`] | `LifecycleState`, `Lifecycle`                              |
//! | [`config`]    | `ReactorConfig` (serde)                                    |
//! | [`reactor`]   | `SaltReactor`: dataset-driven `Facility` implementation   |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                             |
//!
//! # Step protocol
//!
//! ```text
//! activate                       once, before the first tick
//! per tick:
//!   step_begin                   inflows from the dataset, demand staging
//!   collect_requests             what the reactor wants to receive
//!   collect_bids(book)           offers against other agents' requests
//!   resolve_trades(trades)       hand over material for accepted bids
//!   accept_trades(responses)     receive material for our requests
//!   step_end                     lifecycle check
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod facility;
pub mod lifecycle;
pub mod reactor;


pub use config::ReactorConfig;
pub use context::SimContext;
pub use error::{AgentError, AgentResult};
pub use exchange::{Bid, DemandRequest, Request, RequestBook, RequestPortfolio, RequestSpec, Trade, TradeResponse};
pub use facility::Facility;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use reactor::SaltReactor;
