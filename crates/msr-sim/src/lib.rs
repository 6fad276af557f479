//! `msr-sim`: a minimal host that drives one [`Facility`][msr_agent::Facility].
//!
//! The host owns the clock and a tiny market: [`Source`]s that fill the
//! facility's requests and [`Sink`]s that post requests the facility can
//! bid on.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① step_begin
//!   ② collect_requests      → sources fill each request (first source with
//!                              stock, bounded by the portfolio constraint)
//!   ③ sinks post requests   → collect_bids
//!   ④ match                 → first bid per request becomes a trade
//!   ⑤ resolve_trades        → material leaves the facility
//!   ⑥ accept_trades         → source deliveries from ② arrive
//!   ⑦ step_end
//! ```
//!
//! Every material movement is reported through
//! [`SimObserver::on_transaction`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use msr_agent::{ReactorConfig, SaltReactor};
//! use msr_core::SimConfig;
//! use msr_sim::{NoopObserver, SimBuilder, Sink, Source};
//!
//! let reactor = SaltReactor::new(ReactorConfig::new("data/msbr", 1000.0))?;
//! let mut sim = SimBuilder::new(SimConfig::default(), reactor)
//!     .source(Source::new("enrichment", "init_fuel", 1000.0))
//!     .sink(Sink::new("repository", "waste", 50.0))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod market;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use market::{Sink, Source};
pub use observer::{NoopObserver, SimObserver, Transaction};
pub use sim::Sim;
