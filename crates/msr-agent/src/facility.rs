//! The `Facility` trait: the callback set a host drives each step.

use msr_inventory::InventoryLevel;

use crate::{AgentResult, Bid, RequestBook, RequestPortfolio, SimContext, Trade, TradeResponse};

/// A participant that stores, consumes, and trades material.
///
/// The host owns the clock and the market; a facility only reacts to the
/// callbacks below, in the order given in the [crate docs](crate).  Each
/// callback runs to completion before the next one starts, so
/// implementations need no internal synchronisation.
///
/// Only [`inventory`][Self::inventory] has a default.
pub trait Facility {
    /// Acquire resources.  Called once before the first step.
    fn activate(&mut self, ctx: &SimContext) -> AgentResult<()>;

    /// Inflow phase.
    fn step_begin(&mut self, ctx: &SimContext) -> AgentResult<()>;

    /// Post-trade bookkeeping.
    fn step_end(&mut self, ctx: &SimContext) -> AgentResult<()>;

    /// Offer material against the open requests of other agents.
    fn collect_bids(&mut self, ctx: &SimContext, requests: &RequestBook) -> Vec<Bid>;

    /// Hand over material for accepted bids, one response per trade that
    /// could be served.
    fn resolve_trades(&mut self, ctx: &SimContext, trades: &[Trade]) -> Vec<TradeResponse>;

    /// Material this facility wants to receive this step.
    fn collect_requests(&mut self, ctx: &SimContext) -> Vec<RequestPortfolio>;

    /// Take delivery of material for this facility's requests.
    fn accept_trades(&mut self, ctx: &SimContext, responses: Vec<TradeResponse>);

    /// Current buffer levels, for reporting.
    fn inventory(&self) -> Vec<InventoryLevel> {
        Vec::new()
    }
}
