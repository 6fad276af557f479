//! The `Sim` struct and its tick loop.

use std::collections::{BTreeSet, HashMap};

use msr_agent::{Facility, Request, RequestBook, SimContext, Trade, TradeResponse};
use msr_core::{AgentId, EPS_MASS, Material, RequestId, SimClock, SimConfig, Tick, TradeId};
use tracing::{debug, warn};

use crate::{SimObserver, SimResult, Sink, Source, Transaction};

// ── Id allocation ─────────────────────────────────────────────────────────────

/// Sequential request and trade numbering, unique for the whole run.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next_request: u64,
    next_trade:   u64,
}

impl IdAllocator {
    fn request(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    fn trade(&mut self) -> TradeId {
        let id = TradeId(self.next_trade);
        self.next_trade += 1;
        id
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation runner.
///
/// Holds the clock, the facility, and the market, and drives the tick loop
/// described in the [crate docs](crate).  Create via
/// [`SimBuilder`][crate::SimBuilder].
pub struct Sim<F: Facility> {
    /// Global configuration (total ticks, tick duration, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and maps to wall time.
    pub clock: SimClock,

    /// The facility under simulation.
    pub facility: F,

    /// Name the facility appears under in transactions.
    pub name: String,

    pub sources: Vec<Source>,
    pub sinks:   Vec<Sink>,

    /// The facility's final step, if its lifetime is bounded.
    pub exit_tick: Option<Tick>,

    pub(crate) ids: IdAllocator,
}

impl<F: Facility> Sim<F> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        self.process_tick(now, observer)?;
        let levels = self.facility.inventory();
        observer.on_tick_end(now, &levels);
        self.clock.advance();
        Ok(())
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<()> {
        let ctx = SimContext::new(now, self.config.tick_duration_secs, self.exit_tick);

        // ── Phase 1: inflows ──────────────────────────────────────────────
        self.facility.step_begin(&ctx)?;

        // ── Phase 2: the facility's requests, filled by sources ───────────
        //
        // Deliveries are held back until after the facility has resolved its
        // own trades, so material bought this tick cannot be resold in it.
        let deliveries = self.fill_requests(&ctx, observer);

        // ── Phase 3: sinks post requests, facility bids ───────────────────
        let mut book = RequestBook::new();
        let mut receivers: HashMap<RequestId, usize> = HashMap::new();
        for (i, sink) in self.sinks.iter().enumerate() {
            let id = self.ids.request();
            receivers.insert(id, i);
            book.entry(sink.commodity.clone()).or_default().push(Request {
                id,
                requester:   AgentId(i as u32 + 1),
                commodity:   sink.commodity.clone(),
                quantity:    sink.capacity,
                composition: None,
            });
        }
        let bids = self.facility.collect_bids(&ctx, &book);

        // ── Phase 4: greedy match: first bid per request wins ────────────
        let mut matched = BTreeSet::new();
        let mut trades = Vec::new();
        for bid in bids {
            if !receivers.contains_key(&bid.request) {
                warn!(tick = %now, request = %bid.request, "bid for an unknown request; ignored");
                continue;
            }
            if bid.offer.is_negligible() || !matched.insert(bid.request) {
                continue;
            }
            trades.push(Trade {
                id:        self.ids.trade(),
                request:   bid.request,
                commodity: bid.commodity,
                quantity:  bid.offer.quantity(),
            });
        }

        // ── Phase 5: the facility hands material over ─────────────────────
        let responses = self.facility.resolve_trades(&ctx, &trades);
        if responses.len() < trades.len() {
            debug!(tick = %now, trades = trades.len(), served = responses.len(), "some trades went unserved");
        }
        for TradeResponse { trade, material } in &responses {
            let Some(&sink) = receivers.get(&trade.request) else {
                continue;
            };
            observer.on_transaction(&Transaction {
                tick:      now,
                commodity: trade.commodity.clone(),
                sender:    self.name.clone(),
                receiver:  self.sinks[sink].name.clone(),
                quantity:  material.quantity(),
            });
        }

        // ── Phase 6: deliveries arrive ────────────────────────────────────
        self.facility.accept_trades(&ctx, deliveries);

        // ── Phase 7: bookkeeping ──────────────────────────────────────────
        self.facility.step_end(&ctx)?;
        Ok(())
    }

    /// Match the facility's requests against source stock for this tick.
    fn fill_requests<O: SimObserver>(&mut self, ctx: &SimContext, observer: &mut O) -> Vec<TradeResponse> {
        let portfolios = self.facility.collect_requests(ctx);
        let mut stock: Vec<f64> = self.sources.iter().map(|s| s.capacity).collect();
        let mut deliveries = Vec::new();

        for portfolio in portfolios {
            let mut budget = portfolio.constraint;
            for spec in portfolio.requests {
                let request = self.ids.request();
                let wanted = spec.target.quantity().min(budget);
                if wanted <= EPS_MASS {
                    continue;
                }
                let Some(i) = self
                    .sources
                    .iter()
                    .zip(&stock)
                    .position(|(s, &left)| s.commodity == spec.commodity && left > EPS_MASS)
                else {
                    debug!(tick = %ctx.tick, commodity = %spec.commodity, wanted, "no source for request");
                    continue;
                };
                let source = &self.sources[i];
                let quantity = wanted.min(stock[i]);
                stock[i] -= quantity;
                budget -= quantity;

                let composition = source
                    .recipe
                    .clone()
                    .unwrap_or_else(|| spec.target.composition().clone());
                observer.on_transaction(&Transaction {
                    tick:      ctx.tick,
                    commodity: spec.commodity.clone(),
                    sender:    source.name.clone(),
                    receiver:  self.name.clone(),
                    quantity,
                });
                deliveries.push(TradeResponse {
                    trade: Trade {
                        id:        self.ids.trade(),
                        request,
                        commodity: spec.commodity,
                        quantity,
                    },
                    material: Material::new(quantity, composition),
                });
            }
        }
        deliveries
    }
}
