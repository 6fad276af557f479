//! Unit tests for msr-sim.

use std::collections::BTreeMap;

use msr_agent::{
    AgentError, AgentResult, Bid, Facility, LifecycleState, ReactorConfig, RequestBook,
    RequestPortfolio, SaltReactor, SimContext, Trade, TradeResponse,
};
use msr_core::{Commodity, Composition, IsotopeIndex, Material, SimConfig, Tick};
use msr_dataset::{Dataset, TableFormat, TableId, TimeSeriesTable};
use msr_inventory::{BufferKind, InventoryLevel};

use crate::{NoopObserver, SimBuilder, SimError, SimObserver, Sink, Source, Transaction};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn config(ticks: u64) -> SimConfig {
    SimConfig { tick_duration_secs: 1, total_ticks: ticks, ..SimConfig::default() }
}

fn dataset(tables: Vec<(TableId, Vec<Vec<f64>>)>) -> Dataset {
    let isotopes = IsotopeIndex::new(vec!["U235".into(), "Xe135".into()]).unwrap();
    let tables: BTreeMap<TableId, TimeSeriesTable> = tables
        .into_iter()
        .map(|(id, rows)| (id, TimeSeriesTable::from_rows(2, rows).unwrap()))
        .collect();
    Dataset::from_tables(isotopes, 1.0, TableFormat::Incremental, tables).unwrap()
}

/// Waste of 1 kg Xe135 per row, no fissile, no refill.
fn waste_only(rows: usize) -> Dataset {
    dataset(vec![
        (TableId::Waste, vec![vec![0.0, 1.0]; rows]),
        (TableId::Fissile, vec![vec![0.0, 0.0]; rows]),
        (TableId::DriverRefill, vec![vec![0.0, 0.0]; rows]),
    ])
}

fn reactor(core: f64, blanket: Option<f64>, ds: Dataset) -> SaltReactor {
    let mut config = ReactorConfig::new("unused", core);
    config.blanket_size = blanket;
    config.final_fuel = Some(Commodity::new("spent"));
    SaltReactor::with_dataset(config, ds).unwrap()
}

#[derive(Default)]
struct Recorder {
    started:      Vec<Tick>,
    transactions: Vec<Transaction>,
    levels:       Vec<(Tick, Vec<InventoryLevel>)>,
    ended:        Option<Tick>,
}

impl Recorder {
    fn moved(&self, commodity: &str, receiver: &str) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.commodity.as_str() == commodity && t.receiver == receiver)
            .map(|t| t.quantity)
            .sum()
    }
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.started.push(tick);
    }

    fn on_transaction(&mut self, tx: &Transaction) {
        self.transactions.push(tx.clone());
    }

    fn on_tick_end(&mut self, tick: Tick, levels: &[InventoryLevel]) {
        self.levels.push((tick, levels.to_vec()));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.ended = Some(final_tick);
    }
}

// ── Callback order ────────────────────────────────────────────────────────────

#[cfg(test)]
mod protocol {
    use super::*;

    /// Records callback names; requests and bids one unit of "x".
    #[derive(Default)]
    struct ScriptedFacility {
        calls: Vec<&'static str>,
    }

    impl Facility for ScriptedFacility {
        fn activate(&mut self, _ctx: &SimContext) -> AgentResult<()> {
            self.calls.push("activate");
            Ok(())
        }

        fn step_begin(&mut self, _ctx: &SimContext) -> AgentResult<()> {
            self.calls.push("step_begin");
            Ok(())
        }

        fn step_end(&mut self, _ctx: &SimContext) -> AgentResult<()> {
            self.calls.push("step_end");
            Ok(())
        }

        fn collect_bids(&mut self, _ctx: &SimContext, requests: &RequestBook) -> Vec<Bid> {
            self.calls.push("collect_bids");
            requests
                .values()
                .flatten()
                .flat_map(|r| {
                    // Two bids per request; only the first may win.
                    [1.0, 2.0].map(|q| Bid {
                        request:   r.id,
                        commodity: r.commodity.clone(),
                        offer:     Material::new(q, Composition::pure("U235")),
                    })
                })
                .collect()
        }

        fn resolve_trades(&mut self, _ctx: &SimContext, trades: &[Trade]) -> Vec<TradeResponse> {
            self.calls.push("resolve_trades");
            trades
                .iter()
                .map(|t| TradeResponse {
                    trade:    t.clone(),
                    material: Material::new(t.quantity, Composition::pure("U235")),
                })
                .collect()
        }

        fn collect_requests(&mut self, _ctx: &SimContext) -> Vec<RequestPortfolio> {
            self.calls.push("collect_requests");
            vec![RequestPortfolio::single(
                Commodity::new("x"),
                Material::new(5.0, Composition::pure("U235")),
            )]
        }

        fn accept_trades(&mut self, _ctx: &SimContext, _responses: Vec<TradeResponse>) {
            self.calls.push("accept_trades");
        }
    }

    #[test]
    fn callbacks_run_in_step_order() {
        let mut sim = SimBuilder::new(config(1), ScriptedFacility::default())
            .source(Source::new("src", "x", 10.0))
            .sink(Sink::new("snk", "x", 3.0))
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.facility.calls, [
            "activate",
            "step_begin",
            "collect_requests",
            "collect_bids",
            "resolve_trades",
            "accept_trades",
            "step_end",
        ]);
    }

    #[test]
    fn first_bid_per_request_wins() {
        let mut sim = SimBuilder::new(config(1), ScriptedFacility::default())
            .name("scout")
            .sink(Sink::new("snk", "x", 3.0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.transactions.len(), 1);
        let tx = &rec.transactions[0];
        assert_eq!(tx.sender, "scout");
        assert_eq!(tx.receiver, "snk");
        assert!(close(tx.quantity, 1.0));
    }

    #[test]
    fn sources_are_limited_per_tick() {
        let mut sim = SimBuilder::new(config(2), ScriptedFacility::default())
            .source(Source::new("src", "x", 2.0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        // 5 requested each tick, 2 available each tick.
        assert!(close(rec.moved("x", "reactor"), 4.0));
    }

    #[test]
    fn run_stops_at_end_tick() {
        let mut sim = SimBuilder::new(config(3), ScriptedFacility::default()).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.started, [Tick(0), Tick(1), Tick(2)]);
        assert_eq!(rec.ended, Some(Tick(3)));
        assert_eq!(sim.clock.current_tick, Tick(3));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let mut sim = SimBuilder::new(config(1), ScriptedFacility::default()).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(4, &mut rec).unwrap();
        assert_eq!(rec.started.len(), 4);
        assert_eq!(rec.ended, None);
    }

    #[test]
    fn build_rejects_bad_inputs() {
        assert!(matches!(
            SimBuilder::new(config(1), ScriptedFacility::default()).lifetime(0).build(),
            Err(SimError::Config(_))
        ));
        assert!(matches!(
            SimBuilder::new(config(1), ScriptedFacility::default()).sink(Sink::new("s", "x", -1.0)).build(),
            Err(SimError::Config(_))
        ));
        let zero_step = SimConfig { tick_duration_secs: 0, ..config(1) };
        assert!(SimBuilder::new(zero_step, ScriptedFacility::default()).build().is_err());
    }
}

// ── Reactor runs ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod reactor_runs {
    use super::*;

    #[test]
    fn activation_failure_surfaces() {
        let dir = std::env::temp_dir().join("msr-sim-no-such-dataset");
        let r = SaltReactor::new(ReactorConfig::new(dir, 10.0)).unwrap();
        assert!(matches!(
            SimBuilder::new(config(1), r).build(),
            Err(SimError::Agent(AgentError::Dataset(_)))
        ));
    }

    #[test]
    fn loads_on_the_tick_both_regions_fill() {
        let mut sim = SimBuilder::new(config(2), reactor(100.0, Some(50.0), waste_only(3)))
            .source(Source::new("enrichment", "init_fuel", 60.0))
            .source(Source::new("blanket", "fill", 50.0))
            .build()
            .unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.facility.lifecycle().state(), LifecycleState::Loading);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.facility.lifecycle().state(), LifecycleState::Loaded);
        assert_eq!(sim.facility.lifecycle().activated_at(), Some(Tick(1)));
    }

    #[test]
    fn waste_flows_to_sink() {
        let mut sim = SimBuilder::new(config(4), reactor(10.0, None, waste_only(5)))
            .source(Source::new("enrichment", "init_fuel", 10.0))
            .sink(Sink::new("repository", "waste", 100.0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        // Loaded at tick 0; tick 1 consumes rows 0-1, ticks 2 and 3 one row each.
        assert!(close(rec.moved("init_fuel", "reactor"), 10.0));
        assert!(close(rec.moved("waste", "repository"), 4.0));
        assert!(sim.facility.buffers().get(BufferKind::Waste).is_empty());

        let (tick, levels) = rec.levels.last().unwrap();
        assert_eq!(*tick, Tick(3));
        assert_eq!(levels.len(), 5);
    }

    #[test]
    fn end_of_life_discharge_is_sold() {
        let mut sim = SimBuilder::new(config(5), reactor(10.0, Some(5.0), waste_only(5)))
            .source(Source::new("enrichment", "init_fuel", 10.0))
            .source(Source::new("thorium", "fill", 5.0).with_recipe(Composition::pure("Th232")))
            .sink(Sink::new("storage", "spent", 100.0))
            .lifetime(3)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert!(sim.facility.lifecycle().is_shutdown());
        assert!(close(rec.moved("spent", "storage"), 15.0));
        let spent: Vec<&Transaction> = rec
            .transactions
            .iter()
            .filter(|t| t.commodity.as_str() == "spent")
            .collect();
        assert_eq!(spent.len(), 1);
        assert_eq!(spent[0].tick, Tick(2));
        // No requests after shutdown.
        assert!(rec.transactions.iter().all(|t| t.tick <= Tick(2) || t.receiver != "reactor"));
    }
}
