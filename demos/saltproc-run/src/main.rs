//! saltproc-run: drives one molten-salt reactor through a small fuel cycle.
//!
//! Reads a JSON run file (host step, reactor settings, sources, sinks),
//! wires a `SaltReactor` into the harness and writes `transactions.csv` and
//! `inventory.csv` to the output directory.
//!
//! ```text
//! cargo run -p saltproc-run -- demos/saltproc-run/data/run.json -o output/saltproc
//! RUST_LOG=msr_agent=debug cargo run -p saltproc-run -- demos/saltproc-run/data/run.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use msr_agent::{ReactorConfig, SaltReactor};
use msr_core::{Commodity, Composition, SimConfig, Tick};
use msr_inventory::InventoryLevel;
use msr_output::{CsvWriter, OutputWriter, SimOutputObserver};
use msr_sim::{SimBuilder, SimObserver, Sink, Source, Transaction};

// ── Command line ──────────────────────────────────────────────────────────────

/// Run a molten-salt reactor against fixed sources and sinks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON run file.
    run_file: PathBuf,

    /// Directory for the CSV output.
    #[arg(short, long, default_value = "output/saltproc")]
    output: PathBuf,
}

// ── Run file ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RunFile {
    #[serde(default)]
    sim:            SimConfig,
    reactor:        ReactorConfig,
    #[serde(default)]
    lifetime_ticks: Option<u64>,
    #[serde(default)]
    sources:        Vec<SourceSpec>,
    #[serde(default)]
    sinks:          Vec<SinkSpec>,
}

#[derive(Deserialize)]
struct SourceSpec {
    name:      String,
    commodity: Commodity,
    capacity:  f64,
    #[serde(default)]
    recipe:    Option<Composition>,
}

#[derive(Deserialize)]
struct SinkSpec {
    name:      String,
    commodity: Commodity,
    capacity:  f64,
}

fn load_run_file(path: &Path) -> Result<RunFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading run file {}", path.display()))?;
    let mut run: RunFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing run file {}", path.display()))?;

    // Dataset paths are relative to the run file.
    if run.reactor.dataset_path.is_relative() {
        let base = path.parent().unwrap_or(Path::new("."));
        run.reactor.dataset_path = base.join(&run.reactor.dataset_path);
    }
    Ok(run)
}

// ── Observer wrapper to tally flows ──────────────────────────────────────────

struct TallyObserver<W: OutputWriter> {
    inner:    SimOutputObserver<W>,
    moved:    BTreeMap<String, f64>,
    last_end: Vec<InventoryLevel>,
}

impl<W: OutputWriter> TallyObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, moved: BTreeMap::new(), last_end: Vec::new() }
    }
}

impl<W: OutputWriter> SimObserver for TallyObserver<W> {
    fn on_tick_start(&mut self, tick: Tick) {
        self.inner.on_tick_start(tick);
    }

    fn on_transaction(&mut self, tx: &Transaction) {
        *self.moved.entry(tx.commodity.as_str().to_owned()).or_default() += tx.quantity;
        self.inner.on_transaction(tx);
    }

    fn on_tick_end(&mut self, tick: Tick, levels: &[InventoryLevel]) {
        self.last_end = levels.to_vec();
        self.inner.on_tick_end(tick, levels);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    // 1. Run file.
    let run = load_run_file(&args.run_file)?;
    println!("=== saltproc-run ===");
    println!(
        "Dataset: {}  |  Step: {} s  |  Ticks: {}",
        run.reactor.dataset_path.display(),
        run.sim.tick_duration_secs,
        run.sim.total_ticks
    );
    println!();

    // 2. Reactor and harness.
    let reactor = SaltReactor::new(run.reactor)?;
    let mut builder = SimBuilder::new(run.sim.clone(), reactor).name("msr");
    for s in run.sources {
        let mut source = Source::new(s.name, s.commodity, s.capacity);
        if let Some(recipe) = s.recipe {
            source = source.with_recipe(recipe);
        }
        builder = builder.source(source);
    }
    for s in run.sinks {
        builder = builder.sink(Sink::new(s.name, s.commodity, s.capacity));
    }
    if let Some(ticks) = run.lifetime_ticks {
        builder = builder.lifetime(ticks);
    }
    let mut sim = builder.build()?;

    // 3. Output.
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let writer = CsvWriter::new(&args.output)?;
    let mut obs = TallyObserver::new(SimOutputObserver::new(writer, &run.sim));

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        error!(error = %e, "output error");
    }

    // 5. Summary.
    let lifecycle = sim.facility.lifecycle();
    info!(
        ticks = run.sim.total_ticks,
        elapsed_secs = elapsed.as_secs_f64(),
        state = %lifecycle.state(),
        "run complete"
    );
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "Reactor state: {}  (activated at {:?})",
        lifecycle.state(),
        lifecycle.activated_at().map(|t| t.0)
    );
    println!();

    println!("{:<20} {:>12}", "Commodity", "Moved (kg)");
    println!("{}", "-".repeat(33));
    for (commodity, kg) in &obs.moved {
        println!("{commodity:<20} {kg:>12.3}");
    }
    println!();

    println!("{:<10} {:>12} {:>12}", "Buffer", "Held (kg)", "Capacity");
    println!("{}", "-".repeat(36));
    for level in &obs.last_end {
        let capacity = if level.capacity.is_finite() {
            format!("{:.3}", level.capacity)
        } else {
            "-".to_owned()
        };
        println!("{:<10} {:>12.3} {:>12}", level.kind.name(), level.quantity, capacity);
    }
    println!();
    println!("Output written to {}", args.output.display());

    Ok(())
}
