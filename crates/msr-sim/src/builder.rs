//! Fluent builder for constructing a [`Sim`].

use msr_agent::{Facility, SimContext};
use msr_core::{SimConfig, Tick};
use tracing::info;

use crate::sim::IdAllocator;
use crate::{Sim, SimError, SimResult, Sink, Source};

/// Fluent builder for [`Sim<F>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: start time, step length, total ticks, output interval
/// - `F: Facility`: the facility under simulation
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                              |
/// |------------------|--------------------------------------|
/// | `.name(s)`       | `"reactor"`                          |
/// | `.source(s)`     | No sources: requests go unanswered   |
/// | `.sink(s)`       | No sinks: nothing is ever bid on     |
/// | `.lifetime(n)`   | Unbounded: no end-of-life step       |
pub struct SimBuilder<F: Facility> {
    config:   SimConfig,
    facility: F,
    name:     String,
    sources:  Vec<Source>,
    sinks:    Vec<Sink>,
    lifetime: Option<u64>,
}

impl<F: Facility> SimBuilder<F> {
    pub fn new(config: SimConfig, facility: F) -> Self {
        Self {
            config,
            facility,
            name:     "reactor".to_owned(),
            sources:  Vec::new(),
            sinks:    Vec::new(),
            lifetime: None,
        }
    }

    /// Name the facility appears under in transactions.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sink(mut self, sink: Sink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of ticks the facility lives for, counted from tick 0.  Its
    /// final step is tick `ticks - 1`.
    pub fn lifetime(mut self, ticks: u64) -> Self {
        self.lifetime = Some(ticks);
        self
    }

    /// Validate inputs, activate the facility, and return a ready-to-run
    /// [`Sim`].
    ///
    /// # Errors
    /// [`SimError::Config`] for a zero step length, zero lifetime, or a
    /// negative market capacity; [`SimError::Agent`] if activation fails.
    pub fn build(mut self) -> SimResult<Sim<F>> {
        if self.config.tick_duration_secs == 0 {
            return Err(SimError::Config("tick_duration_secs must be positive".into()));
        }
        let exit_tick = match self.lifetime {
            Some(0)     => return Err(SimError::Config("lifetime must be at least one tick".into())),
            Some(ticks) => Some(Tick(ticks - 1)),
            None        => None,
        };
        let bad_capacity = self
            .sources
            .iter()
            .map(|s| (&s.name, s.capacity))
            .chain(self.sinks.iter().map(|s| (&s.name, s.capacity)))
            .find(|&(_, c)| !(c.is_finite() && c >= 0.0));
        if let Some((name, capacity)) = bad_capacity {
            return Err(SimError::Config(format!(
                "market participant {name:?} has invalid capacity {capacity}"
            )));
        }

        let clock = self.config.make_clock();
        let ctx = SimContext::new(clock.current_tick, self.config.tick_duration_secs, exit_tick);
        self.facility.activate(&ctx)?;
        info!(
            facility = %self.name,
            sources  = self.sources.len(),
            sinks    = self.sinks.len(),
            ticks    = self.config.total_ticks,
            "simulation ready"
        );

        Ok(Sim {
            config:   self.config,
            clock,
            facility: self.facility,
            name:     self.name,
            sources:  self.sources,
            sinks:    self.sinks,
            exit_tick,
            ids:      IdAllocator::default(),
        })
    }
}
