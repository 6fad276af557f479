//! Reactor lifecycle: fresh → loading → loaded → shutdown.

use std::fmt;

use msr_core::Tick;
use tracing::info;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum LifecycleState {
    /// Nothing in the core yet.
    #[default]
    Fresh,
    /// Some core material received, core not yet full.
    Loading,
    /// Core filled at least once; the dataset drives the reactor.
    Loaded,
    /// End of life.  Terminal.
    Shutdown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Fresh    => "fresh",
            LifecycleState::Loading  => "loading",
            LifecycleState::Loaded   => "loaded",
            LifecycleState::Shutdown => "shutdown",
        })
    }
}

/// Lifecycle state plus the activation step.
///
/// `activated_at` is set the first time the core is full at a step end and
/// never changes afterwards.  Later steps where demand pops leave the core
/// below capacity do not move the reactor out of `Loaded`.
#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    state:        LifecycleState,
    activated_at: Option<Tick>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Step at which the core first filled.
    #[inline]
    pub fn activated_at(&self) -> Option<Tick> {
        self.activated_at
    }

    /// `true` while the reactor is loaded and not shut down.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Loaded
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.state == LifecycleState::Shutdown
    }

    /// Apply the end-of-step check.  Returns the new state if it changed.
    pub fn observe_step_end(
        &mut self,
        now:               Tick,
        core_full:         bool,
        core_has_material: bool,
    ) -> Option<LifecycleState> {
        let next = match self.state {
            LifecycleState::Fresh | LifecycleState::Loading if core_full => LifecycleState::Loaded,
            LifecycleState::Fresh if core_has_material => LifecycleState::Loading,
            _ => return None,
        };
        if next == LifecycleState::Loaded && self.activated_at.is_none() {
            self.activated_at = Some(now);
            info!(tick = %now, "reactor loaded");
        }
        self.state = next;
        Some(next)
    }

    /// Move to `Shutdown`.  Returns `false` if already shut down.
    pub fn shutdown(&mut self, now: Tick) -> bool {
        if self.is_shutdown() {
            return false;
        }
        info!(tick = %now, from = %self.state, "reactor shutdown");
        self.state = LifecycleState::Shutdown;
        true
    }
}
