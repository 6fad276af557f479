//! `SimContext`: the read-only view a facility gets of its host.

use msr_core::Tick;

/// Everything a [`Facility`][crate::Facility] may know about the host for
/// one callback.
///
/// Built fresh by the host for each tick; facilities never hold on to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimContext {
    /// Current host step.
    pub tick: Tick,

    /// How many seconds one host step represents.
    pub tick_duration_secs: u32,

    /// The last step this facility is alive for, if the host bounds its
    /// lifetime.
    pub exit_tick: Option<Tick>,
}

impl SimContext {
    #[inline]
    pub fn new(tick: Tick, tick_duration_secs: u32, exit_tick: Option<Tick>) -> Self {
        Self { tick, tick_duration_secs, exit_tick }
    }

    /// `true` on the facility's last step.
    #[inline]
    pub fn is_final_step(&self) -> bool {
        self.exit_tick == Some(self.tick)
    }
}
