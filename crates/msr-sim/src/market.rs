//! The host's market participants.

use msr_core::{Commodity, Composition};

/// Supplies up to `capacity` kg of one commodity per tick.
#[derive(Clone, Debug)]
pub struct Source {
    pub name:      String,
    pub commodity: Commodity,
    pub capacity:  f64,
    /// Composition of what this source ships.  `None` ships whatever the
    /// requester asked for.
    pub recipe:    Option<Composition>,
}

impl Source {
    pub fn new(name: impl Into<String>, commodity: impl Into<Commodity>, capacity: f64) -> Self {
        Self { name: name.into(), commodity: commodity.into(), capacity, recipe: None }
    }

    pub fn with_recipe(mut self, recipe: Composition) -> Self {
        self.recipe = Some(recipe);
        self
    }
}

/// Requests `capacity` kg of one commodity every tick.
#[derive(Clone, Debug)]
pub struct Sink {
    pub name:      String,
    pub commodity: Commodity,
    pub capacity:  f64,
}

impl Sink {
    pub fn new(name: impl Into<String>, commodity: impl Into<Commodity>, capacity: f64) -> Self {
        Self { name: name.into(), commodity: commodity.into(), capacity }
    }
}
