//! `ReactorConfig`: construction-time settings for a [`SaltReactor`][crate::SaltReactor].

use std::path::PathBuf;

use msr_core::{Commodity, Composition};
use msr_dataset::{DatasetOptions, TableFormat};
use serde::Deserialize;

use crate::{AgentError, AgentResult};

/// Reactor settings, usually read from JSON.
///
/// Quantities are in kilograms.  Optional buffer sizes left out mean
/// "no limit"; a missing `blanket_size` means a single-region core with no
/// blanket at all.
#[derive(Clone, Debug, Deserialize)]
pub struct ReactorConfig {
    // ── Commodities ───────────────────────────────────────────────────────
    /// Initial driver fuel, requested until the core first fills.
    pub init_fuel: Commodity,
    /// Final discharge at end of life.  No discharge is offered when unset.
    #[serde(default)]
    pub final_fuel: Option<Commodity>,
    /// Refill material, and the blanket's initial load.
    pub fill: Commodity,
    /// Surplus fissile material offered to the market.
    pub fissile_out: Commodity,
    /// Waste offered to the market.
    pub waste: Commodity,

    // ── Dataset ───────────────────────────────────────────────────────────
    pub dataset_path: PathBuf,
    #[serde(default)]
    pub table_format: TableFormat,
    /// Multiplier on the dataset step duration.
    #[serde(default = "one")]
    pub timestep_scale: f64,
    /// Kilograms per dataset table unit for the driver streams (waste and
    /// driver refill).
    #[serde(default = "one")]
    pub mass_scale: f64,
    /// Kilograms per table unit for the blanket streams (fissile and blanket
    /// refill).  Falls back to `mass_scale`.
    #[serde(default)]
    pub blanket_mass_scale: Option<f64>,

    // ── Buffers ───────────────────────────────────────────────────────────
    /// Driver region capacity.
    pub core_size: f64,
    #[serde(default)]
    pub blanket_size: Option<f64>,
    #[serde(default)]
    pub fill_tank_size: f64,
    #[serde(default)]
    pub waste_tank_size: Option<f64>,
    #[serde(default)]
    pub fissile_tank_size: Option<f64>,

    // ── Recipes ───────────────────────────────────────────────────────────
    #[serde(default = "default_driver_recipe")]
    pub driver_recipe: Composition,
    #[serde(default = "default_blanket_recipe")]
    pub blanket_recipe: Composition,
    /// Fixed refill composition.  When unset the composition comes from the
    /// dataset's refill tables.
    #[serde(default)]
    pub fill_recipe: Option<Composition>,
}

fn one() -> f64 {
    1.0
}

fn default_driver_recipe() -> Composition {
    Composition::pure("92235")
}

fn default_blanket_recipe() -> Composition {
    Composition::pure("92238")
}

impl ReactorConfig {
    /// A config with default commodity names, a single-region core of
    /// `core_size` kg, and every other field at its default.
    pub fn new(dataset_path: impl Into<PathBuf>, core_size: f64) -> Self {
        Self {
            init_fuel:          Commodity::new("init_fuel"),
            final_fuel:         None,
            fill:               Commodity::new("fill"),
            fissile_out:        Commodity::new("fissile"),
            waste:              Commodity::new("waste"),
            dataset_path:       dataset_path.into(),
            table_format:       TableFormat::Auto,
            timestep_scale:     1.0,
            mass_scale:         1.0,
            blanket_mass_scale: None,
            core_size,
            blanket_size:       None,
            fill_tank_size:     0.0,
            waste_tank_size:    None,
            fissile_tank_size:  None,
            driver_recipe:      default_driver_recipe(),
            blanket_recipe:     default_blanket_recipe(),
            fill_recipe:        None,
        }
    }

    /// `true` for a driver + blanket core.
    pub fn has_blanket(&self) -> bool {
        self.blanket_size.is_some()
    }

    /// Scale applied to the fissile and blanket refill tables.
    pub fn blanket_scale(&self) -> f64 {
        self.blanket_mass_scale.unwrap_or(self.mass_scale)
    }

    /// Options handed to [`msr_dataset::Dataset::open`].
    pub fn dataset_options(&self) -> DatasetOptions {
        DatasetOptions { format: self.table_format, timestep_scale: self.timestep_scale }
    }

    /// Reject settings no reactor can run with.
    ///
    /// # Errors
    /// [`AgentError::Config`] naming the first offending field.
    pub fn validate(&self) -> AgentResult<()> {
        positive("core_size", self.core_size)?;
        if let Some(b) = self.blanket_size {
            positive("blanket_size", b)?;
        }
        non_negative("fill_tank_size", self.fill_tank_size)?;
        if let Some(w) = self.waste_tank_size {
            non_negative("waste_tank_size", w)?;
        }
        if let Some(f) = self.fissile_tank_size {
            non_negative("fissile_tank_size", f)?;
        }
        positive("mass_scale", self.mass_scale)?;
        if let Some(b) = self.blanket_mass_scale {
            positive("blanket_mass_scale", b)?;
        }
        positive("timestep_scale", self.timestep_scale)?;
        if self.init_fuel == self.fill {
            return Err(AgentError::Config(format!(
                "init_fuel and fill must be different commodities, both are {:?}",
                self.fill.as_str()
            )));
        }
        if self.waste == self.fissile_out {
            return Err(AgentError::Config(format!(
                "waste and fissile_out must be different commodities, both are {:?}",
                self.waste.as_str()
            )));
        }
        if self.final_fuel.as_ref().is_some_and(|c| *c == self.waste || *c == self.fissile_out) {
            return Err(AgentError::Config(
                "final_fuel must differ from waste and fissile_out".to_owned(),
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, v: f64) -> AgentResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(AgentError::Config(format!("{field} must be a positive number, got {v}")))
    }
}

fn non_negative(field: &str, v: f64) -> AgentResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(AgentError::Config(format!("{field} must be a non-negative number, got {v}")))
    }
}
