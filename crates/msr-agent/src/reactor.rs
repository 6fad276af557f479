//! `SaltReactor`: a molten-salt reactor driven by a precomputed dataset.
//!
//! The reactor does no physics.  Once its core is full, every host step it
//! reads the dataset rows covering that step and
//!
//! - pushes the waste and surplus fissile flows into their tanks,
//! - pops the refill demand out of the core regions to make room, and
//! - asks the market for that much fill material.
//!
//! Waste and fissile material leave through bids; at end of life the whole
//! core is discharged as one lot on the optional final-fuel commodity.

use msr_core::{Commodity, EPS_MASS, IsotopeIndex, IsotopeVector, Material, Tick};
use msr_dataset::{Dataset, StepCursor, StepWindow, TableId, TimestepMapper};
use msr_inventory::{BufferKind, Inventory, InventoryLevel};
use tracing::{debug, info, warn};

use crate::{
    AgentError, AgentResult, Bid, DemandRequest, Facility, Lifecycle, ReactorConfig, RequestBook,
    RequestPortfolio, SimContext, Trade, TradeResponse,
};

const TWO_REGION: [BufferKind; 2] = [BufferKind::Blanket, BufferKind::Driver];
const ONE_REGION: [BufferKind; 1] = [BufferKind::Driver];

/// The dataset-driven reactor facility.
///
/// Owns its buffers and, from [`activate`][Facility::activate] on, its
/// dataset.  See the [module docs](self) for the per-step behaviour.
#[derive(Debug)]
pub struct SaltReactor {
    config:    ReactorConfig,
    dataset:   Option<Dataset>,
    mapper:    Option<TimestepMapper>,
    cursor:    StepCursor,
    inventory: Inventory,
    lifecycle: Lifecycle,
    /// Fill demand staged by `step_begin`, cleared by `step_end`.
    demand:    Option<DemandRequest>,
    /// Merged core contents once shut down.
    discharge: Option<Material>,
}

impl SaltReactor {
    /// Build a reactor whose dataset is opened from `config.dataset_path`
    /// on activation.
    ///
    /// # Errors
    /// [`AgentError::Config`] or [`AgentError::Buffer`] for unusable settings.
    pub fn new(config: ReactorConfig) -> AgentResult<Self> {
        config.validate()?;
        let inventory = build_inventory(&config)?;
        Ok(Self {
            config,
            dataset: None,
            mapper: None,
            cursor: StepCursor::new(),
            inventory,
            lifecycle: Lifecycle::new(),
            demand: None,
            discharge: None,
        })
    }

    /// Build a reactor around an already loaded dataset.
    /// `config.dataset_path` is ignored.
    pub fn with_dataset(config: ReactorConfig, dataset: Dataset) -> AgentResult<Self> {
        let mut reactor = Self::new(config)?;
        reactor.dataset = Some(dataset);
        Ok(reactor)
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn buffers(&self) -> &Inventory {
        &self.inventory
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn cursor(&self) -> &StepCursor {
        &self.cursor
    }

    /// The fill demand staged for the current step, if any.
    pub fn demand(&self) -> Option<&DemandRequest> {
        self.demand.as_ref()
    }

    /// The final discharge lot still on hand after shutdown.
    pub fn discharge(&self) -> Option<&Material> {
        self.discharge.as_ref()
    }

    fn core_order(&self) -> &'static [BufferKind] {
        if self.config.has_blanket() { &TWO_REGION } else { &ONE_REGION }
    }

    /// Move held fill material into free core space.
    fn drain_fill_tank(&mut self) {
        if self.inventory.get(BufferKind::Fill).is_empty() {
            return;
        }
        let order = self.core_order();
        let mut kept = Vec::new();
        for lot in self.inventory.get_mut(BufferKind::Fill).pop_all() {
            if let Some(rest) = self.inventory.distribute(order, lot) {
                kept.push(rest);
            }
        }
        let tank = self.inventory.get_mut(BufferKind::Fill);
        for lot in kept {
            // Came out of this tank this call, so it fits again.
            let _ = tank.push(lot);
        }
    }

    /// Consume the dataset rows that became due at `now`.
    ///
    /// With `stage_demand` unset only the waste and fissile flows are taken;
    /// the core is left as it is and no fill is requested.
    fn process_window(&mut self, now: Tick, stage_demand: bool) -> AgentResult<()> {
        let (Some(dataset), Some(mapper)) = (self.dataset.as_ref(), self.mapper.as_ref()) else {
            return Err(AgentError::NotActivated);
        };
        let Some(upper) = mapper.upper_bound(now, self.lifecycle.activated_at()) else {
            return Ok(());
        };
        let window = self.cursor.advance(upper);
        if window.is_empty() {
            return Ok(());
        }
        debug!(tick = %now, start = window.start, end = window.end, "processing dataset window");

        let (scale, blanket_scale) = (self.config.mass_scale, self.config.blanket_scale());
        let isotopes = dataset.isotopes();

        for (table, kind, scale) in [
            (TableId::Waste, BufferKind::Waste, scale),
            (TableId::Fissile, BufferKind::Fissile, blanket_scale),
        ] {
            let Some(lot) = window_sum(dataset, table, window, scale).and_then(|v| to_lot(isotopes, &v))
            else {
                continue;
            };
            debug!(buffer = %kind, quantity = lot.quantity(), "dataset inflow");
            if let Some(lost) = self.inventory.get_mut(kind).push(lot) {
                debug!(buffer = %kind, lost = lost.quantity(), "tank full; inflow discarded");
            }
        }

        if !stage_demand {
            return Ok(());
        }

        // Refill tables store consumption as negative amounts.
        let width = isotopes.len();
        let driver = window_sum(dataset, TableId::DriverRefill, window, -scale)
            .unwrap_or_else(|| IsotopeVector::zeros(width));
        let blanket = if self.config.has_blanket() {
            window_sum(dataset, TableId::BlanketRefill, window, -blanket_scale)
                .unwrap_or_else(|| IsotopeVector::zeros(width))
        } else {
            IsotopeVector::zeros(width)
        };
        let (driver_qty, blanket_qty) = (driver.mass(), blanket.mass());
        self.inventory.get_mut(BufferKind::Driver).pop(driver_qty);
        self.inventory.get_mut(BufferKind::Blanket).pop(blanket_qty);

        let quantity = driver_qty + blanket_qty;
        if quantity > EPS_MASS {
            let mut total = driver;
            total += &blanket;
            let composition = match &self.config.fill_recipe {
                Some(recipe) => recipe.clone(),
                None => isotopes
                    .to_composition(&total)
                    .map(|(c, _)| c)
                    .unwrap_or_else(|| self.config.driver_recipe.clone()),
            };
            debug!(tick = %now, quantity, "fill demand staged");
            self.demand = Some(DemandRequest { quantity, composition });
        }
        Ok(())
    }

    /// Empty the core into a single discharge lot.
    fn stage_final_discharge(&mut self) {
        let row = self.cursor.last_consumed();
        let mut parts = Vec::new();
        for (kind, table) in [(BufferKind::Driver, TableId::DriverCore), (BufferKind::Blanket, TableId::BlanketCore)] {
            let Some(mut lot) = merge(self.inventory.get_mut(kind).pop_all()) else {
                continue;
            };
            let recorded = self
                .dataset
                .as_ref()
                .zip(row)
                .and_then(|(ds, row)| Some((ds.isotopes(), ds.table(table)?.row(row)?)))
                .and_then(|(isotopes, v)| isotopes.to_composition(v));
            if let Some((composition, _)) = recorded {
                lot = Material::new(lot.quantity(), composition);
            }
            parts.push(lot);
        }
        self.discharge = merge(parts);
        info!(
            quantity = self.discharge.as_ref().map_or(0.0, Material::quantity),
            "final discharge staged"
        );
    }

    fn initial_requests(&self) -> Vec<RequestPortfolio> {
        let mut ports = Vec::with_capacity(2);
        let driver = self.inventory.get(BufferKind::Driver).space();
        if driver > EPS_MASS {
            ports.push(RequestPortfolio::single(
                self.config.init_fuel.clone(),
                Material::new(driver, self.config.driver_recipe.clone()),
            ));
        }
        if self.config.has_blanket() {
            let blanket = self.inventory.get(BufferKind::Blanket).space();
            if blanket > EPS_MASS {
                ports.push(RequestPortfolio::single(
                    self.config.fill.clone(),
                    Material::new(blanket, self.config.blanket_recipe.clone()),
                ));
            }
        }
        ports
    }

    /// Bids against `requests` for `commodity`, served from `kind`.
    fn bid_from(&self, kind: BufferKind, requests: &RequestBook, commodity: &Commodity, out: &mut Vec<Bid>) {
        let Some(reqs) = requests.get(commodity) else {
            return;
        };
        let buffer = self.inventory.get(kind);
        let Ok(next) = buffer.peek() else {
            return;
        };
        for req in reqs {
            let qty = req.quantity.min(buffer.quantity());
            if qty > EPS_MASS {
                out.push(Bid {
                    request:   req.id,
                    commodity: commodity.clone(),
                    offer:     Material::new(qty, next.composition().clone()),
                });
            }
        }
    }
}

impl Facility for SaltReactor {
    fn activate(&mut self, ctx: &SimContext) -> AgentResult<()> {
        if self.dataset.is_none() {
            let dataset = Dataset::open(&self.config.dataset_path, &self.config.dataset_options())?;
            self.dataset = Some(dataset);
        }
        let Some(dataset) = self.dataset.as_ref() else {
            return Err(AgentError::NotActivated);
        };
        if !self.config.has_blanket() && dataset.has_table(TableId::BlanketRefill) {
            debug!("single-region core; blanket tables are ignored");
        }
        self.mapper = Some(TimestepMapper::for_dataset(dataset, ctx.tick_duration_secs));
        info!(
            tick      = %ctx.tick,
            isotopes  = dataset.isotopes().len(),
            valid_len = dataset.valid_len(),
            "reactor activated"
        );
        Ok(())
    }

    fn step_begin(&mut self, ctx: &SimContext) -> AgentResult<()> {
        if self.mapper.is_none() {
            return Err(AgentError::NotActivated);
        }
        if self.lifecycle.is_shutdown() {
            return Ok(());
        }
        let final_step = ctx.is_final_step();
        self.drain_fill_tank();
        if self.lifecycle.is_running() {
            // The last step still produces waste and fissile material but
            // requests no fill.
            self.process_window(ctx.tick, !final_step)?;
        }
        if final_step && self.lifecycle.shutdown(ctx.tick) {
            self.stage_final_discharge();
        }
        Ok(())
    }

    fn step_end(&mut self, ctx: &SimContext) -> AgentResult<()> {
        let core_full = self.inventory.core_full();
        let has_material = self.inventory.core_quantity() > EPS_MASS;
        if let Some(state) = self.lifecycle.observe_step_end(ctx.tick, core_full, has_material) {
            debug!(tick = %ctx.tick, %state, "lifecycle transition");
        }
        self.demand = None;
        Ok(())
    }

    fn collect_bids(&mut self, _ctx: &SimContext, requests: &RequestBook) -> Vec<Bid> {
        let mut bids = Vec::new();
        self.bid_from(BufferKind::Waste, requests, &self.config.waste, &mut bids);
        self.bid_from(BufferKind::Fissile, requests, &self.config.fissile_out, &mut bids);

        if let (Some(commodity), Some(lot)) = (&self.config.final_fuel, &self.discharge) {
            for req in requests.get(commodity).into_iter().flatten() {
                let qty = req.quantity.min(lot.quantity());
                if qty > EPS_MASS {
                    bids.push(Bid {
                        request:   req.id,
                        commodity: commodity.clone(),
                        offer:     Material::new(qty, lot.composition().clone()),
                    });
                }
            }
        }
        bids
    }

    fn resolve_trades(&mut self, ctx: &SimContext, trades: &[Trade]) -> Vec<TradeResponse> {
        let mut responses = Vec::with_capacity(trades.len());
        for trade in trades {
            let material = if trade.commodity == self.config.waste {
                merge(self.inventory.get_mut(BufferKind::Waste).pop(trade.quantity))
            } else if trade.commodity == self.config.fissile_out {
                merge(self.inventory.get_mut(BufferKind::Fissile).pop(trade.quantity))
            } else if self.config.final_fuel.as_ref() == Some(&trade.commodity) {
                self.discharge.as_mut().map(|lot| lot.extract_qty(trade.quantity))
            } else {
                warn!(tick = %ctx.tick, commodity = %trade.commodity, "trade for a commodity this reactor does not offer");
                None
            };
            match material.filter(|m| !m.is_negligible()) {
                Some(material) => responses.push(TradeResponse { trade: trade.clone(), material }),
                None => warn!(tick = %ctx.tick, trade = %trade.id, "nothing on hand to fulfil trade"),
            }
        }
        if self.discharge.as_ref().is_some_and(Material::is_negligible) {
            self.discharge = None;
        }
        responses
    }

    fn collect_requests(&mut self, _ctx: &SimContext) -> Vec<RequestPortfolio> {
        if self.lifecycle.is_shutdown() {
            return Vec::new();
        }
        if self.lifecycle.activated_at().is_none() {
            return self.initial_requests();
        }
        self.demand
            .as_ref()
            .map(|d| {
                RequestPortfolio::single(
                    self.config.fill.clone(),
                    Material::new(d.quantity, d.composition.clone()),
                )
            })
            .into_iter()
            .collect()
    }

    fn accept_trades(&mut self, ctx: &SimContext, responses: Vec<TradeResponse>) {
        let fill_order: &[BufferKind] = if self.config.has_blanket() {
            &[BufferKind::Blanket, BufferKind::Driver, BufferKind::Fill]
        } else {
            &[BufferKind::Driver, BufferKind::Fill]
        };
        for TradeResponse { trade, material } in responses {
            let order: &[BufferKind] = if trade.commodity == self.config.init_fuel {
                if self.lifecycle.activated_at().is_some() {
                    warn!(tick = %ctx.tick, quantity = material.quantity(), "initial fuel after activation; discarded");
                    continue;
                }
                &[BufferKind::Driver]
            } else if trade.commodity == self.config.fill {
                fill_order
            } else {
                warn!(tick = %ctx.tick, commodity = %trade.commodity, "delivery for a commodity this reactor did not request");
                continue;
            };
            debug!(tick = %ctx.tick, commodity = %trade.commodity, quantity = material.quantity(), "accepted delivery");
            if let Some(rest) = self.inventory.distribute(order, material) {
                warn!(
                    tick      = %ctx.tick,
                    commodity = %trade.commodity,
                    excess    = rest.quantity(),
                    "delivery exceeds free space; truncating"
                );
            }
        }
    }

    fn inventory(&self) -> Vec<InventoryLevel> {
        self.inventory.levels()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn build_inventory(config: &ReactorConfig) -> AgentResult<Inventory> {
    let mut inventory = Inventory::new();
    inventory.set_capacity(BufferKind::Driver, config.core_size)?;
    inventory.track(BufferKind::Driver);
    match config.blanket_size {
        Some(size) => {
            inventory.set_capacity(BufferKind::Blanket, size)?;
            inventory.track(BufferKind::Blanket);
        }
        None => inventory.set_capacity(BufferKind::Blanket, 0.0)?,
    }
    inventory.set_capacity(BufferKind::Fill, config.fill_tank_size)?;
    if let Some(size) = config.waste_tank_size {
        inventory.set_capacity(BufferKind::Waste, size)?;
    }
    if let Some(size) = config.fissile_tank_size {
        inventory.set_capacity(BufferKind::Fissile, size)?;
    }
    Ok(inventory)
}

/// Sum of `table` over `window`, times `scale`.  `None` if the dataset has
/// no such table.
fn window_sum(dataset: &Dataset, table: TableId, window: StepWindow, scale: f64) -> Option<IsotopeVector> {
    dataset.table(table).map(|t| t.window_sum(window).scaled(scale))
}

/// A lot from a dense vector, or `None` for "no material".
fn to_lot(isotopes: &IsotopeIndex, v: &IsotopeVector) -> Option<Material> {
    if v.is_zero() {
        return None;
    }
    Material::from_isotope_map(&isotopes.to_sparse(v))
}

/// Blend lots into one; `None` if there is nothing of substance.
fn merge(lots: Vec<Material>) -> Option<Material> {
    let mut lots = lots.into_iter();
    let mut merged = lots.next()?;
    for lot in lots {
        merged.absorb(lot);
    }
    (!merged.is_negligible()).then_some(merged)
}
