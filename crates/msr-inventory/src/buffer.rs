//! `MaterialBuffer`: a capacity-bounded FIFO of material lots.

use std::collections::VecDeque;

use msr_core::{EPS_MASS, Material};
use tracing::warn;

use crate::{BufferError, BufferResult};

/// A named store of discrete lots, consumed first-in-first-out.
///
/// Lots keep their own composition; nothing is blended until a caller
/// merges popped lots.  `0 ≤ quantity() ≤ capacity()` holds after every
/// operation.
#[derive(Clone, Debug)]
pub struct MaterialBuffer {
    name:     String,
    capacity: f64,
    quantity: f64,
    lots:     VecDeque<Material>,
}

impl MaterialBuffer {
    /// Create an empty buffer.
    ///
    /// # Errors
    /// [`BufferError::InvalidCapacity`] for negative or NaN capacities.
    /// `f64::INFINITY` is accepted and means unbounded.
    pub fn new(name: impl Into<String>, capacity: f64) -> BufferResult<Self> {
        let name = name.into();
        validate(&name, capacity)?;
        Ok(Self { name, capacity, quantity: 0.0, lots: VecDeque::new() })
    }

    /// An empty buffer without a capacity limit.
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self { name: name.into(), capacity: f64::INFINITY, quantity: 0.0, lots: VecDeque::new() }
    }

    /// Change the capacity of a buffer.
    ///
    /// # Errors
    /// Invalid capacities, or a capacity below what is already held.
    pub fn set_capacity(&mut self, capacity: f64) -> BufferResult<()> {
        validate(&self.name, capacity)?;
        if capacity + EPS_MASS < self.quantity {
            return Err(BufferError::CapacityBelowQuantity {
                buffer:   self.name.clone(),
                capacity,
                quantity: self.quantity,
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[inline]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Free space, never negative.
    #[inline]
    pub fn space(&self) -> f64 {
        (self.capacity - self.quantity).max(0.0)
    }

    /// Number of lots held.
    pub fn count(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// `true` once free space is within [`EPS_MASS`] of zero.
    pub fn is_full(&self) -> bool {
        self.space() <= EPS_MASS
    }

    /// Lots in FIFO order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.lots.iter()
    }

    /// Append a lot.
    ///
    /// Whatever does not fit is split off and returned; the buffer keeps the
    /// part that fits.  Negligible lots are dropped.
    #[must_use = "the returned lot is the part that did not fit"]
    pub fn push(&mut self, mut material: Material) -> Option<Material> {
        if material.is_negligible() {
            return None;
        }
        let space = self.space();
        if material.quantity() <= space {
            self.quantity = (self.quantity + material.quantity()).min(self.capacity);
            self.lots.push_back(material);
            return None;
        }

        warn!(
            buffer   = %self.name,
            offered  = material.quantity(),
            space,
            "push exceeds capacity; truncating"
        );
        let fitted = material.extract_qty(space);
        if !fitted.is_negligible() {
            self.quantity = (self.quantity + fitted.quantity()).min(self.capacity);
            self.lots.push_back(fitted);
        }
        Some(material)
    }

    /// Remove up to `qty` kg from the front, splitting the last lot touched.
    ///
    /// Returns the removed lots in FIFO order.  A non-positive `qty` is a
    /// no-op.
    pub fn pop(&mut self, qty: f64) -> Vec<Material> {
        let mut out = Vec::new();
        if !(qty > 0.0) {
            return out;
        }
        if qty > self.quantity + EPS_MASS {
            warn!(buffer = %self.name, requested = qty, held = self.quantity, "pop exceeds holdings; clamping");
        }
        let mut remaining = qty;
        while remaining > EPS_MASS {
            let Some(mut lot) = self.lots.pop_front() else {
                break;
            };
            if lot.quantity() <= remaining + EPS_MASS {
                remaining -= lot.quantity();
                out.push(lot);
            } else {
                out.push(lot.extract_qty(remaining));
                remaining = 0.0;
                self.lots.push_front(lot);
            }
        }
        self.resync();
        out
    }

    /// Remove up to `n` whole lots from the front.
    pub fn pop_n(&mut self, n: usize) -> Vec<Material> {
        let n = n.min(self.lots.len());
        let out: Vec<Material> = self.lots.drain(..n).collect();
        self.resync();
        out
    }

    /// Remove every lot, in FIFO order.
    pub fn pop_all(&mut self) -> Vec<Material> {
        let out: Vec<Material> = self.lots.drain(..).collect();
        self.quantity = 0.0;
        out
    }

    /// The next lot in FIFO order, without removing it.
    ///
    /// # Errors
    /// [`BufferError::Empty`] when the buffer holds nothing.
    pub fn peek(&self) -> BufferResult<&Material> {
        self.lots
            .front()
            .ok_or_else(|| BufferError::Empty(self.name.clone()))
    }

    /// Recompute the held quantity from the lots, dropping float residue.
    fn resync(&mut self) {
        self.lots.retain(|lot| !lot.is_negligible());
        self.quantity = self
            .lots
            .iter()
            .map(Material::quantity)
            .sum::<f64>()
            .clamp(0.0, self.capacity);
    }
}

fn validate(name: &str, capacity: f64) -> BufferResult<()> {
    if capacity.is_nan() || capacity < 0.0 {
        return Err(BufferError::InvalidCapacity { buffer: name.to_owned(), capacity });
    }
    Ok(())
}
