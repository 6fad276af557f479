//! `Material`: one lot: a quantity with a single composition.

use crate::{Composition, EPS_MASS, IsotopeMap};

/// A discrete batch of material.
///
/// Quantity is in kilograms and never negative.  Lots only change
/// composition through [`absorb`][Self::absorb].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    quantity:    f64,
    composition: Composition,
}

impl Material {
    /// Create a lot.  Negative or NaN quantities are clamped to zero.
    pub fn new(quantity: f64, composition: Composition) -> Self {
        Self { quantity: quantity.max(0.0), composition }
    }

    /// Create a lot from sparse per-isotope masses.
    ///
    /// The lot's quantity is the map's total mass.  Returns `None` for an
    /// empty or non-positive map so callers never create zero-mass lots.
    pub fn from_isotope_map(masses: &IsotopeMap) -> Option<Self> {
        let composition = Composition::from_masses(masses)?;
        Some(Self::new(masses.mass(), composition))
    }

    #[inline]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    #[inline]
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// `true` if the lot is lighter than [`EPS_MASS`].
    #[inline]
    pub fn is_negligible(&self) -> bool {
        self.quantity <= EPS_MASS
    }

    /// Per-isotope masses of this lot.
    pub fn masses(&self) -> IsotopeMap {
        self.composition.masses(self.quantity)
    }

    /// Merge `other` into `self`; the composition becomes the mass-weighted
    /// blend of both lots.
    pub fn absorb(&mut self, other: Material) {
        self.composition = self
            .composition
            .blend(self.quantity, &other.composition, other.quantity);
        self.quantity += other.quantity;
    }

    /// Split off up to `qty` kg with the same composition.
    ///
    /// The returned lot holds `min(qty, self.quantity())`; non-positive
    /// requests return an empty lot and leave `self` untouched.
    pub fn extract_qty(&mut self, qty: f64) -> Material {
        if !(qty > 0.0) {
            return Material::new(0.0, self.composition.clone());
        }
        let taken = qty.clamp(0.0, self.quantity);
        self.quantity -= taken;
        if self.quantity < EPS_MASS {
            // Fold rounding residue into the extracted lot.
            let residue = self.quantity;
            self.quantity = 0.0;
            return Material::new(taken + residue, self.composition.clone());
        }
        Material::new(taken, self.composition.clone())
    }
}
