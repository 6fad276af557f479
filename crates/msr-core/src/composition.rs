//! Isotope vectors and the dense ↔ sparse composition codec.
//!
//! The dataset stores material as dense per-isotope rows (`IsotopeVector`),
//! one column per entry of the `IsotopeIndex`.  Everything the host sees is
//! sparse: an `IsotopeMap` of `name → quantity` with zero entries dropped,
//! or a normalised `Composition` attached to a `Material`.
//!
//! ```text
//! IsotopeVector [0.0, 2.5, 0.0, 1.5]   +   IsotopeIndex [U233, U235, Pu239, Xe135]
//!        │ IsotopeIndex::to_sparse
//!        ▼
//! IsotopeMap { U235: 2.5, Xe135: 1.5 }    mass = 4.0
//!        │ Composition::from_masses
//!        ▼
//! Composition { U235: 0.625, Xe135: 0.375 }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::ops::{AddAssign, Neg};

use crate::{EPS_MASS, MsrError, MsrResult};

// ── IsotopeVector ─────────────────────────────────────────────────────────────

/// Dense per-isotope quantities, indexed by position in an [`IsotopeIndex`].
///
/// Demand tables store consumption as negative numbers, so entries may be
/// negative.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsotopeVector(pub Vec<f64>);

impl IsotopeVector {
    /// An all-zero vector of width `n`.
    pub fn zeros(n: usize) -> Self {
        Self(vec![0.0; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Sum of all entries.  Negative for consumption rows.
    pub fn mass(&self) -> f64 {
        self.0.iter().sum()
    }

    /// `true` if every entry is exactly zero ("no material").
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&q| q == 0.0)
    }

    /// A copy with every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.iter().map(|q| q * factor).collect())
    }

    /// Element-wise `self - other`.
    ///
    /// Both vectors must have the same width; the loader guarantees this for
    /// every table of one dataset.
    pub fn minus(&self, other: &IsotopeVector) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect())
    }
}

impl AddAssign<&IsotopeVector> for IsotopeVector {
    fn add_assign(&mut self, rhs: &IsotopeVector) {
        debug_assert_eq!(self.len(), rhs.len());
        for (a, b) in self.0.iter_mut().zip(&rhs.0) {
            *a += b;
        }
    }
}

impl Neg for IsotopeVector {
    type Output = IsotopeVector;
    fn neg(self) -> IsotopeVector {
        Self(self.0.into_iter().map(|q| -q).collect())
    }
}

impl From<Vec<f64>> for IsotopeVector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

// ── IsotopeMap ────────────────────────────────────────────────────────────────

/// Sparse `isotope name → quantity` mapping.  Iterates in name order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct IsotopeMap(pub BTreeMap<String, f64>);

impl IsotopeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all quantities.
    pub fn mass(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, isotope: &str) -> Option<f64> {
        self.0.get(isotope).copied()
    }

    pub fn insert(&mut self, isotope: impl Into<String>, quantity: f64) {
        self.0.insert(isotope.into(), quantity);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, f64)> for IsotopeMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── IsotopeIndex ──────────────────────────────────────────────────────────────

/// Ordered isotope names: position `i` names column `i` of every table.
#[derive(Clone, Debug, Default)]
pub struct IsotopeIndex {
    names:    Vec<String>,
    position: HashMap<String, usize>,
}

impl IsotopeIndex {
    /// Build an index from names in column order.
    ///
    /// # Errors
    /// Duplicate names are rejected: the sparse form could not tell the two
    /// columns apart.
    pub fn new(names: Vec<String>) -> MsrResult<Self> {
        let mut position = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if position.insert(name.clone(), i).is_some() {
                return Err(MsrError::Parse(format!("duplicate isotope name {name:?}")));
            }
        }
        Ok(Self { names, position })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, i: usize) -> Option<&str> {
        self.names.get(i).map(String::as_str)
    }

    pub fn position(&self, isotope: &str) -> Option<usize> {
        self.position.get(isotope).copied()
    }

    /// Dense → sparse.  Zero entries are omitted; negative entries are kept.
    pub fn to_sparse(&self, v: &IsotopeVector) -> IsotopeMap {
        debug_assert_eq!(v.len(), self.len());
        self.names
            .iter()
            .zip(v.as_slice())
            .filter(|&(_, &q)| q != 0.0)
            .map(|(name, &q)| (name.clone(), q))
            .collect()
    }

    /// Sparse → dense.
    ///
    /// # Errors
    /// [`MsrError::UnknownIsotope`] if the map names an isotope this index
    /// does not carry.
    pub fn to_dense(&self, m: &IsotopeMap) -> MsrResult<IsotopeVector> {
        let mut v = IsotopeVector::zeros(self.len());
        for (name, q) in m.iter() {
            let i = self
                .position(name)
                .ok_or_else(|| MsrError::UnknownIsotope(name.to_owned()))?;
            v.0[i] = q;
        }
        Ok(v)
    }

    /// Dense → normalised composition plus total mass; `None` for "no material".
    pub fn to_composition(&self, v: &IsotopeVector) -> Option<(Composition, f64)> {
        let sparse = self.to_sparse(v);
        let mass = sparse.mass();
        Composition::from_masses(&sparse).map(|c| (c, mass))
    }
}

// ── Composition ───────────────────────────────────────────────────────────────

/// Normalised mass fractions of one material lot.
///
/// Fractions sum to 1 (within rounding).  Built from relative amounts, so a
/// recipe such as `{"92235": 1}` is already a valid composition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")
)]
pub struct Composition {
    fractions: BTreeMap<String, f64>,
}

impl Composition {
    /// Normalise a sparse quantity map.
    ///
    /// Returns `None` when the total is not above [`EPS_MASS`]; such a map
    /// describes no material.
    pub fn from_masses(masses: &IsotopeMap) -> Option<Self> {
        let total = masses.mass();
        if !(total > EPS_MASS) {
            return None;
        }
        let fractions = masses
            .iter()
            .filter(|&(_, q)| q != 0.0)
            .map(|(name, q)| (name.to_owned(), q / total))
            .collect();
        Some(Self { fractions })
    }

    /// A composition made of a single isotope.
    pub fn pure(isotope: impl Into<String>) -> Self {
        let mut fractions = BTreeMap::new();
        fractions.insert(isotope.into(), 1.0);
        Self { fractions }
    }

    pub fn fraction(&self, isotope: &str) -> f64 {
        self.fractions.get(isotope).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fractions.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Per-isotope masses of `quantity` kg of this composition.
    pub fn masses(&self, quantity: f64) -> IsotopeMap {
        self.iter().map(|(k, f)| (k.to_owned(), f * quantity)).collect()
    }

    /// Mass-weighted blend of two compositions.
    pub fn blend(&self, self_qty: f64, other: &Composition, other_qty: f64) -> Composition {
        let total = self_qty + other_qty;
        if !(total > 0.0) {
            return self.clone();
        }
        let mut fractions: BTreeMap<String, f64> = BTreeMap::new();
        for (k, f) in self.iter() {
            *fractions.entry(k.to_owned()).or_default() += f * self_qty / total;
        }
        for (k, f) in other.iter() {
            *fractions.entry(k.to_owned()).or_default() += f * other_qty / total;
        }
        Composition { fractions }
    }
}

impl TryFrom<BTreeMap<String, f64>> for Composition {
    type Error = MsrError;

    fn try_from(amounts: BTreeMap<String, f64>) -> MsrResult<Self> {
        Composition::from_masses(&IsotopeMap(amounts))
            .ok_or_else(|| MsrError::Config("composition has no positive total".into()))
    }
}

impl From<Composition> for BTreeMap<String, f64> {
    fn from(c: Composition) -> Self {
        c.fractions
    }
}
