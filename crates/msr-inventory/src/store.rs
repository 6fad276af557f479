//! The reactor's buffer set, keyed by an explicit enum.

use std::fmt;

use msr_core::Material;

use crate::{BufferResult, MaterialBuffer};

/// The closed set of buffers a reactor owns.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BufferKind {
    /// Driver salt in the core.
    Driver,
    /// Blanket salt in the core (two-region cores).
    Blanket,
    /// Waste awaiting pickup.
    Waste,
    /// Surplus fissile material awaiting pickup.
    Fissile,
    /// Fill material received but not yet moved into the core.
    Fill,
}

impl BufferKind {
    pub const ALL: [BufferKind; 5] = [
        BufferKind::Driver,
        BufferKind::Blanket,
        BufferKind::Waste,
        BufferKind::Fissile,
        BufferKind::Fill,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BufferKind::Driver  => "driver",
            BufferKind::Blanket => "blanket",
            BufferKind::Waste   => "waste",
            BufferKind::Fissile => "fissile",
            BufferKind::Fill    => "fill",
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Point-in-time level of one buffer, for reporting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InventoryLevel {
    pub kind:     BufferKind,
    pub quantity: f64,
    pub capacity: f64,
    pub lots:     usize,
}

/// One `MaterialBuffer` per [`BufferKind`], plus the subset that makes up
/// the core.
///
/// The core buffers are the ones whose fullness decides activation.
#[derive(Clone, Debug)]
pub struct Inventory {
    buffers: [MaterialBuffer; 5],
    core:    Vec<BufferKind>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// All buffers unbounded, no core buffers.
    pub fn new() -> Self {
        Self {
            buffers: BufferKind::ALL.map(|k| MaterialBuffer::unbounded(k.name())),
            core:    Vec::new(),
        }
    }

    /// Set the capacity of one buffer.
    ///
    /// # Errors
    /// Propagates [`MaterialBuffer::set_capacity`] failures.
    pub fn set_capacity(&mut self, kind: BufferKind, capacity: f64) -> BufferResult<()> {
        self.get_mut(kind).set_capacity(capacity)
    }

    /// Mark `kind` as a core buffer.  Idempotent.
    pub fn track(&mut self, kind: BufferKind) {
        if !self.core.contains(&kind) {
            self.core.push(kind);
        }
    }

    pub fn core_kinds(&self) -> &[BufferKind] {
        &self.core
    }

    pub fn is_core(&self, kind: BufferKind) -> bool {
        self.core.contains(&kind)
    }

    pub fn get(&self, kind: BufferKind) -> &MaterialBuffer {
        &self.buffers[kind.slot()]
    }

    pub fn get_mut(&mut self, kind: BufferKind) -> &mut MaterialBuffer {
        &mut self.buffers[kind.slot()]
    }

    /// `true` when there is at least one core buffer and all of them are full.
    pub fn core_full(&self) -> bool {
        !self.core.is_empty() && self.core.iter().all(|&k| self.get(k).is_full())
    }

    /// Total mass held in the core buffers.
    pub fn core_quantity(&self) -> f64 {
        self.core.iter().map(|&k| self.get(k).quantity()).sum()
    }

    /// Pour `material` into the buffers in `order`, each up to its free
    /// space.  Returns what is left over, if anything.
    pub fn distribute(&mut self, order: &[BufferKind], mut material: Material) -> Option<Material> {
        for &kind in order {
            if material.is_negligible() {
                return None;
            }
            let buffer = self.get_mut(kind);
            let space = buffer.space();
            if buffer.is_full() {
                continue;
            }
            let part = material.extract_qty(space);
            // `part` fits by construction.
            let _ = buffer.push(part);
        }
        (!material.is_negligible()).then_some(material)
    }

    /// Levels of every buffer, in [`BufferKind::ALL`] order.
    pub fn levels(&self) -> Vec<InventoryLevel> {
        BufferKind::ALL
            .iter()
            .map(|&kind| {
                let b = self.get(kind);
                InventoryLevel {
                    kind,
                    quantity: b.quantity(),
                    capacity: b.capacity(),
                    lots:     b.count(),
                }
            })
            .collect()
    }
}
