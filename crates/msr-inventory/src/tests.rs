//! Unit tests for msr-inventory.

use msr_core::{Composition, Material};

use crate::{BufferError, BufferKind, Inventory, MaterialBuffer};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn lot(qty: f64, iso: &str) -> Material {
    Material::new(qty, Composition::pure(iso))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── MaterialBuffer ────────────────────────────────────────────────────────────

#[cfg(test)]
mod buffer {
    use super::*;

    #[test]
    fn rejects_invalid_capacity() {
        assert!(matches!(
            MaterialBuffer::new("driver", -1.0),
            Err(BufferError::InvalidCapacity { .. })
        ));
        assert!(MaterialBuffer::new("driver", f64::NAN).is_err());
        assert!(MaterialBuffer::new("driver", 0.0).is_ok());
    }

    #[test]
    fn push_within_capacity() {
        let mut b = MaterialBuffer::new("waste", 10.0).unwrap();
        assert!(b.push(lot(4.0, "Xe135")).is_none());
        assert!(b.push(lot(6.0, "Cs137")).is_none());
        assert!(b.is_full());
        assert_eq!(b.count(), 2);
        assert!(close(b.quantity(), 10.0));
    }

    #[test]
    fn push_beyond_capacity_truncates() {
        let mut b = MaterialBuffer::new("driver", 5.0).unwrap();
        let overflow = b.push(lot(8.0, "U235")).unwrap();
        assert!(close(b.quantity(), 5.0));
        assert!(close(overflow.quantity(), 3.0));
        assert_eq!(overflow.composition(), &Composition::pure("U235"));
    }

    #[test]
    fn push_into_full_buffer_returns_everything() {
        let mut b = MaterialBuffer::new("driver", 1.0).unwrap();
        let _ = b.push(lot(1.0, "U235"));
        let overflow = b.push(lot(2.0, "U238")).unwrap();
        assert!(close(overflow.quantity(), 2.0));
        assert_eq!(b.count(), 1);
    }

    #[test]
    fn negligible_push_is_dropped() {
        let mut b = MaterialBuffer::unbounded("waste");
        assert!(b.push(lot(0.0, "U235")).is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn pop_is_fifo_and_splits() {
        let mut b = MaterialBuffer::unbounded("waste");
        let _ = b.push(lot(2.0, "A"));
        let _ = b.push(lot(3.0, "B"));
        let out = b.pop(3.0);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].composition(), &Composition::pure("A"));
        assert!(close(out[0].quantity(), 2.0));
        assert!(close(out[1].quantity(), 1.0));
        assert!(close(b.quantity(), 2.0));
        assert_eq!(b.peek().unwrap().composition(), &Composition::pure("B"));
    }

    #[test]
    fn pop_non_positive_is_noop() {
        let mut b = MaterialBuffer::unbounded("waste");
        let _ = b.push(lot(2.0, "A"));
        assert!(b.pop(0.0).is_empty());
        assert!(b.pop(-5.0).is_empty());
        assert!(close(b.quantity(), 2.0));
    }

    #[test]
    fn pop_more_than_held_clamps() {
        let mut b = MaterialBuffer::unbounded("waste");
        let _ = b.push(lot(2.0, "A"));
        let out = b.pop(10.0);
        assert!(close(out.iter().map(Material::quantity).sum::<f64>(), 2.0));
        assert!(b.is_empty());
        assert_eq!(b.quantity(), 0.0);
    }

    #[test]
    fn pop_n_and_pop_all() {
        let mut b = MaterialBuffer::unbounded("waste");
        for q in [1.0, 2.0, 3.0] {
            let _ = b.push(lot(q, "A"));
        }
        assert_eq!(b.pop_n(2).len(), 2);
        assert!(close(b.quantity(), 3.0));
        assert_eq!(b.pop_n(5).len(), 1);
        let _ = b.push(lot(1.0, "A"));
        assert_eq!(b.pop_all().len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn peek_empty_fails() {
        let b = MaterialBuffer::unbounded("fissile");
        assert!(matches!(b.peek(), Err(BufferError::Empty(name)) if name == "fissile"));
    }

    #[test]
    fn capacity_cannot_drop_below_holdings() {
        let mut b = MaterialBuffer::new("driver", 10.0).unwrap();
        let _ = b.push(lot(8.0, "U235"));
        assert!(matches!(
            b.set_capacity(5.0),
            Err(BufferError::CapacityBelowQuantity { .. })
        ));
        b.set_capacity(20.0).unwrap();
        assert!(close(b.space(), 12.0));
    }
}

#[cfg(test)]
mod buffer_props {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Push(f64),
        Pop(f64),
        PopN(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0..50.0f64).prop_map(Op::Push),
            (-5.0..50.0f64).prop_map(Op::Pop),
            (0usize..4).prop_map(Op::PopN),
        ]
    }

    proptest! {
        #[test]
        fn quantity_stays_within_bounds(
            capacity in 0.0..100.0f64,
            ops in proptest::collection::vec(arb_op(), 1..40),
        ) {
            let mut b = MaterialBuffer::new("driver", capacity).unwrap();
            for op in ops {
                match op {
                    Op::Push(q) => { let _ = b.push(lot(q, "U235")); }
                    Op::Pop(q)  => { b.pop(q); }
                    Op::PopN(n) => { b.pop_n(n); }
                }
                prop_assert!(b.quantity() >= 0.0);
                prop_assert!(b.quantity() <= b.capacity());
                let held: f64 = b.iter().map(Material::quantity).sum();
                prop_assert!((held - b.quantity()).abs() < 1e-6);
            }
        }
    }
}

// ── Inventory ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod inventory {
    use super::*;

    fn core(driver: f64, blanket: f64) -> Inventory {
        let mut inv = Inventory::new();
        inv.set_capacity(BufferKind::Driver, driver).unwrap();
        inv.set_capacity(BufferKind::Blanket, blanket).unwrap();
        inv.track(BufferKind::Driver);
        inv.track(BufferKind::Blanket);
        inv
    }

    #[test]
    fn buffers_are_independent() {
        let mut inv = core(10.0, 5.0);
        let _ = inv.get_mut(BufferKind::Waste).push(lot(3.0, "Xe135"));
        assert!(close(inv.get(BufferKind::Waste).quantity(), 3.0));
        assert_eq!(inv.get(BufferKind::Driver).quantity(), 0.0);
        assert_eq!(inv.get(BufferKind::Fill).name(), "fill");
    }

    #[test]
    fn core_full_requires_every_core_buffer() {
        let mut inv = core(10.0, 5.0);
        assert!(!inv.core_full());
        let _ = inv.get_mut(BufferKind::Driver).push(lot(10.0, "U235"));
        assert!(!inv.core_full());
        let _ = inv.get_mut(BufferKind::Blanket).push(lot(5.0, "U238"));
        assert!(inv.core_full());
        assert!(close(inv.core_quantity(), 15.0));
    }

    #[test]
    fn no_core_is_never_full() {
        assert!(!Inventory::new().core_full());
    }

    #[test]
    fn track_is_idempotent() {
        let mut inv = core(1.0, 1.0);
        inv.track(BufferKind::Driver);
        assert_eq!(inv.core_kinds(), [BufferKind::Driver, BufferKind::Blanket]);
        assert!(inv.is_core(BufferKind::Blanket));
        assert!(!inv.is_core(BufferKind::Waste));
    }

    #[test]
    fn distribute_fills_in_order() {
        let mut inv = core(10.0, 5.0);
        let _ = inv.get_mut(BufferKind::Blanket).push(lot(3.0, "U238"));
        let left = inv
            .distribute(&[BufferKind::Blanket, BufferKind::Driver], lot(20.0, "Th232"))
            .unwrap();
        assert!(inv.get(BufferKind::Blanket).is_full());
        assert!(inv.get(BufferKind::Driver).is_full());
        assert!(close(left.quantity(), 8.0));
    }

    #[test]
    fn distribute_everything_fits() {
        let mut inv = core(10.0, 5.0);
        assert!(inv.distribute(&[BufferKind::Driver], lot(4.0, "U235")).is_none());
    }

    #[test]
    fn levels_cover_all_buffers() {
        let inv = core(10.0, 5.0);
        let levels = inv.levels();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0].kind, BufferKind::Driver);
        assert_eq!(levels[0].capacity, 10.0);
        assert!(levels[2].capacity.is_infinite());
    }
}
