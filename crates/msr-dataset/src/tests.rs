//! Unit tests for msr-dataset.

use std::collections::BTreeMap;
use std::path::Path;

use msr_core::IsotopeIndex;

use crate::{TableId, TimeSeriesTable};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn index(names: &[&str]) -> IsotopeIndex {
    IsotopeIndex::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
}

fn table(rows: Vec<Vec<f64>>) -> TimeSeriesTable {
    let width = rows.first().map_or(0, Vec::len);
    TimeSeriesTable::from_rows(width, rows).unwrap()
}

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

/// Minimal valid two-isotope dataset on disk.
fn write_dataset(dir: &Path, siminfo: &str) {
    write(dir, "iso_names.csv", "isotope\nU235\nXe135\n");
    write(dir, "siminfo.csv", siminfo);
    write(dir, "waste.csv", "0,1\n0,2\n0,3\n0,0\n");
    write(dir, "fissile.csv", "1,0\n1,0\n1,0\n0,0\n");
    write(dir, "driver_refill.csv", "-1,0\n-1,0\n-1,0\n0,0\n");
}

// ── TimeSeriesTable ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tables {
    use super::*;
    use crate::StepWindow;

    #[test]
    fn ragged_rows_rejected() {
        assert!(TimeSeriesTable::from_rows(2, vec![vec![1.0, 2.0], vec![1.0]]).is_err());
    }

    #[test]
    fn last_valid_row_skips_trailing_zero_rows() {
        let t = table(vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 2.0], vec![0.0, 0.0]]);
        assert_eq!(t.last_valid_row(), Some(2));
        assert_eq!(t.valid_len(), 3);
    }

    #[test]
    fn all_zero_table_has_no_valid_rows() {
        let t = table(vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(t.last_valid_row(), None);
        assert_eq!(t.valid_len(), 0);
        assert!(t.to_incremental().is_empty());
    }

    #[test]
    fn to_incremental_differences_and_truncates() {
        let cumulative = table(vec![
            vec![1.0, 10.0],
            vec![3.0, 10.0],
            vec![6.0, 15.0],
            vec![0.0, 0.0], // unpopulated
        ]);
        let inc = cumulative.to_incremental();
        assert_eq!(inc.len(), 3);
        assert_eq!(inc.row(0).unwrap().as_slice(), &[1.0, 10.0]);
        assert_eq!(inc.row(1).unwrap().as_slice(), &[2.0, 0.0]);
        assert_eq!(inc.row(2).unwrap().as_slice(), &[3.0, 5.0]);
    }

    #[test]
    fn window_sum_clips_to_table() {
        let t = table(vec![vec![1.0], vec![2.0], vec![4.0]]);
        assert_eq!(t.window_sum(StepWindow::new(0, 2)).mass(), 3.0);
        assert_eq!(t.window_sum(StepWindow::new(1, 10)).mass(), 6.0);
        assert_eq!(t.window_sum(StepWindow::new(3, 5)).mass(), 0.0);
        assert_eq!(t.window_sum(StepWindow::new(2, 2)).mass(), 0.0);
    }

    #[test]
    fn id_classification() {
        assert!(TableId::Waste.is_required());
        assert!(!TableId::BlanketRefill.is_required());
        assert!(TableId::BlanketRefill.is_flow());
        assert!(!TableId::DriverCore.is_flow());
        assert_eq!(TableId::DriverRefill.to_string(), "driver_refill");
    }
}

#[cfg(test)]
mod table_props {
    use proptest::prelude::*;

    use super::*;
    use crate::StepWindow;

    /// Cumulative tables whose rows are all populated (no all-zero rows).
    fn arb_cumulative() -> impl Strategy<Value = TimeSeriesTable> {
        (1usize..5, 1usize..12).prop_flat_map(|(width, len)| {
            proptest::collection::vec(
                proptest::collection::vec(0.1..100.0f64, width),
                len,
            )
            .prop_map(move |increments| {
                let inc = TimeSeriesTable::from_rows(width, increments).unwrap();
                inc.to_cumulative()
            })
        })
    }

    proptest! {
        #[test]
        fn prefix_sum_of_increments_restores_cumulative(cum in arb_cumulative()) {
            let inc = cum.to_incremental();
            let last = cum.last_valid_row().unwrap();
            for k in 0..=last {
                let restored = inc.window_sum(StepWindow::new(0, k + 1));
                let original = cum.row(k).unwrap();
                for (a, b) in restored.as_slice().iter().zip(original.as_slice()) {
                    prop_assert!((a - b).abs() <= 1e-9 * (1.0 + b.abs()));
                }
            }
        }
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;
    use crate::{Dataset, DatasetOpenError, DatasetOptions, TableFormat};

    #[test]
    fn opens_incremental_dataset() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,3\n");

        let ds = Dataset::open(dir.path(), &DatasetOptions::default()).unwrap();
        assert_eq!(ds.isotopes().names(), ["U235", "Xe135"]);
        assert_eq!(ds.step_secs(), 3.0 * 86_400.0);
        assert_eq!(ds.format(), TableFormat::Incremental);
        assert_eq!(ds.table(TableId::Waste).unwrap().len(), 4);
        assert!(!ds.has_table(TableId::BlanketRefill));
        assert_eq!(ds.valid_len(), 3);
        assert_eq!(ds.root(), Some(dir.path()));
    }

    #[test]
    fn quoted_timestep_and_scale() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,\" 2.5 \"\n");
        let opts = DatasetOptions { timestep_scale: 10.0, ..DatasetOptions::default() };
        let ds = Dataset::open(dir.path(), &opts).unwrap();
        assert_eq!(ds.step_secs(), 2.5 * 86_400.0 * 10.0);
    }

    #[test]
    fn sniffs_cumulative_format() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,1\ntable_format,cumulative\n");
        let ds = Dataset::open(dir.path(), &DatasetOptions::default()).unwrap();
        assert_eq!(ds.format(), TableFormat::Cumulative);
        // waste column 2 cumulative 1,2,3 → increments 1,1,1, trailing zero row dropped.
        let waste = ds.table(TableId::Waste).unwrap();
        assert_eq!(waste.len(), 3);
        assert!(waste.rows().iter().all(|r| r.as_slice() == [0.0, 1.0]));
    }

    #[test]
    fn explicit_format_overrides_siminfo() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,1\ntable_format,cumulative\n");
        let opts = DatasetOptions { format: TableFormat::Incremental, ..DatasetOptions::default() };
        let ds = Dataset::open(dir.path(), &opts).unwrap();
        assert_eq!(ds.table(TableId::Waste).unwrap().len(), 4);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = Dataset::open(Path::new("/definitely/not/here"), &DatasetOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasetOpenError::Io { .. }));
    }

    #[test]
    fn missing_required_table() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,1\n");
        std::fs::remove_file(dir.path().join("fissile.csv")).unwrap();
        let err = Dataset::open(dir.path(), &DatasetOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetOpenError::MissingTable("fissile")));
    }

    #[test]
    fn missing_timestep() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\nreactor,msbr\n");
        let err = Dataset::open(dir.path(), &DatasetOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetOpenError::Parse(_)));
    }

    #[test]
    fn non_positive_timestep() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,0\n");
        assert!(Dataset::open(dir.path(), &DatasetOptions::default()).is_err());
    }

    #[test]
    fn wrong_row_width() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,1\n");
        write(dir.path(), "waste.csv", "0,1\n0,1,2\n");
        let err = Dataset::open(dir.path(), &DatasetOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DatasetOpenError::Shape { table: "waste", row: 1, expected: 2, got: 3 }
        ));
    }

    #[test]
    fn bad_number() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "key,value\ntimestep,1\n");
        write(dir.path(), "fissile.csv", "1,abc\n");
        let err = Dataset::open(dir.path(), &DatasetOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetOpenError::Parse(_)));
    }

    #[test]
    fn from_tables_checks_width() {
        let mut tables = BTreeMap::new();
        tables.insert(TableId::Waste, table(vec![vec![1.0]]));
        tables.insert(TableId::Fissile, table(vec![vec![1.0, 0.0]]));
        tables.insert(TableId::DriverRefill, table(vec![vec![1.0, 0.0]]));
        let err = Dataset::from_tables(index(&["a", "b"]), 1.0, TableFormat::Incremental, tables)
            .unwrap_err();
        assert!(matches!(err, DatasetOpenError::Shape { table: "waste", .. }));
    }
}

// ── Timestep mapper ───────────────────────────────────────────────────────────

#[cfg(test)]
mod mapper {
    use msr_core::Tick;
    use proptest::prelude::*;

    use crate::{StepCursor, StepWindow, TimestepMapper};

    #[test]
    fn sentinel_before_activation() {
        let m = TimestepMapper::new(10.0, 10, 5);
        assert_eq!(m.upper_bound(Tick(3), None), None);
    }

    #[test]
    fn empty_dataset_has_no_index() {
        let m = TimestepMapper::new(10.0, 10, 0);
        assert_eq!(m.upper_bound(Tick(3), Some(Tick(0))), None);
    }

    #[test]
    fn floor_then_exclusive_bound() {
        // Host steps of 25 s over dataset steps of 10 s.
        let m = TimestepMapper::new(10.0, 25, 100);
        let a = Some(Tick(4));
        assert_eq!(m.upper_bound(Tick(4), a), Some(1)); // elapsed 0
        assert_eq!(m.upper_bound(Tick(5), a), Some(3)); // elapsed 25 → row 2
        assert_eq!(m.upper_bound(Tick(6), a), Some(6)); // elapsed 50 → row 5
    }

    #[test]
    fn clamped_to_last_valid_row() {
        let m = TimestepMapper::new(1.0, 100, 5);
        assert_eq!(m.upper_bound(Tick(9), Some(Tick(0))), Some(5));
    }

    #[test]
    fn cursor_tiles_without_overlap() {
        let mut c = StepCursor::new();
        assert_eq!(c.last_consumed(), None);
        assert_eq!(c.advance(2), StepWindow::new(0, 2));
        assert_eq!(c.advance(2), StepWindow::new(2, 2));
        assert!(c.advance(1).is_empty()); // never moves backwards
        assert_eq!(c.position(), 2);
        assert_eq!(c.advance(5).len(), 3);
        assert_eq!(c.last_consumed(), Some(4));
    }

    proptest! {
        #[test]
        fn upper_bound_is_monotone(
            step in 1.0..1.0e7f64,
            host in 1u32..3_000_000,
            len in 1usize..500,
            activated in 0u64..20,
            t in 0u64..200,
        ) {
            let m = TimestepMapper::new(step, host, len);
            let a = Some(Tick(activated));
            let now = Tick(activated + t);
            let here = m.upper_bound(now, a).unwrap();
            let next = m.upper_bound(now + 1, a).unwrap();
            prop_assert!(here <= next);
            prop_assert!(next <= len);
            prop_assert!(here >= 1);
        }
    }
}
