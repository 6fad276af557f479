//! Dataset loader.
//!
//! # Directory format
//!
//! A dataset is a directory holding one CSV file per named table:
//!
//! ```text
//! my_run/
//!   iso_names.csv        header `isotope`; one name per row, column order
//!   siminfo.csv          header `key,value`; `timestep` in days (required),
//!                        `table_format` = cumulative | incremental (optional)
//!   waste.csv            ┐
//!   fissile.csv          │ required; headerless, one row per dataset step,
//!   driver_refill.csv    ┘ one column per isotope
//!   blanket_refill.csv   two-region cores only
//!   driver_core.csv      optional in-core compositions (final discharge)
//!   blanket_core.csv
//! ```
//!
//! Example `siminfo.csv`:
//!
//! ```csv
//! key,value
//! timestep,3
//! table_format,cumulative
//! ```
//!
//! The `timestep` value may be quoted; it is parsed after trimming.
//!
//! # Cumulative datasets
//!
//! Some producers store running totals.  Flow tables of such datasets are
//! converted to per-step deltas exactly once, here; the rest of the crate
//! only ever sees incremental tables.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use msr_core::{IsotopeIndex, IsotopeVector, MsrError};

use crate::{DatasetOpenError, DatasetResult, TableId, TimeSeriesTable};

const SECS_PER_DAY: f64 = 86_400.0;

// ── Options ───────────────────────────────────────────────────────────────────

/// How flow tables are stored on disk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Read `table_format` from `siminfo.csv`; incremental if absent.
    #[default]
    Auto,
    /// Rows are running totals.
    Cumulative,
    /// Rows are per-step amounts.
    Incremental,
}

impl TableFormat {
    fn parse(s: &str) -> DatasetResult<TableFormat> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cumulative"  => Ok(TableFormat::Cumulative),
            "incremental" => Ok(TableFormat::Incremental),
            other => Err(DatasetOpenError::Parse(format!(
                "invalid table_format {other:?}: expected \"cumulative\" or \"incremental\""
            ))),
        }
    }
}

/// Caller-side knobs for [`Dataset::open`].
#[derive(Clone, Debug)]
pub struct DatasetOptions {
    /// Overrides the format recorded in the dataset unless `Auto`.
    pub format: TableFormat,
    /// Multiplier applied to the dataset step duration.
    pub timestep_scale: f64,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self { format: TableFormat::Auto, timestep_scale: 1.0 }
    }
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IsotopeRecord {
    isotope: String,
}

#[derive(Deserialize)]
struct SimInfoRecord {
    key:   String,
    value: String,
}

struct SimInfo {
    timestep_days: f64,
    format:        Option<TableFormat>,
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// A loaded reactor dataset.
///
/// Owned by the reactor from activation until it is dropped.  All tables are
/// incremental and immutable.
#[derive(Clone, Debug)]
pub struct Dataset {
    root:      Option<PathBuf>,
    isotopes:  IsotopeIndex,
    step_secs: f64,
    format:    TableFormat,
    tables:    BTreeMap<TableId, TimeSeriesTable>,
}

impl Dataset {
    /// Open the dataset directory at `path`.
    ///
    /// # Errors
    /// [`DatasetOpenError`] if the directory or a required table is missing,
    /// a file cannot be read or parsed, or a table row does not match the
    /// isotope index width.
    pub fn open(path: &Path, options: &DatasetOptions) -> DatasetResult<Dataset> {
        let meta = std::fs::metadata(path).map_err(|source| DatasetOpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(DatasetOpenError::Io {
                path:   path.to_path_buf(),
                source: std::io::Error::other("dataset path is not a directory"),
            });
        }

        let isotopes = read_isotopes(open_file(path, "iso_names")?)?;
        let info = read_siminfo(open_file(path, "siminfo")?)?;

        let mut tables = BTreeMap::new();
        for id in TableId::ALL {
            let file = path.join(format!("{}.csv", id.file_stem()));
            if !file.exists() {
                if id.is_required() {
                    return Err(DatasetOpenError::MissingTable(id.file_stem()));
                }
                continue;
            }
            let reader = File::open(&file)
                .map_err(|source| DatasetOpenError::Io { path: file.clone(), source })?;
            tables.insert(id, read_table(reader, id, isotopes.len())?);
        }

        let format = match options.format {
            TableFormat::Auto => info.format.unwrap_or(TableFormat::Incremental),
            explicit          => explicit,
        };
        let step_secs = info.timestep_days * SECS_PER_DAY * options.timestep_scale;

        let mut dataset = Dataset::from_tables(isotopes, step_secs, format, tables)?;
        dataset.root = Some(path.to_path_buf());

        info!(
            path      = %path.display(),
            isotopes  = dataset.isotopes.len(),
            valid_len = dataset.valid_len(),
            step_secs = dataset.step_secs,
            format    = ?dataset.format,
            "dataset opened"
        );
        Ok(dataset)
    }

    /// Assemble a dataset from in-memory tables.
    ///
    /// `format` describes how the flow tables are stored; cumulative flow
    /// tables are converted to increments here.  Useful for testing and for
    /// producers that hand over tables directly.
    pub fn from_tables(
        isotopes:  IsotopeIndex,
        step_secs: f64,
        format:    TableFormat,
        tables:    BTreeMap<TableId, TimeSeriesTable>,
    ) -> DatasetResult<Dataset> {
        if !(step_secs.is_finite() && step_secs > 0.0) {
            return Err(DatasetOpenError::Parse(format!(
                "dataset step duration must be positive, got {step_secs} s"
            )));
        }
        for id in TableId::ALL {
            if id.is_required() && !tables.contains_key(&id) {
                return Err(DatasetOpenError::MissingTable(id.file_stem()));
            }
        }
        for (id, table) in &tables {
            if table.width() != isotopes.len() {
                return Err(DatasetOpenError::Shape {
                    table:    id.file_stem(),
                    row:      0,
                    expected: isotopes.len(),
                    got:      table.width(),
                });
            }
        }

        let format = match format {
            TableFormat::Auto => TableFormat::Incremental,
            f                 => f,
        };
        let tables = if format == TableFormat::Cumulative {
            tables
                .into_iter()
                .map(|(id, t)| {
                    if id.is_flow() {
                        debug!(table = %id, rows = t.len(), valid = t.valid_len(), "differencing cumulative table");
                        (id, t.to_incremental())
                    } else {
                        (id, t)
                    }
                })
                .collect()
        } else {
            tables
        };

        Ok(Dataset { root: None, isotopes, step_secs, format, tables })
    }

    /// Directory the dataset was read from, if it came from disk.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn isotopes(&self) -> &IsotopeIndex {
        &self.isotopes
    }

    /// Length of one dataset step in seconds.
    pub fn step_secs(&self) -> f64 {
        self.step_secs
    }

    /// The on-disk format of the flow tables (never `Auto`).
    pub fn format(&self) -> TableFormat {
        self.format
    }

    pub fn table(&self, id: TableId) -> Option<&TimeSeriesTable> {
        self.tables.get(&id)
    }

    pub fn has_table(&self, id: TableId) -> bool {
        self.tables.contains_key(&id)
    }

    /// Number of dataset steps carrying data: the longest populated prefix
    /// across all flow tables.
    pub fn valid_len(&self) -> usize {
        self.tables
            .iter()
            .filter(|(id, _)| id.is_flow())
            .map(|(_, t)| t.valid_len())
            .max()
            .unwrap_or(0)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open_file(root: &Path, stem: &'static str) -> DatasetResult<File> {
    let path = root.join(format!("{stem}.csv"));
    if !path.exists() {
        return Err(DatasetOpenError::MissingTable(stem));
    }
    File::open(&path).map_err(|source| DatasetOpenError::Io { path, source })
}

fn read_isotopes<R: Read>(reader: R) -> DatasetResult<IsotopeIndex> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let names = csv_reader
        .deserialize::<IsotopeRecord>()
        .map(|r| r.map(|rec| rec.isotope))
        .collect::<Result<Vec<_>, _>>()?;
    if names.is_empty() {
        return Err(DatasetOpenError::Parse("iso_names has no isotopes".into()));
    }
    Ok(IsotopeIndex::new(names)?)
}

fn read_siminfo<R: Read>(reader: R) -> DatasetResult<SimInfo> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut timestep_days = None;
    let mut format = None;

    for result in csv_reader.deserialize::<SimInfoRecord>() {
        let rec = result?;
        match rec.key.as_str() {
            "timestep" => {
                let raw = rec.value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
                let days = raw.parse::<f64>().map_err(|_| {
                    DatasetOpenError::Parse(format!("invalid timestep {raw:?}: expected days as a number"))
                })?;
                timestep_days = Some(days);
            }
            "table_format" => format = Some(TableFormat::parse(&rec.value)?),
            _ => {} // unknown keys are informational
        }
    }

    let timestep_days = timestep_days
        .ok_or_else(|| DatasetOpenError::Parse("siminfo has no \"timestep\" entry".into()))?;
    Ok(SimInfo { timestep_days, format })
}

/// Parse one headerless table whose rows must be `width` wide.
pub(crate) fn read_table<R: Read>(
    reader: R,
    id:     TableId,
    width:  usize,
) -> DatasetResult<TimeSeriesTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.len() != width {
            return Err(DatasetOpenError::Shape {
                table: id.file_stem(),
                row,
                expected: width,
                got: record.len(),
            });
        }
        let values = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                field.parse::<f64>().map_err(|_| {
                    DatasetOpenError::Parse(format!(
                        "table {id} row {row} column {col}: invalid number {field:?}"
                    ))
                })
            })
            .collect::<DatasetResult<Vec<f64>>>()?;
        rows.push(IsotopeVector(values));
    }

    TimeSeriesTable::new(width, rows).map_err(|e| match e {
        MsrError::LengthMismatch { expected, got } => DatasetOpenError::Shape {
            table: id.file_stem(),
            row: 0,
            expected,
            got,
        },
        other => DatasetOpenError::Core(other),
    })
}
