use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a dataset from opening.
///
/// All variants are fatal: a reactor whose dataset fails to open cannot
/// activate.
#[derive(Debug, Error)]
pub enum DatasetOpenError {
    #[error("cannot read {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is missing required table {0:?}")]
    MissingTable(&'static str),

    #[error("table {table:?} row {row} has {got} columns, isotope index has {expected}")]
    Shape {
        table:    &'static str,
        row:      usize,
        expected: usize,
        got:      usize,
    },

    #[error("dataset parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] msr_core::MsrError),
}

pub type DatasetResult<T> = Result<T, DatasetOpenError>;
