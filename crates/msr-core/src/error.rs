//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `MsrError` as one variant
//! where core operations can fail inside them.

use thiserror::Error;

/// The error type for `msr-core` operations.
#[derive(Debug, Error)]
pub enum MsrError {
    #[error("unknown isotope {0:?}: not present in the isotope index")]
    UnknownIsotope(String),

    #[error("isotope vector has {got} entries, index has {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `msr-core`.
pub type MsrResult<T> = Result<T, MsrError>;
