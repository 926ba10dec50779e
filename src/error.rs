//! Error types for reference-data loading and benefit calculations

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pension benefit toolkit
///
/// None of these are recovered internally; they propagate to the caller, which
/// owns any user-facing messaging.
#[derive(Debug, Error)]
pub enum PensionError {
    /// Reference file missing, unreadable, or not shaped as expected
    #[error("failed to load reference data from {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// Salary increase rate table is shorter than the service history requires
    #[error("salary increase rate index {index} out of range (table has {len} entries)")]
    RateIndexOutOfRange { index: usize, len: usize },

    /// Mortality series and improvement table disagree on dimensions
    #[error(
        "mortality factor series has {mortality_len} ages but improvement table has {improvement_columns} columns"
    )]
    DimensionMismatch {
        mortality_len: usize,
        improvement_columns: usize,
    },

    /// Age not covered by a mortality table
    #[error("age {age} outside mortality table range {min_age}..={max_age}")]
    AgeOutOfRange { age: u32, min_age: u32, max_age: u32 },

    /// Table rows and columns do not line up
    #[error("invalid table shape: {0}")]
    TableShape(String),

    /// Invalid plan configuration file
    #[error("invalid plan configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl PensionError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PensionError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PensionError>;
