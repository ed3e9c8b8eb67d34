//! Error taxonomy shared by every pointcast component.
//!
//! Every variant carries the column, entity and/or period needed to diagnose
//! the failure. Calls are all-or-nothing: an `Err` never comes with a partial
//! table.

use polars::prelude::{DataType, PolarsError};
use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "insufficient data in fold {fold}: {train_rows} training rows, {validation_rows} validation rows"
    )]
    InsufficientData {
        fold: usize,
        train_rows: usize,
        validation_rows: usize,
    },

    #[error("no rows for period {period_index}")]
    EmptyPeriod { period_index: i64 },

    #[error(
        "temporal ordering violated in fold {fold}: training reaches period {train_max_period}, validation starts at period {validation_min_period}"
    )]
    InvariantViolation {
        fold: usize,
        train_max_period: i64,
        validation_min_period: i64,
    },

    #[error("model error{}: {source}", fold_suffix(.fold))]
    Model {
        fold: Option<usize>,
        #[source]
        source: ModelError,
    },

    #[error("table error: {0}")]
    Frame(#[from] PolarsError),

    #[error("config error: {0}")]
    Config(String),
}

fn fold_suffix(fold: &Option<usize>) -> String {
    match fold {
        Some(f) => format!(" in fold {f}"),
        None => " in final model".to_string(),
    }
}

/// Missing, mistyped or unexpected columns.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}': expected {expected}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: DataType,
    },

    #[error("feature columns differ from training: missing {missing:?}, unexpected {unexpected:?}")]
    FeatureSetMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

/// Values or configuration that cannot be accepted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("column '{column}': unmapped category '{value}' (entity {entity_id:?})")]
    UnmappedCategory {
        column: String,
        value: String,
        entity_id: Option<i64>,
    },

    #[error("duplicate row for entity {entity_id} in period {period_index}")]
    DuplicateRow { entity_id: i64, period_index: i64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Failures raised by a regressor backend or the scaler feeding it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model used before fit")]
    NotFitted,

    #[error("empty input")]
    EmptyInput,

    #[error("shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("non-finite value in input")]
    NonFinite,

    #[error("singular system, try a larger regularization")]
    Singular,

    #[error("{0}")]
    Backend(String),
}

impl Error {
    /// Attach a fold index to a model failure.
    pub fn model(fold: Option<usize>, source: ModelError) -> Self {
        Error::Model { fold, source }
    }
}
