//! Scoring a new period with the model fitted on all training rows.

use polars::prelude::*;
use tracing::debug;

use pointcast_core::schema::{f64_values, is_value_dtype};
use pointcast_core::{Error, Result, SchemaError};

use crate::matrix::feature_matrix;
use crate::regressor::Regressor;
use crate::scaler::StandardScaler;

/// Model prediction for the row.
pub const PREDICTED_TARGET: &str = "predicted_target";
/// Prediction per cost unit: `predicted / (cost / 10)`.
pub const DERIVED_VALUE_METRIC: &str = "derived_value_metric";
/// Copy of the realized target, when the scored table carries it.
pub const ACTUAL_TARGET: &str = "actual_target";

/// A fitted scaler and regressor together with the exact feature layout
/// they were trained on.
#[derive(Debug)]
pub struct Predictor {
    feature_columns: Vec<String>,
    excluded: Vec<String>,
    target: String,
    cost_column: Option<String>,
    scaler: StandardScaler,
    model: Box<dyn Regressor>,
}

impl Predictor {
    pub(crate) fn new(
        feature_columns: Vec<String>,
        excluded: Vec<String>,
        target: String,
        cost_column: Option<String>,
        scaler: StandardScaler,
        model: Box<dyn Regressor>,
    ) -> Self {
        Self {
            feature_columns,
            excluded,
            target,
            cost_column,
            scaler,
            model,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn regressor_name(&self) -> &str {
        self.model.name()
    }

    /// Returns a copy of `table` with prediction columns appended.
    ///
    /// The table's non-excluded columns must be exactly the training
    /// features (in any order).
    pub fn score(&self, table: &DataFrame) -> Result<DataFrame> {
        self.check_feature_set(table)?;

        let x = feature_matrix(table, &self.feature_columns)?;
        let scaled = self
            .scaler
            .transform(&x)
            .map_err(|e| Error::model(None, e))?;
        let predicted = self
            .model
            .predict(&scaled)
            .map_err(|e| Error::model(None, e))?
            .to_vec();

        let mut out = table.clone();
        if let Some(cost) = self
            .cost_column
            .as_deref()
            .filter(|c| table.schema().contains(c))
        {
            let costs = f64_values(table, cost)?;
            let derived: Vec<Option<f64>> = predicted
                .iter()
                .zip(costs)
                .map(|(p, c)| match c {
                    Some(c) if c > 0.0 => Some(p / (c / 10.0)),
                    _ => None,
                })
                .collect();
            out.with_column(Column::new(DERIVED_VALUE_METRIC.into(), derived))?;
        }
        if table.schema().contains(&self.target) {
            let actual = f64_values(table, &self.target)?;
            out.with_column(Column::new(ACTUAL_TARGET.into(), actual))?;
        }
        out.with_column(Column::new(PREDICTED_TARGET.into(), predicted))?;

        debug!(rows = out.height(), "scored period");
        Ok(out)
    }

    fn check_feature_set(&self, table: &DataFrame) -> Result<()> {
        let candidates: Vec<String> = table
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .filter(|c| !self.excluded.contains(c))
            .collect();

        let missing: Vec<String> = self
            .feature_columns
            .iter()
            .filter(|c| !candidates.contains(c))
            .cloned()
            .collect();
        let unexpected: Vec<String> = candidates
            .iter()
            .filter(|c| !self.feature_columns.contains(c))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(SchemaError::FeatureSetMismatch {
                missing,
                unexpected,
            }
            .into());
        }

        for name in &self.feature_columns {
            let column = table.column(name)?;
            if !is_value_dtype(column.dtype()) {
                return Err(SchemaError::TypeMismatch {
                    column: name.clone(),
                    expected: "numeric or boolean feature",
                    actual: column.dtype().clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}
