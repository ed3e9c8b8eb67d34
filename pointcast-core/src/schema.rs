//! History table contract and typed column access.
//!
//! The history table must carry the identifier, venue, score and role columns
//! named in [`FeatureConfig`] plus every tracked metric. Value columns may be
//! any numeric or boolean dtype; they are read as `f64`.

use polars::prelude::*;

use crate::config::FeatureConfig;
use crate::error::{Error, Result, SchemaError};

/// Column requirements derived from a [`FeatureConfig`].
pub struct HistorySchema<'a> {
    config: &'a FeatureConfig,
}

impl<'a> HistorySchema<'a> {
    pub fn new(config: &'a FeatureConfig) -> Self {
        Self { config }
    }

    /// Columns that must be present, in the order they are checked.
    pub fn required_columns(&self) -> Vec<&'a str> {
        let c = &self.config.columns;
        let mut cols = vec![
            c.entity.as_str(),
            c.period.as_str(),
            c.venue.as_str(),
            c.home_score.as_str(),
            c.away_score.as_str(),
            c.role.as_str(),
        ];
        cols.extend(self.config.tracked_metrics.iter().map(String::as_str));
        cols
    }

    /// Validate presence and dtypes. The first offending column is reported.
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        let schema = df.schema();

        for name in self.required_columns() {
            if !schema.contains(name) {
                return Err(SchemaError::MissingColumn(name.to_string()).into());
            }
        }

        let c = &self.config.columns;
        for name in [c.entity.as_str(), c.period.as_str()] {
            expect_dtype(df, name, "integer", |dt| dt.is_integer())?;
        }

        let value_columns = [c.venue.as_str(), c.home_score.as_str(), c.away_score.as_str()]
            .into_iter()
            .chain(self.config.tracked_metrics.iter().map(String::as_str));
        for name in value_columns {
            expect_dtype(df, name, "numeric or boolean", is_value_dtype)?;
        }

        if schema.contains(&self.config.target) {
            expect_dtype(df, &self.config.target, "numeric or boolean", is_value_dtype)?;
        }

        Ok(())
    }
}

/// Numeric or boolean: anything that reads cleanly as `f64`.
pub fn is_value_dtype(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float() || matches!(dtype, DataType::Boolean)
}

fn expect_dtype(
    df: &DataFrame,
    name: &str,
    expected: &'static str,
    accept: impl Fn(&DataType) -> bool,
) -> Result<()> {
    let dtype = df.column(name)?.dtype();
    if accept(dtype) {
        Ok(())
    } else {
        Err(SchemaError::TypeMismatch {
            column: name.to_string(),
            expected,
            actual: dtype.clone(),
        }
        .into())
    }
}

/// Read a value column as nullable `f64`.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| SchemaError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.iter().collect())
}

/// Read an identifier column as `i64`. Nulls are a schema violation.
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let column = df
        .column(name)
        .map_err(|_| SchemaError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::Int64)?;
    cast.i64()?
        .iter()
        .map(|v| {
            v.ok_or_else(|| {
                Error::from(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    expected: "non-null integer",
                    actual: DataType::Null,
                })
            })
        })
        .collect()
}
