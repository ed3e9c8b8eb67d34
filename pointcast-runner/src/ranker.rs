//! Per-role top-N extraction from a scored table.
//!
//! Groups are emitted in role-code order. Within a group rows are sorted
//! descending by the sort key; ties keep input order and null/NaN keys sink
//! to the bottom. Roles without rows are absent from the result.

use std::cmp::Ordering;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pointcast_core::schema::{f64_values, i64_values, is_value_dtype};
use pointcast_core::{Error, Result, Role, SchemaError, ValidationError};

use crate::predictor::{ACTUAL_TARGET, DERIVED_VALUE_METRIC, PREDICTED_TARGET};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Role column: string labels or integer codes.
    pub role_column: String,
    /// Column picks are ranked by, descending.
    pub sort_key: String,
    /// Projection of each pick, in output order. Columns absent from the
    /// scored table are skipped.
    pub display_columns: Vec<String>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            role_column: "position".into(),
            sort_key: PREDICTED_TARGET.into(),
            display_columns: vec![
                "name".into(),
                "team".into(),
                "value".into(),
                PREDICTED_TARGET.into(),
                DERIVED_VALUE_METRIC.into(),
                ACTUAL_TARGET.into(),
            ],
        }
    }
}

/// Top rows of one role.
#[derive(Debug, Clone)]
pub struct CategoryPicks {
    pub role: Role,
    pub picks: DataFrame,
}

/// Serializable rendering of [`CategoryPicks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PicksTable {
    pub role: Role,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl CategoryPicks {
    pub fn to_table(&self) -> Result<PicksTable> {
        let columns: Vec<String> = self
            .picks
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        let mut rows = Vec::with_capacity(self.picks.height());
        for i in 0..self.picks.height() {
            let mut row = Vec::with_capacity(columns.len());
            for column in self.picks.get_columns() {
                row.push(json_value(column.as_materialized_series().get(i)?));
            }
            rows.push(row);
        }
        Ok(PicksTable {
            role: self.role,
            columns,
            rows,
        })
    }
}

fn json_value(value: AnyValue<'_>) -> serde_json::Value {
    use serde_json::Value;
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(v) => Value::from(v),
        AnyValue::Int16(v) => Value::from(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt8(v) => Value::from(v),
        AnyValue::UInt16(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => serde_json::Number::from_f64(f64::from(v))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(v) => serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        other => Value::String(other.to_string()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    config: RankerConfig,
}

impl Ranker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn top_n(
        &self,
        scored: &DataFrame,
        n_per_category: usize,
        sort_key: &str,
    ) -> Result<Vec<CategoryPicks>> {
        if n_per_category == 0 {
            return Err(ValidationError::InvalidConfig("n_per_category must be > 0".into()).into());
        }
        let key_column = scored
            .column(sort_key)
            .map_err(|_| SchemaError::MissingColumn(sort_key.to_string()))?;
        if !is_value_dtype(key_column.dtype()) {
            return Err(SchemaError::TypeMismatch {
                column: sort_key.to_string(),
                expected: "numeric sort key",
                actual: key_column.dtype().clone(),
            }
            .into());
        }
        let keys = f64_values(scored, sort_key)?;
        let roles = self.roles(scored)?;
        let projection = self.projection(scored, sort_key);

        let mut out = Vec::new();
        for role in Role::ALL {
            let mut rows: Vec<usize> = (0..scored.height()).filter(|&i| roles[i] == role).collect();
            if rows.is_empty() {
                debug!(role = %role, "no rows for role");
                continue;
            }
            rows.sort_by(|&a, &b| descending_nulls_last(keys[a], keys[b]));
            rows.truncate(n_per_category);

            let idx = IdxCa::from_vec(
                "idx".into(),
                rows.into_iter().map(|i| i as IdxSize).collect(),
            );
            let picks = scored.select(projection.iter().map(|c| c.as_str()))?.take(&idx)?;
            out.push(CategoryPicks { role, picks });
        }
        Ok(out)
    }

    fn roles(&self, scored: &DataFrame) -> Result<Vec<Role>> {
        let name = &self.config.role_column;
        let column = scored
            .column(name)
            .map_err(|_| SchemaError::MissingColumn(name.clone()))?;
        let unmapped = |value: String| {
            Error::from(ValidationError::UnmappedCategory {
                column: name.clone(),
                value,
                entity_id: None,
            })
        };
        match column.dtype() {
            DataType::String => column
                .str()?
                .iter()
                .map(|v| {
                    let label = v.unwrap_or("null");
                    Role::from_label(label).ok_or_else(|| unmapped(label.to_string()))
                })
                .collect(),
            dt if dt.is_integer() => i64_values(scored, name)?
                .into_iter()
                .map(|code| Role::from_code(code).ok_or_else(|| unmapped(code.to_string())))
                .collect(),
            other => Err(SchemaError::TypeMismatch {
                column: name.clone(),
                expected: "role label or integer code",
                actual: other.clone(),
            }
            .into()),
        }
    }

    fn projection(&self, scored: &DataFrame, sort_key: &str) -> Vec<String> {
        let schema = scored.schema();
        let mut cols: Vec<String> = self
            .config
            .display_columns
            .iter()
            .filter(|c| schema.contains(c))
            .cloned()
            .collect();
        if !cols.iter().any(|c| c == sort_key) {
            cols.push(sort_key.to_string());
        }
        cols
    }
}

fn descending_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|v| !v.is_nan());
    let b = b.filter(|v| !v.is_nan());
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
