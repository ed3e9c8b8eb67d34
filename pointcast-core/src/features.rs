//! FeatureBuilder: raw history table to leakage-safe feature table.
//!
//! Pipeline, per call:
//! 1. schema check (identifiers, venue, scores, role, tracked metrics)
//! 2. stable sort by (entity, period), duplicate (entity, period) rejected
//! 3. role codes mapped through the fixed [`Role`] table
//! 4. boolean columns cast to 0/1
//! 5. team outcome derived from venue flag + paired scores
//! 6. trailing aggregates for metrics, outcome fields and target
//! 7. raw per-period columns and deny-listed columns dropped
//! 8. remaining nulls in numeric columns filled with 0
//!
//! Invariant: a feature value on the row for (entity e, period p) is computed
//! only from rows of e with period < p.

use std::collections::HashSet;
use std::ops::Range;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::FeatureConfig;
use crate::error::{Error, Result, SchemaError, ValidationError};
use crate::outcome::{derive_columns, OUTCOME_COLUMNS};
use crate::roles::Role;
use crate::rolling::{feature_name, STANDARD_WINDOWS};
use crate::schema::{f64_values, i64_values, HistorySchema};

/// Builds feature tables from history tables. Holds configuration only.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    /// Validates the configuration eagerly.
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Names of every trailing-aggregate column this builder emits when the
    /// target column is present.
    pub fn rolled_feature_names(&self) -> Vec<String> {
        self.rolled_sources(true)
            .iter()
            .flat_map(|src| STANDARD_WINDOWS.iter().map(move |w| feature_name(src, w)))
            .collect()
    }

    fn rolled_sources(&self, with_target: bool) -> Vec<String> {
        let mut sources: Vec<String> = self.config.tracked_metrics.clone();
        sources.extend(OUTCOME_COLUMNS.iter().map(|s| s.to_string()));
        if with_target {
            sources.push(self.config.target.clone());
        }
        sources
    }

    /// Build the feature table. Never mutates `history`; returns nothing on
    /// error.
    pub fn build(&self, history: &DataFrame) -> Result<DataFrame> {
        HistorySchema::new(&self.config).validate(history)?;
        let cols = &self.config.columns;

        let has_target = history.schema().contains(&self.config.target);
        if !has_target {
            warn!(
                target_column = %self.config.target,
                "history has no target column, target lags skipped"
            );
        }

        let entities = i64_values(history, &cols.entity)?;
        let periods = i64_values(history, &cols.period)?;
        let order = sort_order(&entities, &periods)?;
        let sorted = history.take(&IdxCa::from_vec("idx".into(), order))?;

        let entities = i64_values(&sorted, &cols.entity)?;
        let runs = entity_runs(&entities);

        let role_codes = map_roles(&sorted, &cols.role, &entities)?;

        let venue = f64_values(&sorted, &cols.venue)?;
        let home = f64_values(&sorted, &cols.home_score)?;
        let away = f64_values(&sorted, &cols.away_score)?;
        let outcome = derive_columns(&venue, &home, &away);

        // Sources are read from the sorted table, except outcome fields which
        // only exist as vectors.
        let mut rolled: Vec<Column> = Vec::new();
        for source in self.rolled_sources(has_target) {
            let values = match OUTCOME_COLUMNS.iter().position(|c| *c == source) {
                Some(i) => outcome[i].clone(),
                None => f64_values(&sorted, &source)?,
            };
            for window in STANDARD_WINDOWS {
                let mut out = Vec::with_capacity(values.len());
                for run in &runs {
                    out.extend(window.apply(&values[run.clone()]));
                }
                let filled: Vec<f64> = out.into_iter().map(|v| v.unwrap_or(0.0)).collect();
                rolled.push(Column::new(feature_name(&source, &window).into(), filled));
            }
        }
        debug!(
            rows = sorted.height(),
            entities = runs.len(),
            rolled = rolled.len(),
            "trailing aggregates computed"
        );

        let dropped: HashSet<&str> = self
            .config
            .tracked_metrics
            .iter()
            .map(String::as_str)
            .chain(self.config.deny_list.iter().map(String::as_str))
            .chain([
                cols.venue.as_str(),
                cols.home_score.as_str(),
                cols.away_score.as_str(),
            ])
            .chain(OUTCOME_COLUMNS)
            .collect();

        let mut columns: Vec<Column> = Vec::with_capacity(sorted.width() + rolled.len());
        for column in sorted.get_columns() {
            let name = column.name().as_str();
            if dropped.contains(name) {
                continue;
            }
            if name == cols.role {
                columns.push(Column::new(cols.role.as_str().into(), role_codes.clone()));
                continue;
            }
            columns.push(fill_numeric_nulls(column)?);
        }
        columns.extend(rolled);

        Ok(DataFrame::new(columns)?)
    }
}

/// Row permutation sorting by (entity, period), stable. Fails on a repeated
/// (entity, period) pair.
fn sort_order(entities: &[i64], periods: &[i64]) -> Result<Vec<IdxSize>> {
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by_key(|&i| (entities[i], periods[i]));
    for pair in order.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if entities[a] == entities[b] && periods[a] == periods[b] {
            return Err(ValidationError::DuplicateRow {
                entity_id: entities[a],
                period_index: periods[a],
            }
            .into());
        }
    }
    Ok(order.into_iter().map(|i| i as IdxSize).collect())
}

/// Contiguous row ranges sharing one entity id (input must be sorted).
fn entity_runs(entities: &[i64]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=entities.len() {
        if i == entities.len() || entities[i] != entities[start] {
            runs.push(start..i);
            start = i;
        }
    }
    runs
}

/// Map the role column to integer codes. Accepts display labels or codes.
fn map_roles(df: &DataFrame, name: &str, entities: &[i64]) -> Result<Vec<i64>> {
    let column = df.column(name)?;
    let unmapped = |value: String, row: usize| ValidationError::UnmappedCategory {
        column: name.to_string(),
        value,
        entity_id: entities.get(row).copied(),
    };

    match column.dtype() {
        DataType::String => column
            .str()?
            .iter()
            .enumerate()
            .map(|(row, label)| match label {
                Some(l) => Role::from_label(l)
                    .map(Role::code)
                    .ok_or_else(|| Error::from(unmapped(l.to_string(), row))),
                None => Err(Error::from(unmapped("null".into(), row))),
            })
            .collect(),
        dt if dt.is_integer() => column
            .cast(&DataType::Int64)?
            .i64()?
            .iter()
            .enumerate()
            .map(|(row, code)| match code {
                Some(c) => Role::from_code(c)
                    .map(Role::code)
                    .ok_or_else(|| Error::from(unmapped(c.to_string(), row))),
                None => Err(Error::from(unmapped("null".into(), row))),
            })
            .collect(),
        other => Err(SchemaError::TypeMismatch {
            column: name.to_string(),
            expected: "role label or integer code",
            actual: other.clone(),
        }
        .into()),
    }
}

/// Booleans become 0/1 floats; numeric nulls become 0; other dtypes pass
/// through untouched.
fn fill_numeric_nulls(column: &Column) -> Result<Column> {
    let dtype = column.dtype();
    if matches!(dtype, DataType::Boolean) {
        let cast = column.cast(&DataType::Float64)?;
        let filled = cast.as_materialized_series().fill_null(FillNullStrategy::Zero)?;
        return Ok(filled.into());
    }
    if dtype.is_integer() || dtype.is_float() {
        let filled = column.as_materialized_series().fill_null(FillNullStrategy::Zero)?;
        return Ok(filled.into());
    }
    Ok(column.clone())
}
