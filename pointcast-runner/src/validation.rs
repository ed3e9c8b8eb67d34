//! Expanding-window validation of a regressor over a feature table.
//!
//! Rows are ordered by period and split into `k` folds of growing training
//! windows, each followed by an equally sized validation window. Every fold
//! gets its own scaler and its own regressor, fitted on training rows only.
//! After the folds, one more scaler/regressor pair is fitted on all rows and
//! returned as the [`Predictor`].

use ndarray::{s, Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pointcast_core::schema::i64_values;
use pointcast_core::{Error, FeatureConfig, Result, SchemaError, ValidationError};

use crate::matrix::{feature_columns, feature_matrix, target_vector};
use crate::metrics::{mean_absolute_error, mean_f64, r2_score, FoldMetrics};
use crate::predictor::Predictor;
use crate::regressor::{create_regressor, Regressor, RegressorConfig};
use crate::scaler::StandardScaler;

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of folds (default 5).
    pub n_folds: usize,
    /// Columns kept in the table but never used as features, on top of the
    /// entity, period and target columns.
    pub exclude: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            n_folds: 5,
            exclude: vec!["name".into(), "team".into()],
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_folds < 2 {
            return Err(ValidationError::InvalidConfig(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            ))
            .into());
        }
        Ok(())
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Row ranges of one fold over the period-ordered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSpec {
    pub fold_index: usize,
    /// Training start row (inclusive). Always 0: windows expand.
    pub train_start: usize,
    /// Training end row (exclusive).
    pub train_end: usize,
    /// Validation start row (inclusive).
    pub validation_start: usize,
    /// Validation end row (exclusive).
    pub validation_end: usize,
}

impl FoldSpec {
    pub fn train_rows(&self) -> usize {
        self.train_end - self.train_start
    }

    pub fn validation_rows(&self) -> usize {
        self.validation_end - self.validation_start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Cross-validation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvReport {
    pub run_id: String,
    pub regressor: String,
    pub feature_columns: Vec<String>,
    pub folds: Vec<FoldMetrics>,
    pub mean_mae: f64,
    pub mean_r2: f64,
    /// Averaged over folds, sorted descending. Empty when the backend has
    /// no importances.
    pub feature_importance: Vec<FeatureImportance>,
}

#[derive(Debug)]
pub struct ValidationOutcome {
    pub report: CvReport,
    pub predictor: Predictor,
}

// ─── Fold layout ─────────────────────────────────────────────────────

/// Expanding folds over `n_rows` period-ordered rows.
///
/// Validation windows have `n_rows / (k + 1)` rows; fold `i` trains on
/// `[0, n - (k - i) * t)` and validates on the next `t` rows, so the last
/// fold ends exactly at `n_rows`.
pub fn create_folds(n_rows: usize, k: usize) -> Result<Vec<FoldSpec>> {
    if k < 2 {
        return Err(ValidationError::InvalidConfig(format!(
            "n_folds must be at least 2, got {k}"
        ))
        .into());
    }
    let t = n_rows / (k + 1);
    if t == 0 {
        return Err(Error::InsufficientData {
            fold: 0,
            train_rows: n_rows,
            validation_rows: 0,
        });
    }
    Ok((0..k)
        .map(|i| {
            let train_end = n_rows - (k - i) * t;
            FoldSpec {
                fold_index: i,
                train_start: 0,
                train_end,
                validation_start: train_end,
                validation_end: train_end + t,
            }
        })
        .collect())
}

/// Fails unless every training period is ≤ every validation period.
pub fn check_temporal_order(fold: &FoldSpec, periods: &[i64]) -> Result<(i64, i64)> {
    let train = &periods[fold.train_start..fold.train_end];
    let validation = &periods[fold.validation_start..fold.validation_end];
    let (Some(&train_max), Some(&validation_min)) = (train.iter().max(), validation.iter().min())
    else {
        return Err(Error::InsufficientData {
            fold: fold.fold_index,
            train_rows: train.len(),
            validation_rows: validation.len(),
        });
    };
    if train_max > validation_min {
        return Err(Error::InvariantViolation {
            fold: fold.fold_index,
            train_max_period: train_max,
            validation_min_period: validation_min,
        });
    }
    Ok((train_max, validation_min))
}

// ─── Validator ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Validator {
    entity: String,
    period: String,
    target: String,
    cost_column: Option<String>,
    config: ValidationConfig,
    regressor: RegressorConfig,
}

impl Validator {
    pub fn new(
        features: &FeatureConfig,
        config: ValidationConfig,
        regressor: RegressorConfig,
    ) -> Result<Self> {
        config.validate()?;
        regressor
            .validate()
            .map_err(ValidationError::InvalidConfig)?;
        Ok(Self {
            entity: features.columns.entity.clone(),
            period: features.columns.period.clone(),
            target: features.target.clone(),
            cost_column: None,
            config,
            regressor,
        })
    }

    /// Column the predictor divides predictions by (after scaling by 1/10)
    /// to get the derived value metric.
    pub fn with_cost_column(mut self, column: impl Into<String>) -> Self {
        self.cost_column = Some(column.into());
        self
    }

    /// Identifier, target and configured exclusions.
    pub fn excluded_columns(&self) -> Vec<String> {
        let mut excluded = vec![
            self.entity.clone(),
            self.period.clone(),
            self.target.clone(),
        ];
        for c in &self.config.exclude {
            if !excluded.contains(c) {
                excluded.push(c.clone());
            }
        }
        excluded
    }

    pub fn run(&self, features: &DataFrame) -> Result<ValidationOutcome> {
        for name in [&self.entity, &self.period, &self.target] {
            if !features.schema().contains(name) {
                return Err(SchemaError::MissingColumn(name.clone()).into());
            }
        }
        let excluded = self.excluded_columns();
        let columns = feature_columns(features, &excluded)?;
        if columns.is_empty() {
            return Err(ValidationError::InvalidConfig(
                "feature table has no feature columns".into(),
            )
            .into());
        }

        let ordered = order_by_period(features, &self.period, &self.entity)?;
        let periods = i64_values(&ordered, &self.period)?;
        let x = feature_matrix(&ordered, &columns)?;
        let y = target_vector(&ordered, &self.target)?;

        let folds = create_folds(ordered.height(), self.config.n_folds)?;
        let bounds = folds
            .iter()
            .map(|f| check_temporal_order(f, &periods))
            .collect::<Result<Vec<_>>>()?;

        let mut fold_metrics = Vec::with_capacity(folds.len());
        let mut importance_sum: Option<Array1<f64>> = Some(Array1::zeros(columns.len()));
        for (fold, (train_max, validation_min)) in folds.iter().zip(bounds) {
            info!(
                fold = fold.fold_index,
                "training up to period {train_max}, validating from period {validation_min}"
            );
            let (metrics, importances) = self.run_fold(fold, &x, &y, train_max, validation_min)?;
            debug!(
                fold = fold.fold_index,
                mae = metrics.mae,
                r2 = metrics.r2,
                "fold scored"
            );
            importance_sum = match (importance_sum, importances) {
                (Some(sum), Some(imp)) => Some(sum + imp),
                _ => None,
            };
            fold_metrics.push(metrics);
        }

        let mean_mae = mean_f64(&fold_metrics.iter().map(|m| m.mae).collect::<Vec<_>>());
        let mean_r2 = mean_f64(&fold_metrics.iter().map(|m| m.r2).collect::<Vec<_>>());
        let feature_importance = match importance_sum {
            Some(sum) => rank_importances(&columns, sum / folds.len() as f64),
            None => Vec::new(),
        };

        let predictor = self.fit_final(&columns, &x, &y)?;
        let report = CvReport {
            run_id: self.run_id(&columns, ordered.height()),
            regressor: predictor.regressor_name().to_string(),
            feature_columns: columns,
            folds: fold_metrics,
            mean_mae,
            mean_r2,
            feature_importance,
        };

        info!(
            folds = report.folds.len(),
            mean_mae = report.mean_mae,
            mean_r2 = report.mean_r2,
            "cross-validation complete"
        );
        for (rank, fi) in report.feature_importance.iter().take(10).enumerate() {
            info!(rank = rank + 1, feature = %fi.feature, importance = fi.importance, "top feature");
        }

        Ok(ValidationOutcome { report, predictor })
    }

    fn run_fold(
        &self,
        fold: &FoldSpec,
        x: &Array2<f64>,
        y: &Array1<f64>,
        train_max_period: i64,
        validation_min_period: i64,
    ) -> Result<(FoldMetrics, Option<Array1<f64>>)> {
        let i = fold.fold_index;
        let x_train = x.slice(s![fold.train_start..fold.train_end, ..]).to_owned();
        let y_train = y.slice(s![fold.train_start..fold.train_end]).to_owned();
        let x_val = x
            .slice(s![fold.validation_start..fold.validation_end, ..])
            .to_owned();
        let y_val = y.slice(s![fold.validation_start..fold.validation_end]);

        let mut scaler = StandardScaler::new();
        let x_train = scaler
            .fit_transform(&x_train)
            .map_err(|e| Error::model(Some(i), e))?;
        let x_val = scaler
            .transform(&x_val)
            .map_err(|e| Error::model(Some(i), e))?;

        let mut model = create_regressor(&self.regressor);
        model
            .fit(&x_train, &y_train)
            .map_err(|e| Error::model(Some(i), e))?;
        let predicted = model.predict(&x_val).map_err(|e| Error::model(Some(i), e))?;

        let actual = y_val.to_vec();
        let predicted = predicted.to_vec();
        let metrics = FoldMetrics {
            fold_index: i,
            train_rows: fold.train_rows(),
            validation_rows: fold.validation_rows(),
            train_max_period,
            validation_min_period,
            mae: mean_absolute_error(&actual, &predicted),
            r2: r2_score(&actual, &predicted),
        };
        Ok((metrics, model.feature_importances()))
    }

    fn fit_final(&self, columns: &[String], x: &Array2<f64>, y: &Array1<f64>) -> Result<Predictor> {
        let mut scaler = StandardScaler::new();
        let scaled = scaler
            .fit_transform(x)
            .map_err(|e| Error::model(None, e))?;
        let mut model: Box<dyn Regressor> = create_regressor(&self.regressor);
        model.fit(&scaled, y).map_err(|e| Error::model(None, e))?;
        Ok(Predictor::new(
            columns.to_vec(),
            self.excluded_columns(),
            self.target.clone(),
            self.cost_column.clone(),
            scaler,
            model,
        ))
    }

    fn run_id(&self, columns: &[String], n_rows: usize) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(format!("{:?}", self.config).as_bytes());
        hasher.update(format!("{:?}", self.regressor).as_bytes());
        for c in columns {
            hasher.update(c.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&(n_rows as u64).to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

/// Stable sort by (period, entity).
fn order_by_period(df: &DataFrame, period: &str, entity: &str) -> Result<DataFrame> {
    let periods = i64_values(df, period)?;
    let entities = i64_values(df, entity)?;
    let mut order: Vec<usize> = (0..df.height()).collect();
    order.sort_by_key(|&i| (periods[i], entities[i]));
    let idx = IdxCa::from_vec(
        "idx".into(),
        order.into_iter().map(|i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

fn rank_importances(columns: &[String], mean: Array1<f64>) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = columns
        .iter()
        .zip(mean.iter())
        .map(|(c, &v)| FeatureImportance {
            feature: c.clone(),
            importance: v,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}
