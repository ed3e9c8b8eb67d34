//! Regressor capability and its backends.
//!
//! The validator and predictor only see `dyn Regressor`; backends are picked
//! by `RegressorConfig` through [`create_regressor`]. Inputs arrive already
//! scaled. A backend instance is fitted once per fold and discarded.

mod mean;
mod ridge;

pub use mean::MeanRegressor;
pub use ridge::RidgeRegressor;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use pointcast_core::ModelError;

/// A supervised regression model: fit on a feature matrix and target, then
/// predict one value per row.
pub trait Regressor: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    /// Relative contribution of each feature column, in column order.
    /// `None` when the backend has no such notion.
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Backend selection, serialized as a tagged table:
///
/// ```toml
/// [regressor]
/// kind = "ridge"
/// alpha = 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorConfig {
    /// Predicts the training mean. Baseline only.
    Mean,
    Ridge {
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_fit_intercept")]
        fit_intercept: bool,
    },
}

fn default_alpha() -> f64 {
    1.0
}

fn default_fit_intercept() -> bool {
    true
}

impl Default for RegressorConfig {
    fn default() -> Self {
        RegressorConfig::Ridge {
            alpha: default_alpha(),
            fit_intercept: default_fit_intercept(),
        }
    }
}

impl RegressorConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RegressorConfig::Mean => Ok(()),
            RegressorConfig::Ridge { alpha, .. } => {
                if !alpha.is_finite() || *alpha < 0.0 {
                    return Err(format!("ridge alpha must be finite and >= 0, got {alpha}"));
                }
                Ok(())
            }
        }
    }
}

/// Build a fresh, unfitted backend from its config.
pub fn create_regressor(config: &RegressorConfig) -> Box<dyn Regressor> {
    match config {
        RegressorConfig::Mean => Box::new(MeanRegressor::new()),
        RegressorConfig::Ridge {
            alpha,
            fit_intercept,
        } => Box::new(RidgeRegressor::new(*alpha, *fit_intercept)),
    }
}

/// Shared input checks for `fit`.
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyInput);
    }
    if y.len() != x.nrows() {
        return Err(ModelError::Backend(format!(
            "target has {} rows, features have {}",
            y.len(),
            x.nrows()
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite);
    }
    Ok(())
}
