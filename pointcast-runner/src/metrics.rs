//! Regression metrics. Pure functions: actuals and predictions in, scalar out.

use serde::{Deserialize, Serialize};

/// Scores of one validation fold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoldMetrics {
    pub fold_index: usize,
    pub train_rows: usize,
    pub validation_rows: usize,
    /// Highest period in the training partition.
    pub train_max_period: i64,
    /// Lowest period in the validation partition.
    pub validation_min_period: i64,
    pub mae: f64,
    pub r2: f64,
}

/// Mean absolute error. Returns 0.0 for empty input.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination: 1 - SS_res / SS_tot.
///
/// A constant target has SS_tot = 0: the score is 1.0 for a perfect fit and
/// 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(actual);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot < 1e-15 {
        return if ss_res < 1e-15 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
