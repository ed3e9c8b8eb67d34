//! Column-wise standard scaler: (x - mean) / std.
//!
//! Population standard deviation; zero-variance columns get scale 1 so they
//! map to 0 instead of NaN. A scaler is fitted on exactly one partition and
//! never refitted in place.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use pointcast_core::ModelError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self, ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyInput);
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite);
        }
        let mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyInput)?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = std.mapv(|s| if s < 1e-12 { 1.0 } else { s });
        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(self)
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(ModelError::NotFitted),
        };
        if x.ncols() != mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: mean.len(),
                actual: x.ncols(),
            });
        }
        Ok((x - mean) / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_columns() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();

        let std0 = (8.0f64 / 3.0).sqrt();
        assert!((z[[0, 0]] + 2.0 / std0).abs() < 1e-12);
        assert!(z[[1, 0]].abs() < 1e-12);
        // Constant column maps to zero.
        for r in 0..3 {
            assert_eq!(z[[r, 1]], 0.0);
        }
    }

    #[test]
    fn uses_training_statistics_only() {
        let train = array![[0.0], [2.0]];
        let other = array![[100.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();
        assert!(scaler.is_fitted());
        let z = scaler.transform(&other).unwrap();
        // mean 1, std 1
        assert!((z[[0, 0]] - 99.0).abs() < 1e-12);
    }

    #[test]
    fn transform_before_fit_fails() {
        let scaler = StandardScaler::new();
        assert!(!scaler.is_fitted());
        assert_eq!(
            scaler.transform(&array![[1.0]]).unwrap_err(),
            ModelError::NotFitted
        );
    }

    #[test]
    fn width_mismatch_fails() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(ModelError::ShapeMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn empty_fit_fails() {
        let mut scaler = StandardScaler::new();
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(scaler.fit(&empty), Err(ModelError::EmptyInput)));
    }
}
