use ndarray::{Array1, Array2};

use pointcast_core::ModelError;

use super::{check_fit_input, Regressor};

/// Predicts the training-target mean for every row.
#[derive(Debug, Clone, Default)]
pub struct MeanRegressor {
    mean: Option<f64>,
    n_features: usize,
}

impl MeanRegressor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for MeanRegressor {
    fn name(&self) -> &str {
        "mean"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_fit_input(x, y)?;
        self.mean = y.mean();
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let mean = self.mean.ok_or(ModelError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        Ok(Array1::from_elem(x.nrows(), mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn predicts_training_mean() {
        let mut m = MeanRegressor::new();
        m.fit(&array![[0.0], [1.0], [2.0]], &array![1.0, 2.0, 6.0])
            .unwrap();
        let p = m.predict(&array![[9.0], [-3.0]]).unwrap();
        assert_eq!(p, array![3.0, 3.0]);
        assert!(m.feature_importances().is_none());
    }

    #[test]
    fn predict_before_fit() {
        let m = MeanRegressor::new();
        assert_eq!(m.predict(&array![[1.0]]), Err(ModelError::NotFitted));
    }
}
