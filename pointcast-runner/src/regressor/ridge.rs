//! Closed-form ridge regression.
//!
//! Solves (XᵀX + αI) w = Xᵀy on centered inputs with a Cholesky
//! factorization. The Gram matrix rows are computed in parallel.

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

use pointcast_core::ModelError;

use super::{check_fit_input, Regressor};

#[derive(Debug, Clone)]
pub struct RidgeRegressor {
    alpha: f64,
    fit_intercept: bool,
    coef: Option<Array1<f64>>,
    intercept: f64,
}

impl RidgeRegressor {
    pub fn new(alpha: f64, fit_intercept: bool) -> Self {
        Self {
            alpha,
            fit_intercept,
            coef: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coef.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegressor {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_fit_input(x, y)?;
        let p = x.ncols();

        let (x_mean, y_mean) = if self.fit_intercept {
            let xm = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyInput)?;
            let ym = y.mean().ok_or(ModelError::EmptyInput)?;
            (xm, ym)
        } else {
            (Array1::zeros(p), 0.0)
        };
        let xc = x - &x_mean;
        let yc = y - y_mean;

        let mut gram = gram_matrix(&xc);
        for i in 0..p {
            gram[[i, i]] += self.alpha;
        }
        let rhs = xc.t().dot(&yc);

        let l = cholesky(&gram)?;
        let coef = cholesky_solve(&l, &rhs);
        if coef.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Singular);
        }

        self.intercept = y_mean - x_mean.dot(&coef);
        self.coef = Some(coef);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coef = self.coef.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != coef.len() {
            return Err(ModelError::ShapeMismatch {
                expected: coef.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(coef) + self.intercept)
    }

    /// |coef| normalized to sum to 1; all zeros when every coefficient is 0.
    fn feature_importances(&self) -> Option<Array1<f64>> {
        let coef = self.coef.as_ref()?;
        let abs = coef.mapv(f64::abs);
        let total = abs.sum();
        if total > 0.0 {
            Some(abs / total)
        } else {
            Some(abs)
        }
    }
}

/// XᵀX, one row per rayon task.
fn gram_matrix(x: &Array2<f64>) -> Array2<f64> {
    let p = x.ncols();
    let rows: Vec<Vec<f64>> = (0..p)
        .into_par_iter()
        .map(|i| {
            let ci = x.column(i);
            (0..p).map(|j| ci.dot(&x.column(j))).collect()
        })
        .collect();
    let mut gram = Array2::zeros((p, p));
    for (i, row) in rows.into_iter().enumerate() {
        for (j, v) in row.into_iter().enumerate() {
            gram[[i, j]] = v;
        }
    }
    gram
}

/// Lower-triangular L with A = L Lᵀ. Fails on a non positive-definite A.
fn cholesky(a: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        let scale = a[[j, j]].abs().max(1.0);
        if diag <= 1e-12 * scale || !diag.is_finite() {
            return Err(ModelError::Singular);
        }
        let d = diag.sqrt();
        l[[j, j]] = d;
        for i in (j + 1)..n {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = s / d;
        }
    }
    Ok(l)
}

/// Solve L Lᵀ x = b by forward then backward substitution.
fn cholesky_solve(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= l[[i, k]] * z[k];
        }
        z[i] = s / l[[i, i]];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut s = z[i];
        for k in (i + 1)..n {
            s -= l[[k, i]] * x[k];
        }
        x[i] = s / l[[i, i]];
    }
    x
}
