//! Conversion between feature tables and dense model inputs.

use ndarray::{Array1, Array2};
use polars::prelude::*;

use pointcast_core::schema::{f64_values, is_value_dtype};
use pointcast_core::{Error, Result, SchemaError};

/// Every column not in `excluded`, in table order. Each must hold numeric
/// or boolean values.
pub fn feature_columns(df: &DataFrame, excluded: &[String]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if excluded.iter().any(|e| e == name) {
            continue;
        }
        if !is_value_dtype(column.dtype()) {
            return Err(Error::from(SchemaError::TypeMismatch {
                column: name.to_string(),
                expected: "numeric or boolean feature",
                actual: column.dtype().clone(),
            }));
        }
        out.push(name.to_string());
    }
    Ok(out)
}

/// Row-major `(height, columns.len())` matrix with nulls read as 0.
pub fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut x = Array2::<f64>::zeros((df.height(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        let values = f64_values(df, name)?;
        for (i, v) in values.into_iter().enumerate() {
            x[[i, j]] = v.unwrap_or(0.0);
        }
    }
    Ok(x)
}

/// Target column as a vector, nulls read as 0.
pub fn target_vector(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    Ok(f64_values(df, target)?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataFrame {
        df!(
            "element" => [1i64, 2],
            "name" => ["a", "b"],
            "minutes_last5" => [Some(90.0), None],
            "was_home" => [true, false],
        )
        .unwrap()
    }

    #[test]
    fn selects_non_excluded_columns_in_order() {
        let cols = feature_columns(&table(), &["element".into(), "name".into()]).unwrap();
        assert_eq!(cols, vec!["minutes_last5", "was_home"]);
    }

    #[test]
    fn string_feature_is_rejected() {
        let err = feature_columns(&table(), &["element".into()]).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::TypeMismatch { ref column, .. }) if column == "name"
        ));
    }

    #[test]
    fn nulls_become_zero() {
        let x = feature_matrix(&table(), &["minutes_last5".into(), "was_home".into()]).unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(x[[0, 0]], 90.0);
        assert_eq!(x[[1, 0]], 0.0);
        assert_eq!(x[[0, 1]], 1.0);
    }
}
