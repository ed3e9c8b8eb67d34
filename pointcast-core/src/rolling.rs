//! Trailing aggregates over an entity's prior rows.
//!
//! Every function here takes the values of ONE entity in period order and
//! returns a vector of the same length where position `i` only reads
//! positions `< i`. Row `i` itself is never part of its own window.

/// A trailing window over prior rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Mean of up to `len` prior rows; needs `min_samples` non-null values.
    Mean { len: usize, min_samples: usize },
    /// Raw value of the immediately preceding row.
    Previous,
}

impl Window {
    /// Column suffix: `last5`, `last3`, `last1`.
    pub fn suffix(&self) -> String {
        match self {
            Window::Mean { len, .. } => format!("last{len}"),
            Window::Previous => "last1".to_string(),
        }
    }

    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        match *self {
            Window::Mean { len, min_samples } => trailing_mean(values, len, min_samples),
            Window::Previous => previous(values),
        }
    }
}

/// The three windows every rolled column gets: 5- and 3-row means with a
/// one-sample minimum, and the previous row's raw value.
pub const STANDARD_WINDOWS: [Window; 3] = [
    Window::Mean {
        len: 5,
        min_samples: 1,
    },
    Window::Mean {
        len: 3,
        min_samples: 1,
    },
    Window::Previous,
];

/// Feature column name for a rolled source column.
pub fn feature_name(source: &str, window: &Window) -> String {
    format!("{source}_{}", window.suffix())
}

/// Mean of the `len` rows before each position, skipping nulls.
pub fn trailing_mean(values: &[Option<f64>], len: usize, min_samples: usize) -> Vec<Option<f64>> {
    assert!(len >= 1, "window length must be >= 1");
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(len);
        let (sum, count) = values[start..i]
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if count >= min_samples.max(1) {
            out.push(Some(sum / count as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Value of the preceding row (absent for the first row).
pub fn previous(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
        out.extend_from_slice(&values[..values.len() - 1]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let a = actual.expect("expected a value");
        assert!((a - expected).abs() < 1e-3, "{a} != {expected}");
    }

    #[test]
    fn goals_example_at_sixth_period() {
        let goals = some(&[0.0, 1.0, 2.0, 0.0, 3.0, 1.0]);
        let last5 = trailing_mean(&goals, 5, 1);
        let last3 = trailing_mean(&goals, 3, 1);
        let last1 = previous(&goals);

        assert_close(last5[5], 1.2);
        assert_close(last3[5], 1.667);
        assert_eq!(last1[5], Some(3.0));
    }

    #[test]
    fn first_row_has_no_history() {
        let goals = some(&[0.0, 1.0, 2.0]);
        for window in STANDARD_WINDOWS {
            assert_eq!(window.apply(&goals)[0], None, "{window:?}");
        }
    }

    #[test]
    fn short_history_uses_available_rows() {
        let values = some(&[4.0, 2.0, 9.0]);
        let last5 = trailing_mean(&values, 5, 1);
        assert!((last5[1].unwrap() - 4.0).abs() < EPS);
        assert!((last5[2].unwrap() - 3.0).abs() < EPS);
    }

    #[test]
    fn nulls_are_skipped_in_means() {
        let values = vec![Some(2.0), None, Some(4.0), Some(100.0)];
        let last3 = trailing_mean(&values, 3, 1);
        assert_eq!(last3[1], Some(2.0));
        assert_eq!(last3[2], Some(2.0));
        assert_eq!(last3[3], Some(3.0));
    }

    #[test]
    fn all_null_window_stays_absent() {
        let values = vec![None, None, Some(1.0)];
        let last3 = trailing_mean(&values, 3, 1);
        assert_eq!(last3, vec![None, None, None]);
    }

    #[test]
    fn previous_carries_nulls_through() {
        let values = vec![Some(1.0), None, Some(3.0)];
        assert_eq!(previous(&values), vec![None, Some(1.0), None]);
    }

    #[test]
    fn changing_current_row_does_not_move_its_features() {
        let base = some(&[1.0, 2.0, 3.0, 4.0]);
        let mut mutated = base.clone();
        mutated[3] = Some(1000.0);
        for window in STANDARD_WINDOWS {
            assert_eq!(window.apply(&base)[3], window.apply(&mutated)[3]);
        }
    }

    #[test]
    fn suffixes() {
        let names: Vec<String> = STANDARD_WINDOWS
            .iter()
            .map(|w| feature_name("goals", w))
            .collect();
        assert_eq!(names, ["goals_last5", "goals_last3", "goals_last1"]);
    }

    #[test]
    fn empty_input() {
        assert!(trailing_mean(&[], 5, 1).is_empty());
        assert!(previous(&[]).is_empty());
    }
}
