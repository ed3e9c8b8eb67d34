//! End-to-end pipeline tests on synthetic histories.
//!
//! Covers:
//! 1. Report shape: folds, averages, importances, picks per role
//! 2. Determinism: same history and config give an identical report
//! 3. Fold metrics match a scaler and model fitted on that fold's training
//!    rows alone, not on the whole table
//! 4. Scoring uses only rows before the scored period

use ndarray::{s, Array1, Array2};
use polars::prelude::*;
use pointcast_core::{synthetic_history, FeatureConfig, Role, SyntheticConfig};
use pointcast_runner::{
    create_folds, create_regressor, mean_absolute_error, r2_score, FoldSpec, Pipeline,
    PipelineConfig, RegressorConfig, StandardScaler, ValidationConfig, Validator,
    PREDICTED_TARGET,
};

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.features.tracked_metrics = vec![
        "minutes".into(),
        "goals_scored".into(),
        "assists".into(),
        "threat".into(),
    ];
    config
}

fn history(config: &PipelineConfig, seed: u64) -> DataFrame {
    synthetic_history(
        &SyntheticConfig {
            entities: 24,
            periods: 10,
            seed,
        },
        &config.features,
    )
    .unwrap()
}

#[test]
fn report_has_folds_importances_and_picks() {
    let config = config();
    let report = Pipeline::new(config.clone())
        .unwrap()
        .run(&history(&config, 7), 10, 3)
        .unwrap();

    assert_eq!(report.validation.folds.len(), 5);
    assert_eq!(report.training_rows, 24 * 9);
    assert_eq!(report.scored_rows, 24);
    assert!(report.validation.mean_mae.is_finite());
    assert!(report.validation.mean_r2.is_finite());
    assert_eq!(
        report.validation.feature_importance.len(),
        report.validation.feature_columns.len()
    );
    for w in report.validation.feature_importance.windows(2) {
        assert!(w[0].importance >= w[1].importance);
    }

    // Synthetic roles cycle through the first four roles.
    let roles: Vec<Role> = report.picks.iter().map(|p| p.role).collect();
    assert_eq!(
        roles,
        vec![Role::Goalkeeper, Role::Defender, Role::Midfielder, Role::Forward]
    );
    for picks in &report.picks {
        assert_eq!(picks.rows.len(), 3);
        assert!(picks.columns.iter().any(|c| c == PREDICTED_TARGET));
        assert!(picks.columns.iter().any(|c| c == "name"));
    }
}

#[test]
fn report_is_deterministic() {
    let config = config();
    let pipeline = Pipeline::new(config.clone()).unwrap();
    let h = history(&config, 21);
    let a = pipeline.run(&h, 8, 2).unwrap();
    let b = pipeline.run(&h, 8, 2).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

/// Period-ordered table whose feature grows cubically with the period, so
/// later validation rows sit far outside the earlier training range.
fn drifting_table() -> DataFrame {
    let mut entity = Vec::new();
    let mut period = Vec::new();
    let mut x1 = Vec::new();
    let mut x2 = Vec::new();
    let mut target = Vec::new();
    for p in 1..=12i64 {
        for e in 0..3i64 {
            let a = (p * p * p) as f64 + e as f64;
            let b = ((p + 2 * e) % 5) as f64;
            entity.push(e);
            period.push(p);
            x1.push(a);
            x2.push(b);
            target.push(a.sqrt() + 0.5 * b);
        }
    }
    df!(
        "element" => entity,
        "gameweek" => period,
        "x1" => x1,
        "x2" => x2,
        "total_points" => target,
    )
    .unwrap()
}

fn fold_scores(
    regressor: &RegressorConfig,
    x: &Array2<f64>,
    y: &Array1<f64>,
    fold: &FoldSpec,
    scaler_rows: std::ops::Range<usize>,
) -> (f64, f64) {
    let train = fold.train_start..fold.train_end;
    let val = fold.validation_start..fold.validation_end;

    let mut scaler = StandardScaler::new();
    scaler
        .fit(&x.slice(s![scaler_rows, ..]).to_owned())
        .unwrap();
    let x_train = scaler
        .transform(&x.slice(s![train.clone(), ..]).to_owned())
        .unwrap();
    let x_val = scaler
        .transform(&x.slice(s![val.clone(), ..]).to_owned())
        .unwrap();

    let mut model = create_regressor(regressor);
    model
        .fit(&x_train, &y.slice(s![train]).to_owned())
        .unwrap();
    let predicted = model.predict(&x_val).unwrap().to_vec();
    let actual = y.slice(s![val]).to_vec();
    (
        mean_absolute_error(&actual, &predicted),
        r2_score(&actual, &predicted),
    )
}

#[test]
fn fold_metrics_come_from_training_rows_only() {
    let table = drifting_table();
    let regressor = RegressorConfig::Ridge {
        alpha: 10.0,
        fit_intercept: true,
    };
    let validator = Validator::new(
        &FeatureConfig::default(),
        ValidationConfig::default(),
        regressor.clone(),
    )
    .unwrap();
    let outcome = validator.run(&table).unwrap();
    assert_eq!(outcome.predictor.feature_columns(), ["x1", "x2"]);

    let column = |name: &str| -> Vec<f64> {
        table
            .column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    };
    let (x1, x2) = (column("x1"), column("x2"));
    let x = Array2::from_shape_fn((table.height(), 2), |(r, c)| if c == 0 { x1[r] } else { x2[r] });
    let y = Array1::from(column("total_points"));

    let folds = create_folds(table.height(), 5).unwrap();
    assert_eq!(outcome.report.folds.len(), folds.len());

    let mut leaky_differs = false;
    for (fold, reported) in folds.iter().zip(&outcome.report.folds) {
        let train = fold.train_start..fold.train_end;
        let (mae, r2) = fold_scores(&regressor, &x, &y, fold, train);
        assert!((reported.mae - mae).abs() < 1e-9, "fold {}", fold.fold_index);
        assert!((reported.r2 - r2).abs() < 1e-9, "fold {}", fold.fold_index);

        // Scaling with statistics of the whole table gives other scores.
        let (leaky_mae, _) = fold_scores(&regressor, &x, &y, fold, 0..table.height());
        if (leaky_mae - mae).abs() > 1e-6 {
            leaky_differs = true;
        }
    }
    assert!(leaky_differs);
}

#[test]
fn future_periods_do_not_change_the_score() {
    let config = config();
    let pipeline = Pipeline::new(config.clone()).unwrap();
    let full = history(&config, 13);

    let mask = full
        .column("gameweek")
        .unwrap()
        .as_materialized_series()
        .lt_eq(7)
        .unwrap();
    let truncated = full.filter(&mask).unwrap();

    let a = pipeline.run(&full, 7, 4).unwrap();
    let b = pipeline.run(&truncated, 7, 4).unwrap();
    assert_eq!(a.validation.folds, b.validation.folds);
    assert_eq!(a.picks, b.picks);
}
