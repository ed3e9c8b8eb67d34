//! pointcast runner: model validation, scoring and ranking.
//!
//! This crate builds on `pointcast-core` to provide:
//! - Pipeline configuration (TOML, BLAKE3 fingerprint)
//! - Standard scaler and the `Regressor` capability with mean and ridge backends
//! - Expanding-window validation with per-fold scalers and models
//! - Final-model scoring of a new period with a derived value metric
//! - Per-role top-N picks
//! - End-to-end pipeline run

pub mod config;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod predictor;
pub mod ranker;
pub mod regressor;
pub mod scaler;
pub mod validation;

pub use config::{ConfigFingerprint, PipelineConfig};
pub use metrics::{mean_absolute_error, r2_score, FoldMetrics};
pub use pipeline::{Pipeline, PipelineReport};
pub use predictor::{Predictor, ACTUAL_TARGET, DERIVED_VALUE_METRIC, PREDICTED_TARGET};
pub use ranker::{CategoryPicks, PicksTable, Ranker, RankerConfig};
pub use regressor::{create_regressor, MeanRegressor, Regressor, RegressorConfig, RidgeRegressor};
pub use scaler::StandardScaler;
pub use validation::{
    check_temporal_order, create_folds, CvReport, FeatureImportance, FoldSpec, ValidationConfig,
    ValidationOutcome, Validator,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<ValidationConfig>();
        assert_sync::<ValidationConfig>();
        assert_send::<RegressorConfig>();
        assert_sync::<RegressorConfig>();
        assert_send::<RankerConfig>();
        assert_sync::<RankerConfig>();
    }

    #[test]
    fn model_types_are_send_sync() {
        assert_send::<StandardScaler>();
        assert_sync::<StandardScaler>();
        assert_send::<Box<dyn Regressor>>();
        assert_sync::<Box<dyn Regressor>>();
        assert_send::<Predictor>();
        assert_sync::<Predictor>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<CvReport>();
        assert_sync::<CvReport>();
        assert_send::<PipelineReport>();
        assert_sync::<PipelineReport>();
        assert_send::<CategoryPicks>();
        assert_sync::<CategoryPicks>();
    }

    #[test]
    fn pipeline_is_send_sync() {
        assert_send::<Pipeline>();
        assert_sync::<Pipeline>();
        assert_send::<Validator>();
        assert_sync::<Validator>();
    }
}
