//! End-to-end run: history → features → validation → scoring → picks.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use pointcast_core::{Error, FeatureBuilder, Result};

use crate::config::PipelineConfig;
use crate::ranker::{PicksTable, Ranker};
use crate::validation::{CvReport, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub config_fingerprint: String,
    pub score_period: i64,
    pub training_rows: usize,
    pub scored_rows: usize,
    pub validation: CvReport,
    pub picks: Vec<PicksTable>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    builder: FeatureBuilder,
    validator: Validator,
    ranker: Ranker,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let builder = FeatureBuilder::new(config.features.clone())?;
        let validator = Validator::new(
            &config.features,
            config.validation.clone(),
            config.regressor.clone(),
        )?
        .with_cost_column(config.cost_column.clone());
        let ranker = Ranker::new(config.ranking.clone());
        Ok(Self {
            config,
            builder,
            validator,
            ranker,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Train on every period before `score_period`, score `score_period` and
    /// pick the top `n_per_category` rows of each role.
    pub fn run(
        &self,
        history: &DataFrame,
        score_period: i64,
        n_per_category: usize,
    ) -> Result<PipelineReport> {
        let fingerprint = self.config.fingerprint()?;
        info!(fingerprint = %fingerprint, score_period, "pipeline run");

        let table = self.builder.build(history)?;
        let (training, scoring) = self.split(&table, score_period)?;
        info!(
            training_rows = training.height(),
            scored_rows = scoring.height(),
            "feature table split"
        );

        let outcome = self.validator.run(&training)?;
        let scored = outcome.predictor.score(&scoring)?;
        let sort_key = &self.ranker.config().sort_key;
        let picks = self
            .ranker
            .top_n(&scored, n_per_category, sort_key)?
            .iter()
            .map(|p| p.to_table())
            .collect::<Result<Vec<_>>>()?;

        Ok(PipelineReport {
            config_fingerprint: fingerprint,
            score_period,
            training_rows: training.height(),
            scored_rows: scoring.height(),
            validation: outcome.report,
            picks,
        })
    }

    /// Rows strictly before `score_period`, and rows at it.
    fn split(&self, table: &DataFrame, score_period: i64) -> Result<(DataFrame, DataFrame)> {
        let period = table
            .column(&self.config.features.columns.period)?
            .as_materialized_series();
        let training = table.filter(&period.lt(score_period)?)?;
        let scoring = table.filter(&period.equal(score_period)?)?;
        if scoring.height() == 0 {
            return Err(Error::EmptyPeriod {
                period_index: score_period,
            });
        }
        if training.height() == 0 {
            return Err(Error::InsufficientData {
                fold: 0,
                train_rows: 0,
                validation_rows: 0,
            });
        }
        Ok((training, scoring))
    }
}
