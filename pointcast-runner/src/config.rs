//! Serializable pipeline configuration.
//!
//! One TOML document configures the whole run. Every section is optional and
//! falls back to the defaults of the FPL history layout:
//!
//! ```toml
//! cost_column = "value"
//!
//! [features]
//! target = "total_points"
//! tracked_metrics = ["minutes", "goals_scored", "assists"]
//!
//! [validation]
//! n_folds = 5
//!
//! [regressor]
//! kind = "ridge"
//! alpha = 1.0
//!
//! [ranking]
//! role_column = "position"
//! sort_key = "derived_value_metric"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use pointcast_core::{Error, FeatureConfig, Result, ValidationError};

use crate::ranker::RankerConfig;
use crate::regressor::RegressorConfig;
use crate::validation::ValidationConfig;

/// Content-addressed identifier of a configuration.
pub type ConfigFingerprint = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column divided into predictions for the derived value metric. Tables
    /// without it are scored without the metric.
    pub cost_column: String,
    pub features: FeatureConfig,
    pub validation: ValidationConfig,
    pub regressor: RegressorConfig,
    pub ranking: RankerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cost_column: "value".into(),
            features: FeatureConfig::default(),
            validation: ValidationConfig::default(),
            regressor: RegressorConfig::default(),
            ranking: RankerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("render TOML: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        self.validation.validate()?;
        self.regressor
            .validate()
            .map_err(ValidationError::InvalidConfig)?;

        let c = &self.features.columns;
        if self.ranking.role_column != c.role {
            return Err(ValidationError::InvalidConfig(format!(
                "ranking.role_column '{}' differs from features role column '{}'",
                self.ranking.role_column, c.role
            ))
            .into());
        }
        for excluded in &self.validation.exclude {
            if self.features.tracked_metrics.contains(excluded) {
                return Err(ValidationError::InvalidConfig(format!(
                    "'{excluded}' is both excluded from validation and a tracked metric"
                ))
                .into());
            }
        }
        if self.cost_column.trim().is_empty() {
            return Err(ValidationError::InvalidConfig("cost_column is blank".into()).into());
        }
        if self.ranking.sort_key.trim().is_empty() {
            return Err(ValidationError::InvalidConfig("ranking.sort_key is blank".into()).into());
        }
        Ok(())
    }

    /// BLAKE3 over the JSON form. Equal configs share a fingerprint.
    pub fn fingerprint(&self) -> Result<ConfigFingerprint> {
        let json = serde_json::to_string(self)
            .map_err(|e| Error::Config(format!("serialize config: {e}")))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn default_renders_and_parses_back() {
        let config = PipelineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn sections_override_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [features]
            tracked_metrics = ["minutes", "threat"]

            [validation]
            n_folds = 3

            [regressor]
            kind = "mean"
            "#,
        )
        .unwrap();
        assert_eq!(config.features.tracked_metrics, vec!["minutes", "threat"]);
        assert_eq!(config.features.target, "total_points");
        assert_eq!(config.validation.n_folds, 3);
        assert_eq!(config.regressor, RegressorConfig::Mean);
        assert_eq!(config.cost_column, "value");
    }

    #[test]
    fn invalid_values_are_rejected_eagerly() {
        let err = PipelineConfig::from_toml_str("[validation]\nn_folds = 1\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidConfig(_))
        ));

        let err = PipelineConfig::from_toml_str("[regressor]\nkind = \"forest\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn mismatched_role_column_rejected() {
        let err = PipelineConfig::from_toml_str("[ranking]\nrole_column = \"pos\"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn ranking_sort_key_from_toml() {
        let config =
            PipelineConfig::from_toml_str("[ranking]\nsort_key = \"derived_value_metric\"\n")
                .unwrap();
        assert_eq!(config.ranking.sort_key, "derived_value_metric");
        assert_eq!(config.ranking.role_column, "position");

        let err = PipelineConfig::from_toml_str("[ranking]\nsort_key = \" \"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = PipelineConfig::default();
        let mut b = a.clone();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        b.validation.n_folds = 4;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }
}
