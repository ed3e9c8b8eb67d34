//! Declared column configuration for feature building.
//!
//! Nothing is inferred from the shape of the input table: every tracked
//! metric, identifier and deny-listed column is named here and checked by
//! [`FeatureConfig::validate`] before any data is touched.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, ValidationError};
use crate::outcome::OUTCOME_COLUMNS;

/// Column names of the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub entity: String,
    pub period: String,
    pub venue: String,
    pub home_score: String,
    pub away_score: String,
    pub role: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            entity: "element".into(),
            period: "gameweek".into(),
            venue: "was_home".into(),
            home_score: "home_score".into(),
            away_score: "away_score".into(),
            role: "position".into(),
        }
    }
}

/// Configuration of a [`crate::features::FeatureBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub columns: ColumnNames,
    /// Per-period metrics that get trailing aggregates and are then dropped.
    pub tracked_metrics: Vec<String>,
    /// Outcome to forecast. Also gets trailing aggregates.
    pub target: String,
    /// Columns removed from the feature table without further use.
    pub deny_list: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            tracked_metrics: default_tracked_metrics(),
            target: "total_points".into(),
            deny_list: default_deny_list(),
        }
    }
}

impl FeatureConfig {
    /// Reject configurations that could not produce a sound feature table.
    pub fn validate(&self) -> Result<()> {
        let c = &self.columns;
        let reserved = [
            ("entity", &c.entity),
            ("period", &c.period),
            ("venue", &c.venue),
            ("home_score", &c.home_score),
            ("away_score", &c.away_score),
            ("role", &c.role),
            ("target", &self.target),
        ];
        for (what, name) in reserved {
            if name.trim().is_empty() {
                return Err(invalid(format!("{what} column name is blank")));
            }
        }

        let mut seen = HashSet::new();
        for (_, name) in reserved {
            if !seen.insert(name.as_str()) {
                return Err(invalid(format!("column '{name}' is assigned to two roles")));
            }
        }

        if self.tracked_metrics.is_empty() {
            return Err(invalid("no tracked metrics declared".into()));
        }

        let mut metrics = HashSet::new();
        for metric in &self.tracked_metrics {
            if metric.trim().is_empty() {
                return Err(invalid("blank tracked metric name".into()));
            }
            if !metrics.insert(metric.as_str()) {
                return Err(invalid(format!("tracked metric '{metric}' listed twice")));
            }
            if metric == &self.target {
                return Err(invalid(format!(
                    "target '{metric}' must not be listed as a tracked metric"
                )));
            }
            if seen.contains(metric.as_str()) {
                return Err(invalid(format!(
                    "tracked metric '{metric}' collides with an identifier column"
                )));
            }
            if OUTCOME_COLUMNS.contains(&metric.as_str()) {
                return Err(invalid(format!(
                    "tracked metric '{metric}' collides with a derived outcome column"
                )));
            }
            if self.deny_list.contains(metric) {
                return Err(invalid(format!("tracked metric '{metric}' is deny-listed")));
            }
        }

        for name in &self.deny_list {
            if name == &c.entity || name == &c.period || name == &self.target || name == &c.role {
                return Err(invalid(format!(
                    "deny list would drop required column '{name}'"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> crate::error::Error {
    ValidationError::InvalidConfig(msg).into()
}

/// Per-match player statistics of the fantasy-football dataset.
pub fn default_tracked_metrics() -> Vec<String> {
    [
        "assists",
        "bps",
        "clean_sheets",
        "creativity",
        "threat",
        "expected_assists",
        "expected_goal_involvements",
        "expected_goals",
        "expected_goals_conceded",
        "goals_conceded",
        "goals_scored",
        "ict_index",
        "influence",
        "minutes",
        "saves",
        "starts",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Identifiers and rarely populated columns that never become features.
pub fn default_deny_list() -> Vec<String> {
    [
        "xP",
        "bonus",
        "round",
        "player_id",
        "gw",
        "player_code",
        "fixture",
        "opponent_team",
        "selected",
        "modified",
        "own_goals",
        "penalties_missed",
        "red_cards",
        "yellow_cards",
        "team_h_score",
        "team_a_score",
        "home_team",
        "away_team",
        "team_id",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
