//! Deterministic synthetic history tables.
//!
//! Developer-only: used by tests, benches and `pointcast run --synthetic`.
//! Each entity gets a latent skill; metrics and points are noisy functions of
//! that skill so a regressor has something to learn. Identical configs give
//! identical tables.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FeatureConfig;
use crate::error::Result;
use crate::roles::Role;

/// Shape of a synthetic history table.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub entities: usize,
    pub periods: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            entities: 40,
            periods: 12,
            seed: 42,
        }
    }
}

/// Build a history table using the column names and tracked metrics of
/// `features`. Extra columns: `value` (cost), `name`, `team`.
pub fn synthetic_history(shape: &SyntheticConfig, features: &FeatureConfig) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(shape.seed);
    let rows = shape.entities * shape.periods;
    let cols = &features.columns;

    let mut entity = Vec::with_capacity(rows);
    let mut period = Vec::with_capacity(rows);
    let mut venue = Vec::with_capacity(rows);
    let mut home = Vec::with_capacity(rows);
    let mut away = Vec::with_capacity(rows);
    let mut role = Vec::with_capacity(rows);
    let mut cost = Vec::with_capacity(rows);
    let mut name = Vec::with_capacity(rows);
    let mut team = Vec::with_capacity(rows);
    let mut points = Vec::with_capacity(rows);
    let mut metrics: Vec<Vec<f64>> = vec![Vec::with_capacity(rows); features.tracked_metrics.len()];

    for e in 0..shape.entities {
        let skill: f64 = rng.gen_range(0.0..1.0);
        let entity_role = Role::ALL[e % 4];
        let entity_cost = (40.0 + skill * 80.0).round();
        let entity_team = format!("T{:02}", e % 20);
        for p in 0..shape.periods {
            let is_home = rng.gen_bool(0.5);
            let scored: i64 = rng.gen_range(0..4);
            let conceded: i64 = rng.gen_range(0..4);
            let (h, a) = if is_home {
                (scored, conceded)
            } else {
                (conceded, scored)
            };

            let mut total = 1.0 + 2.0 * skill;
            for (m, values) in metrics.iter_mut().enumerate() {
                let weight = 1.0 / (m as f64 + 1.0);
                let v = (skill * 3.0 * weight + rng.gen_range(0.0..1.0)).max(0.0);
                total += v * weight;
                values.push(v);
            }
            if conceded == 0 && entity_role <= Role::Defender {
                total += 4.0;
            }
            total += rng.gen_range(-1.0..1.0);

            entity.push(e as i64 + 1);
            period.push(p as i64 + 1);
            venue.push(is_home);
            home.push(h);
            away.push(a);
            role.push(entity_role.label());
            cost.push(entity_cost);
            name.push(format!("Player {}", e + 1));
            team.push(entity_team.clone());
            points.push(total.round());
        }
    }

    let mut columns = vec![
        Column::new(cols.entity.as_str().into(), entity),
        Column::new(cols.period.as_str().into(), period),
        Column::new(cols.venue.as_str().into(), venue),
        Column::new(cols.home_score.as_str().into(), home),
        Column::new(cols.away_score.as_str().into(), away),
        Column::new(cols.role.as_str().into(), role),
        Column::new("value".into(), cost),
        Column::new("name".into(), name),
        Column::new("team".into(), team),
    ];
    for (metric, values) in features.tracked_metrics.iter().zip(metrics) {
        columns.push(Column::new(metric.as_str().into(), values));
    }
    columns.push(Column::new(features.target.as_str().into(), points));

    Ok(DataFrame::new(columns)?)
}
