//! Team-outcome fields derived from the venue flag and the paired scores.

pub const TEAM_GOALS: &str = "team_goals";
pub const TEAM_CONCEDED: &str = "team_conceded";
pub const GOAL_DIFFERENCE: &str = "goal_difference";
pub const CLEAN_SHEET: &str = "clean_sheet";
pub const WIN: &str = "win";
pub const DRAW: &str = "draw";
pub const LOSS: &str = "loss";

/// Derived outcome columns, in the order they are appended to the table.
pub const OUTCOME_COLUMNS: [&str; 7] = [
    TEAM_GOALS,
    TEAM_CONCEDED,
    GOAL_DIFFERENCE,
    CLEAN_SHEET,
    WIN,
    DRAW,
    LOSS,
];

/// One row's team outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamOutcome {
    pub team_goals: f64,
    pub team_conceded: f64,
    pub goal_difference: f64,
    pub clean_sheet: f64,
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl TeamOutcome {
    /// Home side iff `venue == 1.0`. Any missing input yields `None`.
    pub fn derive(venue: Option<f64>, home: Option<f64>, away: Option<f64>) -> Option<Self> {
        let (venue, home, away) = (venue?, home?, away?);
        let (goals, conceded) = if venue == 1.0 {
            (home, away)
        } else {
            (away, home)
        };
        Some(Self {
            team_goals: goals,
            team_conceded: conceded,
            goal_difference: goals - conceded,
            clean_sheet: indicator(conceded == 0.0),
            win: indicator(goals > conceded),
            draw: indicator(goals == conceded),
            loss: indicator(goals < conceded),
        })
    }

    /// Values in [`OUTCOME_COLUMNS`] order.
    pub fn values(&self) -> [f64; 7] {
        [
            self.team_goals,
            self.team_conceded,
            self.goal_difference,
            self.clean_sheet,
            self.win,
            self.draw,
            self.loss,
        ]
    }
}

fn indicator(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Derive outcome columns for a whole table, column-major, nulls where any
/// input is missing.
pub fn derive_columns(
    venue: &[Option<f64>],
    home: &[Option<f64>],
    away: &[Option<f64>],
) -> [Vec<Option<f64>>; 7] {
    let mut out: [Vec<Option<f64>>; 7] = Default::default();
    for col in out.iter_mut() {
        col.reserve(venue.len());
    }
    for ((v, h), a) in venue.iter().zip(home).zip(away) {
        match TeamOutcome::derive(*v, *h, *a) {
            Some(outcome) => {
                for (col, value) in out.iter_mut().zip(outcome.values()) {
                    col.push(Some(value));
                }
            }
            None => {
                for col in out.iter_mut() {
                    col.push(None);
                }
            }
        }
    }
    out
}
