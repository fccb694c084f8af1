// src/models/stats.rs

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::config::SCORE_BUCKETS;

/// Window applied to attempts before aggregating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    #[default]
    All,
}

impl TimeRange {
    /// Length of the window, `None` for unbounded.
    pub fn window(self) -> Option<TimeDelta> {
        match self {
            TimeRange::Week => Some(TimeDelta::days(7)),
            TimeRange::Month => Some(TimeDelta::days(30)),
            TimeRange::All => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    #[serde(rename = "timeRange", alias = "time_range", default)]
    pub time_range: TimeRange,
    pub lang: Option<String>,
}

/// Dashboard analytics for one quiz. Derived on demand, never stored.
///
/// Scores and rates are percentages in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_attempts: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub pass_rate: f64,
    /// Counts for `[0,20)`, `[20,40)`, `[40,60)`, `[60,80)`, `[80,100]`.
    pub score_distribution: [usize; SCORE_BUCKETS],
    /// `YYYY-MM-DD`, ascending, one entry per day of the window.
    pub attempt_dates: Vec<String>,
    pub attempts_per_day: Vec<usize>,
    /// 1-based question numbers, parallel to `question_success_rates`.
    pub question_numbers: Vec<usize>,
    pub question_success_rates: Vec<f64>,
    pub question_details: Vec<QuestionDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub question: String,
    pub success_rate: f64,
    pub common_wrong_answer: Option<String>,
}
