// src/services/stats_service.rs

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{
    config::{Config, SCORE_BUCKETS},
    error::AppError,
    i18n::Localized,
    models::{
        attempt::Attempt,
        question::Question,
        quiz::Quiz,
        stats::{AggregateStats, QuestionDetail, TimeRange},
    },
    services::{attempt_service, quiz_service},
};

/// Knobs of the aggregation that come from configuration.
#[derive(Debug, Clone, Copy)]
pub struct StatsSettings {
    pub pass_threshold: f64,
    pub offset: FixedOffset,
}

impl From<&Config> for StatsSettings {
    fn from(config: &Config) -> Self {
        Self {
            pass_threshold: config.pass_threshold,
            offset: config.stats_offset,
        }
    }
}

/// Loads a quiz and its attempts from one read snapshot and aggregates them.
pub async fn compute_stats(
    pool: &SqlitePool,
    settings: StatsSettings,
    quiz_id: i64,
    range: TimeRange,
    language: &str,
) -> Result<AggregateStats, AppError> {
    let mut tx = pool.begin().await?;
    let quiz = quiz_service::load_quiz(&mut tx, quiz_id).await?;
    let attempts = attempt_service::load_attempts(&mut tx, quiz_id).await?;
    tx.commit().await?;

    tracing::debug!(
        "Aggregating {} attempts of quiz {} over {:?}",
        attempts.len(),
        quiz_id,
        range
    );
    Ok(aggregate(&quiz, &attempts, range, Utc::now(), settings, language))
}

/// Histogram bucket of a percentage: `floor(min(p, 99.999) / 20)`, so 100 lands in
/// the top bucket.
pub fn score_bucket(percentage: f64) -> usize {
    let width = 100.0 / SCORE_BUCKETS as f64;
    let clamped = percentage.clamp(0.0, 99.999);
    ((clamped / width).floor() as usize).min(SCORE_BUCKETS - 1)
}

fn passed(attempt: &Attempt, threshold: f64) -> bool {
    // Compared on the unrounded fraction so 57/100 passes a 57% threshold.
    attempt.score as f64 * 100.0 >= threshold * attempt.total as f64
}

/// Pure aggregation over already loaded data.
///
/// `now` anchors the time window and the end of the per-day series.
pub fn aggregate(
    quiz: &Quiz,
    attempts: &[Attempt],
    range: TimeRange,
    now: DateTime<Utc>,
    settings: StatsSettings,
    language: &str,
) -> AggregateStats {
    let cutoff = range.window().map(|window| now - window);
    let in_range: Vec<&Attempt> = attempts
        .iter()
        .filter(|a| cutoff.is_none_or(|c| a.submitted_at >= c))
        .collect();

    let total_attempts = in_range.len();

    let mut score_distribution = [0usize; SCORE_BUCKETS];
    for attempt in &in_range {
        score_distribution[score_bucket(attempt.percentage())] += 1;
    }

    let (average_score, highest_score, pass_rate) = if total_attempts == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let n = total_attempts as f64;
        let sum: f64 = in_range.iter().map(|a| a.percentage()).sum();
        let highest = in_range
            .iter()
            .map(|a| a.percentage())
            .fold(0.0_f64, f64::max);
        let passes = in_range
            .iter()
            .filter(|a| passed(a, settings.pass_threshold))
            .count();
        (sum / n, highest, passes as f64 / n * 100.0)
    };

    let (attempt_dates, attempts_per_day) = daily_series(&in_range, cutoff, now, settings.offset);

    let question_details: Vec<QuestionDetail> = quiz
        .questions
        .iter()
        .map(|q| question_detail(q, &in_range, language))
        .collect();

    AggregateStats {
        total_attempts,
        average_score,
        highest_score,
        pass_rate,
        score_distribution,
        attempt_dates,
        attempts_per_day,
        question_numbers: (1..=quiz.questions.len()).collect(),
        question_success_rates: question_details.iter().map(|d| d.success_rate).collect(),
        question_details,
    }
}

/// Attempts per calendar day in `offset`, zero-filled and ascending.
///
/// The series starts at the window start (or the first attempt for an unbounded
/// window) and ends today, or at the last attempt if that is later.
fn daily_series(
    attempts: &[&Attempt],
    cutoff: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> (Vec<String>, Vec<usize>) {
    let day_of = |t: DateTime<Utc>| -> NaiveDate { t.with_timezone(&offset).date_naive() };

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for attempt in attempts {
        *per_day.entry(day_of(attempt.submitted_at)).or_default() += 1;
    }

    let start = match (cutoff, per_day.keys().next()) {
        (Some(cutoff), _) => day_of(cutoff),
        (None, Some(first)) => *first,
        (None, None) => return (Vec::new(), Vec::new()),
    };
    let today = day_of(now);
    let end = per_day
        .keys()
        .next_back()
        .map_or(today, |last| (*last).max(today));

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            (
                day.format("%Y-%m-%d").to_string(),
                per_day.get(&day).copied().unwrap_or(0),
            )
        })
        .unzip()
}

fn question_detail(question: &Question, attempts: &[&Attempt], language: &str) -> QuestionDetail {
    let correct = question.correct_option_id();

    let mut right = 0usize;
    let mut wrong: BTreeMap<i64, usize> = BTreeMap::new();
    for attempt in attempts {
        match attempt.selected_option(question.id) {
            Some(selected) if Some(selected) == correct => right += 1,
            Some(selected) => *wrong.entry(selected).or_default() += 1,
            None => {}
        }
    }

    let success_rate = if attempts.is_empty() {
        0.0
    } else {
        right as f64 / attempts.len() as f64 * 100.0
    };

    let common_wrong_answer = most_common(&wrong)
        .and_then(|option_id| question.option(option_id))
        .map(|option| option.text_in(language).to_string());

    QuestionDetail {
        question: question.text_in(language).to_string(),
        success_rate,
        common_wrong_answer,
    }
}

/// Key with the highest count; ties go to the lowest key.
fn most_common(counts: &BTreeMap<i64, usize>) -> Option<i64> {
    let mut best: Option<(i64, usize)> = None;
    for (&id, &count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((id, count));
        }
    }
    best.map(|(id, _)| id)
}
