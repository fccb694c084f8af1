// src/config.rs

use std::env;

use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;
use url::Url;

/// Percentage an attempt needs to count as passed when `PASS_THRESHOLD` is unset.
pub const DEFAULT_PASS_THRESHOLD: f64 = 60.0;

/// Number of equal-width buckets in the score distribution histogram.
pub const SCORE_BUCKETS: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub rust_log: String,
    pub log_dir: String,
    pub pass_threshold: f64,
    /// Reference timezone used to group attempts by calendar day.
    pub stats_offset: FixedOffset,
    pub default_language: String,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://quiz.db?mode=rwc".to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            stats_offset: Utc.fix(),
            default_language: "en".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let bind_addr = env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let log_dir = env::var("LOG_DIR").unwrap_or(defaults.log_dir);

        let pass_threshold = env::var("PASS_THRESHOLD")
            .ok()
            .and_then(|v| parse_pass_threshold(&v))
            .unwrap_or(defaults.pass_threshold);

        let stats_offset = env::var("STATS_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| parse_offset_minutes(&v))
            .unwrap_or(defaults.stats_offset);

        let default_language = env::var("DEFAULT_LANGUAGE")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or(defaults.default_language);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or(defaults.cors_origins);

        Self {
            database_url,
            bind_addr,
            rust_log,
            log_dir,
            pass_threshold,
            stats_offset,
            default_language,
            cors_origins,
        }
    }
}

/// Accepts a percentage in `0..=100`.
fn parse_pass_threshold(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if (0.0..=100.0).contains(&value) {
        Some(value)
    } else {
        tracing::warn!("PASS_THRESHOLD {} is outside 0..=100, using default", raw);
        None
    }
}

fn parse_offset_minutes(raw: &str) -> Option<FixedOffset> {
    let minutes = raw.trim().parse::<i32>().ok()?;
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

/// Splits a comma separated origin list, keeping only well-formed http(s) URLs.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => true,
            _ => {
                tracing::warn!("Ignoring invalid CORS origin: {}", s);
                false
            }
        })
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
