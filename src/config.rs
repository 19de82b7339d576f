// src/config.rs
//! Runtime settings from the environment (a `.env` file is loaded by the binary).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

use crate::dedup::{DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
use crate::matching::ScoringEngine;
pub use crate::profile::{DEFAULT_PROFILE_PATH, ENV_PROFILE_PATH};

pub const ENV_MIN_SCORE: &str = "JOB_RADAR_MIN_SCORE";
pub const ENV_NOTIFY_MIN_SCORE: &str = "JOB_RADAR_NOTIFY_MIN_SCORE";
pub const ENV_LOOKBACK_DAYS: &str = "JOB_RADAR_LOOKBACK_DAYS";
pub const ENV_TOP_N: &str = "JOB_RADAR_TOP_N";
pub const ENV_SCORING_ENGINE: &str = "JOB_RADAR_SCORING_ENGINE";
pub const ENV_STORE_PATH: &str = "JOB_RADAR_STORE_PATH";

pub const DEFAULT_MIN_SCORE: f64 = 30.0;
pub const DEFAULT_NOTIFY_MIN_SCORE: f64 = 50.0;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_STORE_PATH: &str = "state/seen_jobs.jsonl";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profile_path: PathBuf,
    pub min_score: f64,
    pub notify_min_score: f64,
    pub lookback_days: i64,
    pub top_n: usize,
    pub scoring_engine: ScoringEngine,
    pub store_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile_path: PathBuf::from(DEFAULT_PROFILE_PATH),
            min_score: DEFAULT_MIN_SCORE,
            notify_min_score: DEFAULT_NOTIFY_MIN_SCORE,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            top_n: DEFAULT_TOP_N,
            scoring_engine: ScoringEngine::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Bad numbers fall back to defaults; an unknown
    /// scoring engine is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let scoring_engine = match non_empty(lookup(ENV_SCORING_ENGINE)) {
            Some(raw) => ScoringEngine::from_str(&raw)
                .with_context(|| format!("invalid {ENV_SCORING_ENGINE}"))?,
            None => d.scoring_engine,
        };

        Ok(Self {
            profile_path: non_empty(lookup(ENV_PROFILE_PATH))
                .map(PathBuf::from)
                .unwrap_or(d.profile_path),
            min_score: parse_score_env(lookup(ENV_MIN_SCORE)).unwrap_or(d.min_score),
            notify_min_score: parse_score_env(lookup(ENV_NOTIFY_MIN_SCORE))
                .unwrap_or(d.notify_min_score),
            lookback_days: parse_env::<i64>(lookup(ENV_LOOKBACK_DAYS))
                .filter(|v| *v >= 0)
                .map(|v| v.min(MAX_LOOKBACK_DAYS))
                .unwrap_or(d.lookback_days),
            top_n: parse_env::<usize>(lookup(ENV_TOP_N)).unwrap_or(d.top_n),
            scoring_engine,
            store_path: non_empty(lookup(ENV_STORE_PATH))
                .map(PathBuf::from)
                .unwrap_or(d.store_path),
        })
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_env<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.trim().parse::<T>().ok())
}

fn parse_score_env(raw: Option<String>) -> Option<f64> {
    parse_env::<f64>(raw)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_env_gives_defaults() {
        assert_eq!(settings(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn scores_clamp_and_bad_numbers_fall_back() {
        let s = settings(&[
            (ENV_MIN_SCORE, "250"),
            (ENV_NOTIFY_MIN_SCORE, "abc"),
            (ENV_LOOKBACK_DAYS, "-3"),
            (ENV_TOP_N, " 5 "),
        ])
        .unwrap();
        assert_eq!(s.min_score, 100.0);
        assert_eq!(s.notify_min_score, DEFAULT_NOTIFY_MIN_SCORE);
        assert_eq!(s.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert_eq!(s.top_n, 5);
    }

    #[test]
    fn huge_lookback_is_capped() {
        let s = settings(&[(ENV_LOOKBACK_DAYS, "100000000")]).unwrap();
        assert_eq!(s.lookback_days, MAX_LOOKBACK_DAYS);
    }

    #[test]
    fn unknown_engine_is_an_error() {
        assert!(settings(&[(ENV_SCORING_ENGINE, "quantum")]).is_err());
        let s = settings(&[(ENV_SCORING_ENGINE, "hybrid")]).unwrap();
        assert_eq!(s.scoring_engine, ScoringEngine::Hybrid);
    }
}
