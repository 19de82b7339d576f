// src/pipeline.rs
//! One scan: collect → score → dedup → save → pick what to notify about.

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{counter, gauge};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Settings;
use crate::dedup::{Deduplicator, JobStore, StoredJob};
use crate::matching::MatchEngine;
use crate::posting::Posting;
use crate::profile::Profile;
use crate::scorer::{filter_by_score, top_jobs, JobScorer, ScoreStats, ScoredPosting};
use crate::telemetry::{
    ensure_metrics_described, SCAN_COLLECTED_TOTAL, SCAN_LAST_RUN_TS, SCAN_NEW_TOTAL,
    SCAN_SOURCE_ERRORS_TOTAL,
};

/// A job board or feed.
#[async_trait::async_trait]
pub trait PostingSource: Send + Sync {
    async fn collect(&self, queries: &[String]) -> Result<Vec<Posting>>;
    fn name(&self) -> &str;
}

/// Postings from a JSON array on disk. Queries are ignored; the file is the result set.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Self { path, name }
    }
}

#[async_trait::async_trait]
impl PostingSource for JsonFileSource {
    async fn collect(&self, _queries: &[String]) -> Result<Vec<Posting>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading postings from {}", self.path.display()))?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing postings JSON {}", self.path.display()))?;

        let mut postings = Vec::with_capacity(records.len());
        let mut malformed = 0usize;
        for (idx, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Posting>(record) {
                Ok(mut p) => {
                    if p.source.trim().is_empty() {
                        p.source = self.name.clone();
                    }
                    postings.push(p);
                }
                Err(e) => {
                    malformed += 1;
                    warn!(source = %self.name, record = idx, error = %e, "skipping malformed posting");
                }
            }
        }
        if malformed > 0 {
            warn!(source = %self.name, malformed, kept = postings.len(), "postings file had malformed records");
        }
        Ok(postings)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub collected: usize,
    pub source_errors: usize,
    pub scored: usize,
    pub stats: ScoreStats,
    pub new_jobs: Vec<ScoredPosting>,
    pub saved: usize,
    /// New postings worth a notification, best first.
    pub notify: Vec<ScoredPosting>,
}

pub struct ScanPipeline<S: JobStore> {
    queries: Vec<String>,
    scorer: JobScorer,
    dedup: Mutex<Deduplicator<S>>,
    notify_min_score: f64,
    top_n: usize,
}

impl<S: JobStore> ScanPipeline<S> {
    pub fn new(
        profile: &Profile,
        scorer: JobScorer,
        dedup: Deduplicator<S>,
        notify_min_score: f64,
        top_n: usize,
    ) -> Self {
        Self {
            queries: profile.search_queries(),
            scorer,
            dedup: Mutex::new(dedup),
            notify_min_score,
            top_n,
        }
    }

    /// Wire a pipeline from settings and an already-built engine.
    pub fn from_settings(
        settings: &Settings,
        profile: &Profile,
        engine: Arc<dyn MatchEngine>,
        store: S,
    ) -> Self {
        Self::new(
            profile,
            JobScorer::new(engine, settings.min_score),
            Deduplicator::new(store, settings.lookback_days),
            settings.notify_min_score,
            settings.top_n,
        )
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Source failures are logged and skipped; a store failure aborts the scan.
    pub async fn run_scan(&self, sources: &[Box<dyn PostingSource>]) -> Result<ScanReport> {
        ensure_metrics_described();

        let mut raw = Vec::new();
        let mut source_errors = 0usize;
        for s in sources {
            match s.collect(&self.queries).await {
                Ok(mut v) => {
                    info!(source = s.name(), count = v.len(), "collected postings");
                    raw.append(&mut v);
                }
                Err(e) => {
                    warn!(error = ?e, source = s.name(), "source error");
                    counter!(SCAN_SOURCE_ERRORS_TOTAL).increment(1);
                    source_errors += 1;
                }
            }
        }
        let collected = raw.len();
        counter!(SCAN_COLLECTED_TOTAL).increment(collected as u64);

        let (scored, stats) = self.scorer.score_jobs_with_stats(&raw);
        let scored_count = scored.len();

        // One lock for snapshot, write and mark.
        let mut dedup = self.dedup.lock().await;
        let new_jobs = dedup.deduplicate(scored, true).await?;

        let now = Utc::now();
        let rows: Vec<StoredJob> = new_jobs
            .iter()
            .map(|s| StoredJob::from_scored(s, now))
            .collect();
        let saved = dedup
            .store()
            .save_batch(rows)
            .await
            .context("saving new jobs")?;
        for s in &new_jobs {
            dedup.mark_seen(s.fingerprint.clone());
        }
        drop(dedup);

        let candidates = filter_by_score(&new_jobs, self.notify_min_score);
        let notify = top_jobs(&candidates, self.top_n).to_vec();

        counter!(SCAN_NEW_TOTAL).increment(new_jobs.len() as u64);
        gauge!(SCAN_LAST_RUN_TS).set(now.timestamp().max(0) as f64);
        info!(
            collected,
            source_errors,
            scored = scored_count,
            new = new_jobs.len(),
            saved,
            notify = notify.len(),
            engine = self.scorer.engine_name(),
            "scan finished"
        );

        Ok(ScanReport {
            collected,
            source_errors,
            scored: scored_count,
            stats,
            new_jobs,
            saved,
            notify,
        })
    }
}
