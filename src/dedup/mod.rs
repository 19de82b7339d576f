// src/dedup/mod.rs
//! Drop postings we've already surfaced, both against a store snapshot
//! (lookback window) and within the current batch.

pub mod store;

pub use store::{JobStore, JsonlStore, MemoryStore, StoredJob, MAX_DESCRIPTION_LENGTH};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::scorer::ScoredPosting;
use crate::telemetry::{ensure_metrics_described, DEDUP_DROPPED_TOTAL};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
/// Upper bound on the lookback window (about a century).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

pub struct Deduplicator<S: JobStore> {
    store: S,
    lookback_days: i64,
    seen: HashSet<String>,
}

impl<S: JobStore> Deduplicator<S> {
    pub fn new(store: S, lookback_days: i64) -> Self {
        Self {
            store,
            lookback_days: lookback_days.clamp(0, MAX_LOOKBACK_DAYS),
            seen: HashSet::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lookback_days(&self) -> i64 {
        self.lookback_days
    }

    /// Size of the current snapshot.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Replace the snapshot with fingerprints discovered inside the lookback window.
    /// Rows without a fingerprint are ignored.
    pub async fn load_existing_fingerprints(&mut self) -> Result<usize> {
        let cutoff = Duration::try_days(self.lookback_days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let rows = self
            .store
            .fingerprints_since(cutoff)
            .await
            .context("loading existing fingerprints")?;

        self.seen = rows
            .into_iter()
            .flatten()
            .filter(|fp| !fp.is_empty())
            .collect();

        info!(
            count = self.seen.len(),
            lookback_days = self.lookback_days,
            "loaded existing fingerprints"
        );
        Ok(self.seen.len())
    }

    pub fn is_duplicate(&self, fingerprint: &str) -> bool {
        self.seen.contains(fingerprint)
    }

    pub fn mark_seen(&mut self, fingerprint: String) {
        self.seen.insert(fingerprint);
    }

    /// Keep the first occurrence of each fingerprint not already in the snapshot.
    /// Order of survivors follows the input.
    pub async fn deduplicate(
        &mut self,
        scored: Vec<ScoredPosting>,
        check_store: bool,
    ) -> Result<Vec<ScoredPosting>> {
        ensure_metrics_described();
        if check_store {
            self.load_existing_fingerprints().await?;
        }

        let total = scored.len();
        let mut batch_seen: HashSet<String> = HashSet::with_capacity(total);
        let unique: Vec<ScoredPosting> = scored
            .into_iter()
            .filter(|s| {
                !self.is_duplicate(&s.fingerprint) && batch_seen.insert(s.fingerprint.clone())
            })
            .collect();

        let dropped = total - unique.len();
        counter!(DEDUP_DROPPED_TOTAL).increment(dropped as u64);
        info!(total, unique = unique.len(), dropped, "deduplicated batch");
        Ok(unique)
    }

    /// Reload, then drop only postings already in the store. Two copies of the
    /// same new posting both survive.
    pub async fn filter_new_only(&mut self, scored: Vec<ScoredPosting>) -> Result<Vec<ScoredPosting>> {
        ensure_metrics_described();
        self.load_existing_fingerprints().await?;

        let total = scored.len();
        let fresh: Vec<ScoredPosting> = scored
            .into_iter()
            .filter(|s| !self.is_duplicate(&s.fingerprint))
            .collect();

        counter!(DEDUP_DROPPED_TOTAL).increment((total - fresh.len()) as u64);
        debug!(total, fresh = fresh.len(), "filtered against store");
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchResult;
    use crate::posting::Posting;
    use crate::scorer::fingerprint;

    fn scored(company: &str, title: &str, source: &str) -> ScoredPosting {
        ScoredPosting {
            posting: Posting::new(title, company, format!("https://{source}/{title}"), source),
            match_result: MatchResult::default(),
            fingerprint: fingerprint(company, title),
        }
    }

    #[tokio::test]
    async fn mark_seen_then_duplicate() {
        let mut d = Deduplicator::new(MemoryStore::new(), 30);
        assert!(!d.is_duplicate("acme:pm"));
        d.mark_seen("acme:pm".into());
        assert!(d.is_duplicate("acme:pm"));
    }

    #[tokio::test]
    async fn in_batch_copies_collapse_without_store() {
        let mut d = Deduplicator::new(MemoryStore::new(), 30);
        let out = d
            .deduplicate(
                vec![
                    scored("Acme Inc", "PM", "linkedin"),
                    scored("acme", "pm", "indeed"),
                    scored("Globex", "PM", "indeed"),
                ],
                false,
            )
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].posting.source, "linkedin");
        assert_eq!(out[1].posting.company, "Globex");
    }

    #[tokio::test]
    async fn filter_new_only_keeps_in_batch_copies() {
        let mut d = Deduplicator::new(MemoryStore::new(), 30);
        let out = d
            .filter_new_only(vec![scored("Acme", "PM", "a"), scored("Acme", "PM", "b")])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn negative_lookback_is_clamped() {
        let d = Deduplicator::new(MemoryStore::new(), -5);
        assert_eq!(d.lookback_days(), 0);
    }

    #[tokio::test]
    async fn huge_lookback_is_capped_and_loads() {
        let old = StoredJob {
            title: "PM".into(),
            company: "Acme".into(),
            url: "u".into(),
            source: "s".into(),
            description: None,
            score: 40.0,
            matched_keywords: vec![],
            fingerprint: Some("acme:pm".into()),
            discovered_at: Utc::now() - Duration::days(3650),
        };
        for days in [100_000_000, i64::MAX] {
            let mut d = Deduplicator::new(MemoryStore::with_rows(vec![old.clone()]), days);
            assert_eq!(d.lookback_days(), MAX_LOOKBACK_DAYS);
            assert_eq!(d.load_existing_fingerprints().await.unwrap(), 1);
            assert!(d.is_duplicate("acme:pm"));
        }
    }
}
