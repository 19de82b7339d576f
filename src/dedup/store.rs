// src/dedup/store.rs
//! Persistence boundary. The core only needs "fingerprints discovered since X"
//! and a way to hand over new postings; how that's stored is up to the impl.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;

use crate::scorer::ScoredPosting;

/// Descriptions longer than this are truncated before storage.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// The persisted projection of a `ScoredPosting`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredJob {
    pub title: String,
    pub company: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    /// Legacy rows may lack one.
    #[serde(default)]
    pub fingerprint: Option<String>,
    pub discovered_at: DateTime<Utc>,
}

impl StoredJob {
    pub fn from_scored(scored: &ScoredPosting, discovered_at: DateTime<Utc>) -> Self {
        let p = &scored.posting;
        Self {
            title: p.title.clone(),
            company: p.company.clone(),
            url: p.url.clone(),
            source: p.source.clone(),
            description: p.description.as_deref().map(truncate_description),
            score: scored.score(),
            matched_keywords: scored.matched_keywords(),
            fingerprint: Some(scored.fingerprint.clone()),
            discovered_at,
        }
    }
}

fn truncate_description(d: &str) -> String {
    if d.chars().count() <= MAX_DESCRIPTION_LENGTH {
        return d.to_string();
    }
    let mut out: String = d.chars().take(MAX_DESCRIPTION_LENGTH - 3).collect();
    out.push_str("...");
    out
}

#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Fingerprints of every job discovered at or after `cutoff`. Rows without a
    /// fingerprint come back as `None`.
    async fn fingerprints_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Option<String>>>;

    /// Persist new jobs; returns how many were written.
    async fn save_batch(&self, jobs: Vec<StoredJob>) -> Result<usize>;
}

#[async_trait::async_trait]
impl<T: JobStore + ?Sized> JobStore for Arc<T> {
    async fn fingerprints_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Option<String>>> {
        (**self).fingerprints_since(cutoff).await
    }

    async fn save_batch(&self, jobs: Vec<StoredJob>) -> Result<usize> {
        (**self).save_batch(jobs).await
    }
}

/// In-process store. Reference implementation and test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredJob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<StoredJob>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn snapshot(&self) -> Vec<StoredJob> {
        self.rows.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl JobStore for MemoryStore {
    async fn fingerprints_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Option<String>>> {
        let rows = self.rows.lock().expect("store mutex poisoned");
        Ok(rows
            .iter()
            .filter(|r| r.discovered_at >= cutoff)
            .map(|r| r.fingerprint.clone())
            .collect())
    }

    async fn save_batch(&self, jobs: Vec<StoredJob>) -> Result<usize> {
        let n = jobs.len();
        self.rows.lock().expect("store mutex poisoned").extend(jobs);
        Ok(n)
    }
}

/// Append-only JSON-lines file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<StoredJob>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading store {}", self.path.display()))
            }
        };
        content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| {
                serde_json::from_str::<StoredJob>(l).with_context(|| {
                    format!("corrupt store line {} in {}", i + 1, self.path.display())
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl JobStore for JsonlStore {
    async fn fingerprints_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Option<String>>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|r| r.discovered_at >= cutoff)
            .map(|r| r.fingerprint)
            .collect())
    }

    async fn save_batch(&self, jobs: Vec<StoredJob>) -> Result<usize> {
        if jobs.is_empty() {
            return Ok(0);
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let mut buf = String::new();
        for job in &jobs {
            buf.push_str(&serde_json::to_string(job)?);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening store {}", self.path.display()))?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(jobs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 50);
        let out = truncate_description(&long);
        assert_eq!(out.chars().count(), MAX_DESCRIPTION_LENGTH);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_description("short"), "short");
    }
}
