// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod config;
pub mod dedup;
pub mod logging;
pub mod matching;
pub mod pipeline;
pub mod posting;
pub mod profile;
pub mod scorer;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::Settings;
pub use crate::dedup::{Deduplicator, JobStore, JsonlStore, MemoryStore, StoredJob};
pub use crate::matching::{KeywordMatcher, MatchEngine, MatchResult, ScoringEngine};
pub use crate::pipeline::{PostingSource, ScanPipeline, ScanReport};
pub use crate::posting::{InvalidPosting, Posting};
pub use crate::profile::Profile;
pub use crate::scorer::{fingerprint, JobScorer, ScoredPosting};
