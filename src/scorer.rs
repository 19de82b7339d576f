// src/scorer.rs
//! Batch scoring: match every posting, drop non-matches and low scores,
//! fingerprint the rest and rank them.

use metrics::counter;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::DEFAULT_MIN_SCORE;
use crate::matching::{KeywordMatcher, MatchEngine, MatchResult};
use crate::posting::{InvalidPosting, Posting};
use crate::telemetry::{ensure_metrics_described, SCORER_INVALID_TOTAL, SCORER_MATCHED_TOTAL};

/// Company tokens that don't distinguish employers.
const LEGAL_SUFFIXES: [&str; 6] = ["inc", "llc", "ltd", "corp", "corporation", "the"];

#[derive(Debug, Clone, Serialize)]
pub struct ScoredPosting {
    pub posting: Posting,
    pub match_result: MatchResult,
    pub fingerprint: String,
}

impl ScoredPosting {
    pub fn score(&self) -> f64 {
        self.match_result.score
    }

    /// Primary then secondary keywords.
    pub fn matched_keywords(&self) -> Vec<String> {
        self.match_result
            .matched_primary
            .iter()
            .chain(self.match_result.matched_secondary.iter())
            .cloned()
            .collect()
    }
}

/// Dedup key: normalized company (legal suffixes dropped) + ":" + normalized title.
/// Source-independent, so the same role scraped from two boards collapses.
pub fn fingerprint(company: &str, title: &str) -> String {
    let company_lower = company.to_lowercase();
    let company_norm = company_lower
        .split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| c == '.' || c == ','))
        .filter(|tok| !tok.is_empty() && !LEGAL_SUFFIXES.contains(tok))
        .collect::<Vec<_>>()
        .join(" ");
    let title_norm = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    format!("{company_norm}:{title_norm}")
}

/// Per-batch tallies, for logs and scan reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreStats {
    pub total: usize,
    pub invalid: usize,
    pub unmatched: usize,
    pub below_threshold: usize,
    pub kept: usize,
}

enum Outcome {
    Invalid(InvalidPosting, Posting),
    Unmatched,
    BelowThreshold,
    Kept(ScoredPosting),
}

pub struct JobScorer {
    engine: Arc<dyn MatchEngine>,
    min_score: f64,
}

impl JobScorer {
    /// A non-finite threshold falls back to the default.
    pub fn new(engine: Arc<dyn MatchEngine>, min_score: f64) -> Self {
        let min_score = if min_score.is_finite() {
            min_score.clamp(0.0, 100.0)
        } else {
            warn!(min_score, fallback = DEFAULT_MIN_SCORE, "non-finite min score");
            DEFAULT_MIN_SCORE
        };
        Self { engine, min_score }
    }

    pub fn from_matcher(matcher: KeywordMatcher, min_score: f64) -> Self {
        Self::new(Arc::new(matcher), min_score)
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Score a batch; result is sorted by score, highest first.
    pub fn score_jobs(&self, postings: &[Posting]) -> Vec<ScoredPosting> {
        self.score_jobs_with_stats(postings).0
    }

    /// Like `score_jobs`, also returning how many postings were dropped and why.
    /// Matching runs on the rayon pool; output order does not depend on scheduling.
    pub fn score_jobs_with_stats(&self, postings: &[Posting]) -> (Vec<ScoredPosting>, ScoreStats) {
        ensure_metrics_described();

        let outcomes: Vec<Outcome> = postings
            .par_iter()
            .map(|p| self.evaluate(p.clone()))
            .collect();

        let mut stats = ScoreStats {
            total: postings.len(),
            ..Default::default()
        };
        let mut scored = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Outcome::Invalid(err, posting) => {
                    warn!(
                        error = %err,
                        source = %posting.source,
                        url = %posting.url,
                        "skipping malformed posting"
                    );
                    stats.invalid += 1;
                }
                Outcome::Unmatched => stats.unmatched += 1,
                Outcome::BelowThreshold => stats.below_threshold += 1,
                Outcome::Kept(s) => scored.push(s),
            }
        }

        // Stable: equal scores keep input order.
        scored.sort_by(|a, b| b.score().total_cmp(&a.score()));
        stats.kept = scored.len();

        counter!(SCORER_INVALID_TOTAL).increment(stats.invalid as u64);
        counter!(SCORER_MATCHED_TOTAL).increment(stats.kept as u64);
        debug!(
            total = stats.total,
            kept = stats.kept,
            invalid = stats.invalid,
            unmatched = stats.unmatched,
            below_threshold = stats.below_threshold,
            min_score = self.min_score,
            "batch scored"
        );

        (scored, stats)
    }

    fn evaluate(&self, posting: Posting) -> Outcome {
        let posting = posting.normalized();
        if let Err(e) = posting.validate() {
            return Outcome::Invalid(e, posting);
        }

        let result = self.engine.match_posting(&posting);
        if !result.matched {
            return Outcome::Unmatched;
        }
        if result.score < self.min_score {
            return Outcome::BelowThreshold;
        }

        let fingerprint = fingerprint(&posting.company, &posting.title);
        Outcome::Kept(ScoredPosting {
            posting,
            match_result: result,
            fingerprint,
        })
    }

    /// Keep postings at or above this scorer's own threshold.
    pub fn filter_by_min_score(&self, scored: &[ScoredPosting]) -> Vec<ScoredPosting> {
        filter_by_score(scored, self.min_score)
    }
}

/// Keep postings with `score >= threshold`, order preserved.
pub fn filter_by_score(scored: &[ScoredPosting], threshold: f64) -> Vec<ScoredPosting> {
    scored
        .iter()
        .filter(|s| s.score() >= threshold)
        .cloned()
        .collect()
}

/// First `n` postings (all of them when fewer).
pub fn top_jobs(scored: &[ScoredPosting], n: usize) -> &[ScoredPosting] {
    &scored[..n.min(scored.len())]
}
