//! Description-centric keyword matcher.
//!
//! Order of evaluation for one posting:
//! 1) negative keywords against the *title* only (tiered companies are exempt)
//! 2) primary/secondary keyword scan of the description
//! 3) title analysis: exact target title, partial relevance, keyword-in-title
//! 4) company tier, salary and remote checks
//! 5) title gate → `matched`
//! 6) weighted score (see `weights`)

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::scoring::ScoreSignals;
use super::weights::{ScoreBreakdown, ScoreWeights};
use crate::logging::{anon_hash, dev_logging_enabled, truncate_vec};
use crate::posting::Posting;
use crate::profile::{KeywordPattern, Profile};

/// Title relevance when no core role term is present.
const TITLE_FLOOR: f64 = 0.1;
/// Base relevance for titles that contain a core role term.
const TITLE_CORE_BASE: f64 = 0.3;
/// Extra relevance scaled by word overlap with the closest target title.
const TITLE_OVERLAP_SPAN: f64 = 0.7;

/// Outcome of matching one posting against the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    /// 0..=100
    pub score: f64,
    /// Primary keywords found in the description or title, profile order.
    pub matched_primary: Vec<String>,
    /// Secondary keywords found in the description, profile order.
    pub matched_secondary: Vec<String>,
    pub title_exact: bool,
    /// 0..=1
    pub title_partial_score: f64,
    pub title_has_primary: bool,
    pub company_tier: Option<u8>,
    pub negative_matches: Vec<String>,
    pub salary_match: bool,
    pub remote_match: bool,
    pub description_keyword_count: usize,
    pub description_keyword_variety: usize,
    pub breakdown: ScoreBreakdown,
}

impl MatchResult {
    /// Hard reject from the title negative gate.
    fn rejected(negative_matches: Vec<String>) -> Self {
        Self {
            negative_matches,
            salary_match: true,
            remote_match: true,
            ..Self::default()
        }
    }
}

/// Heuristic matcher over a compiled profile. Cheap to clone; the profile is shared.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    profile: Arc<Profile>,
    weights: ScoreWeights,
}

impl KeywordMatcher {
    pub fn new(profile: Arc<Profile>) -> Self {
        Self::with_weights(profile, ScoreWeights::DEFAULT)
    }

    pub fn with_weights(profile: Arc<Profile>, weights: ScoreWeights) -> Self {
        Self { profile, weights }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Match and score one posting. Never fails; missing optional fields simply
    /// contribute nothing.
    pub fn match_posting(&self, posting: &Posting) -> MatchResult {
        let p = &*self.profile;
        let title = posting.title.as_str();
        let description = posting.description_text();
        let company_tier = p.company_tier(&posting.company);

        // 1) Title-only negative gate. Descriptions routinely mention
        // "engineering manager" etc., titles saying "Junior" are a hard signal.
        let negative_matches: Vec<String> = p
            .negative_keywords()
            .iter()
            .filter(|k| k.is_match(title))
            .map(|k| k.keyword.clone())
            .collect();
        if !negative_matches.is_empty() && company_tier.is_none() {
            let res = MatchResult::rejected(negative_matches);
            dev_log_match("rejected_negative_title", posting, &res);
            return res;
        }

        // 2) Description scan
        let mut mentions = 0usize;
        let desc_primary = scan_keywords(p.primary_keywords(), description, &mut mentions);
        let desc_secondary = scan_keywords(p.secondary_keywords(), description, &mut mentions);

        // 3) Title analysis
        let title_exact = p.title_patterns().iter().any(|t| t.is_match(title));
        let title_partial_score = title_relevance(p, title, title_exact);
        let title_has_primary = p.primary_keywords().iter().any(|k| k.is_match(title));

        let matched_primary: Vec<String> = p
            .primary_keywords()
            .iter()
            .filter(|k| desc_primary.contains(&k.keyword) || k.is_match(title))
            .map(|k| k.keyword.clone())
            .collect();

        // 4) Other factors
        let salary = p.salary();
        let salary_match = match posting.salary_range() {
            Some((min, max)) => {
                let outside = max < salary.min || min > salary.max;
                !(outside && !salary.flexible)
            }
            None => true,
        };
        let remote_match = !(p.location().remote_only && !posting.remote);

        // 5) Title gate: a generic title that merely mentions keywords in its
        // description does not match, unless the employer itself is tiered.
        let has_relevant_title = title_exact || title_partial_score > TITLE_FLOOR;
        let matched = (has_relevant_title && (!desc_primary.is_empty() || title_has_primary))
            || company_tier.is_some();

        // 6) Score
        let signals = ScoreSignals {
            desc_primary: desc_primary.len(),
            desc_secondary: desc_secondary.len(),
            desc_mentions: mentions,
            title_exact,
            title_partial: title_partial_score,
            title_has_primary,
            company_tier,
            salary_match,
            remote_match,
            primary_total: p.primary_keywords().len(),
            secondary_total: p.secondary_keywords().len(),
        };
        let breakdown = self.weights.breakdown(&signals);

        let res = MatchResult {
            matched,
            score: breakdown.total(),
            description_keyword_variety: desc_primary.len() + desc_secondary.len(),
            matched_primary,
            matched_secondary: desc_secondary,
            title_exact,
            title_partial_score,
            title_has_primary,
            company_tier,
            negative_matches,
            salary_match,
            remote_match,
            description_keyword_count: mentions,
            breakdown,
        };
        dev_log_match(
            if res.matched { "matched" } else { "title_gate" },
            posting,
            &res,
        );
        res
    }
}

/// Keywords with at least one hit in `text`; adds every hit to `mentions`.
/// Overlapping keywords ("ML" / "ML ops") are counted independently.
fn scan_keywords(patterns: &[KeywordPattern], text: &str, mentions: &mut usize) -> Vec<String> {
    let mut found = Vec::new();
    if text.is_empty() {
        return found;
    }
    for k in patterns {
        let n = k.count(text);
        if n > 0 {
            *mentions += n;
            found.push(k.keyword.clone());
        }
    }
    found
}

/// Partial title relevance in [0,1], derived from the configured titles only.
pub fn title_relevance(profile: &Profile, title: &str, title_exact: bool) -> f64 {
    if title_exact {
        return 1.0;
    }

    let lower = title.to_lowercase();
    let has_core_role = profile
        .core_role_terms()
        .iter()
        .any(|term| lower.contains(term.as_str()));
    if !has_core_role {
        return TITLE_FLOOR;
    }

    let title_words: HashSet<&str> = lower.split_whitespace().collect();
    let mut best_overlap = 0.0f64;
    for configured in profile.all_titles() {
        let configured = configured.to_lowercase();
        let words: HashSet<&str> = configured.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let common = words.iter().filter(|w| title_words.contains(*w)).count();
        best_overlap = best_overlap.max(common as f64 / words.len() as f64);
    }

    (TITLE_CORE_BASE + best_overlap * TITLE_OVERLAP_SPAN).min(1.0)
}

/// Dev-only match diagnostics. Never logs raw posting text, only a hashed url.
fn dev_log_match(event: &str, posting: &Posting, res: &MatchResult) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(&posting.url);
    let primary = truncate_vec(&res.matched_primary, 5);
    let negative = truncate_vec(&res.negative_matches, 5);
    info!(
        target: "matching",
        %id,
        event,
        score = res.score,
        matched = res.matched,
        tier = ?res.company_tier,
        primary = ?primary,
        negative = ?negative
    );
}
