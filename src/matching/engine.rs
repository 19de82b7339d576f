//! Pluggable scoring engines. Only the heuristic keyword matcher exists today;
//! "ai" and "hybrid" are accepted names that fall back to it.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use super::matcher::{KeywordMatcher, MatchResult};
use crate::posting::Posting;
use crate::profile::Profile;

/// Anything that can turn a posting into a `MatchResult`.
pub trait MatchEngine: Send + Sync {
    fn match_posting(&self, posting: &Posting) -> MatchResult;
    fn name(&self) -> &'static str;
}

impl MatchEngine for KeywordMatcher {
    fn match_posting(&self, posting: &Posting) -> MatchResult {
        KeywordMatcher::match_posting(self, posting)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringEngine {
    #[default]
    Heuristic,
    Ai,
    Hybrid,
}

impl FromStr for ScoringEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "" => Ok(Self::Heuristic),
            "ai" => Ok(Self::Ai),
            "hybrid" => Ok(Self::Hybrid),
            other => bail!("unknown scoring engine `{other}` (expected heuristic|ai|hybrid)"),
        }
    }
}

impl fmt::Display for ScoringEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Heuristic => "heuristic",
            Self::Ai => "ai",
            Self::Hybrid => "hybrid",
        };
        f.write_str(s)
    }
}

/// Build the engine for `kind`. Non-heuristic kinds warn and fall back.
pub fn build_engine(kind: ScoringEngine, profile: Arc<Profile>) -> Arc<dyn MatchEngine> {
    if kind != ScoringEngine::Heuristic {
        warn!(engine = %kind, "scoring engine not yet available, falling back to heuristic");
    }
    Arc::new(KeywordMatcher::new(profile))
}
