// src/matching/mod.rs
//! Matching: profile-driven relevance of a single posting.

pub mod engine;
pub mod matcher;
pub mod scoring;
pub mod weights;

pub use engine::{build_engine, MatchEngine, ScoringEngine};
pub use matcher::{title_relevance, KeywordMatcher, MatchResult};
pub use scoring::ScoreSignals;
pub use weights::{ScoreBreakdown, ScoreWeights};
