//! Score arithmetic, kept apart from pattern matching so the weighting can be
//! tested with hand-built signals.

use super::weights::{ScoreBreakdown, ScoreWeights};

/// Everything the score depends on, already extracted from a posting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreSignals {
    /// Distinct primary keywords found in the description.
    pub desc_primary: usize,
    /// Distinct secondary keywords found in the description.
    pub desc_secondary: usize,
    /// Total keyword mentions in the description (with repetition).
    pub desc_mentions: usize,
    pub title_exact: bool,
    pub title_partial: f64,
    pub title_has_primary: bool,
    pub company_tier: Option<u8>,
    pub salary_match: bool,
    pub remote_match: bool,
    /// Configured primary keyword count.
    pub primary_total: usize,
    /// Configured secondary keyword count.
    pub secondary_total: usize,
}

impl ScoreWeights {
    /// Weighted contributions for one posting. Every division is guarded, so
    /// empty keyword lists simply contribute nothing.
    pub fn breakdown(&self, s: &ScoreSignals) -> ScoreBreakdown {
        let mut out = ScoreBreakdown::default();

        // Description relevance
        if s.primary_total > 0 && s.desc_primary > 0 {
            let variety = s.desc_primary as f64 / s.primary_total as f64;
            let extra = s.desc_mentions.saturating_sub(1) as f64;
            let density = (1.0 + extra * self.density_step).min(self.max_density);
            out.description = self.description * (variety * density * 100.0).min(100.0);
        }

        // Title relevance; the keyword bonus only lifts non-exact titles
        if s.title_exact {
            out.title = self.title * 100.0;
        } else {
            out.title = self.title * s.title_partial.clamp(0.0, 1.0) * 100.0;
            if s.title_has_primary {
                out.title += self.title_keyword_bonus * 100.0;
            }
        }

        // Keyword variety & depth
        let max_variety = s.primary_total + s.secondary_total;
        if max_variety > 0 {
            let pct = (s.desc_primary + s.desc_secondary) as f64 / max_variety as f64;
            let bonus = s.desc_secondary as f64 * self.secondary_bonus;
            out.variety = self.variety * (pct + bonus).min(1.0) * 100.0;
        }

        out.company = self.company * ScoreWeights::tier_points(s.company_tier);

        if s.salary_match {
            out.salary_remote += self.salary * 100.0;
        }
        if s.remote_match {
            out.salary_remote += self.remote * 100.0;
        }

        out
    }

    pub fn score(&self, s: &ScoreSignals) -> f64 {
        self.breakdown(s).total()
    }
}
