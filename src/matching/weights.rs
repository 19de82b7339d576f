//! Named weight table for the description-centric score.
//!
//! Shares sum to 1.0 (plus the title keyword bonus), each component is scored on
//! a 0..100 scale and multiplied by its share:
//!
//! | component            | share |
//! |----------------------|-------|
//! | description keywords | 0.40  |
//! | title relevance      | 0.20  |
//! | title keyword bonus  | 0.05  |
//! | keyword variety      | 0.15  |
//! | company tier         | 0.15  |
//! | salary               | 0.05  |
//! | remote               | 0.05  |

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub description: f64,
    pub title: f64,
    pub title_keyword_bonus: f64,
    pub variety: f64,
    pub company: f64,
    pub salary: f64,
    pub remote: f64,
    /// Density multiplier cap for repeated description keywords.
    pub max_density: f64,
    /// Density increment per extra keyword mention.
    pub density_step: f64,
    /// Variety bonus per matched secondary keyword.
    pub secondary_bonus: f64,
}

impl ScoreWeights {
    pub const DEFAULT: ScoreWeights = ScoreWeights {
        description: 0.40,
        title: 0.20,
        title_keyword_bonus: 0.05,
        variety: 0.15,
        company: 0.15,
        salary: 0.05,
        remote: 0.05,
        max_density: 1.5,
        density_step: 0.1,
        secondary_bonus: 0.05,
    };

    /// Tier 1 → 100, tier 2 → 70, tier 3 → 40, anything else → 0.
    pub fn tier_points(tier: Option<u8>) -> f64 {
        match tier {
            Some(1) => 100.0,
            Some(2) => 70.0,
            Some(3) => 40.0,
            _ => 0.0,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-component contributions (already scaled by weight).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct ScoreBreakdown {
    pub description: f64,
    pub title: f64,
    pub variety: f64,
    pub company: f64,
    pub salary_remote: f64,
}

impl ScoreBreakdown {
    /// Sum of contributions, clamped into [0,100].
    pub fn total(&self) -> f64 {
        let raw = self.description + self.title + self.variety + self.company + self.salary_remote;
        raw.clamp(0.0, 100.0)
    }
}
