// src/posting.rs
//! Normalized job posting record handed over by collectors, plus the cleaning
//! and validation applied before a posting reaches the matcher.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location fragments that imply a remote role.
const REMOTE_HINTS: [&str; 3] = ["remote", "anywhere", "worldwide"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Posting {
    // Missing core fields deserialize empty and are rejected by `validate`.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String, // e.g. "greenhouse", "lever"
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub apply_url: Option<String>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,
}

/// Why a posting was rejected before matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPosting {
    #[error("posting has no title")]
    MissingTitle,
    #[error("posting has no company")]
    MissingCompany,
    #[error("posting has no url")]
    MissingUrl,
}

impl Posting {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            url: url.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_salary(mut self, min: i64, max: i64) -> Self {
        self.salary_min = Some(min);
        self.salary_max = Some(max);
        self
    }

    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    /// Scrub upstream garbage: "nan" strings become empty/absent, the description
    /// is stripped of markup, and remote-ish locations flip `remote` on.
    pub fn normalized(mut self) -> Self {
        self.title = clean_nan(Some(self.title)).unwrap_or_default();
        self.company = clean_nan(Some(self.company)).unwrap_or_default();
        self.location = clean_nan(self.location);
        self.description = clean_nan(self.description)
            .map(|d| normalize_description(&d))
            .filter(|d| !d.is_empty());

        if let Some(loc) = &self.location {
            let lower = loc.to_lowercase();
            if REMOTE_HINTS.iter().any(|h| lower.contains(h)) {
                self.remote = true;
            }
        }
        self
    }

    /// Required fields check. Run after `normalized()`.
    pub fn validate(&self) -> Result<(), InvalidPosting> {
        if self.title.trim().is_empty() {
            return Err(InvalidPosting::MissingTitle);
        }
        if self.company.trim().is_empty() {
            return Err(InvalidPosting::MissingCompany);
        }
        if self.url.trim().is_empty() {
            return Err(InvalidPosting::MissingUrl);
        }
        Ok(())
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Both salary bounds, when the collector supplied non-zero values.
    pub fn salary_range(&self) -> Option<(i64, i64)> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) if min > 0 && max > 0 => Some((min, max)),
            _ => None,
        }
    }
}

/// `"nan"` in any case (pandas NaN stringified by scrapers) → `None`.
fn clean_nan(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().eq_ignore_ascii_case("nan"))
}

/// Decode entities, strip tags and collapse whitespace.
pub fn normalize_description(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let stripped = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    re_ws.replace_all(&stripped, " ").trim().to_string()
}
