// src/profile.rs
//! User interest profile: config schema (TOML/JSON), validation, and the compiled,
//! read-only form the matcher works against.
//!
//! All keyword/title regexes are compiled here, once per load. Nothing in the
//! scoring path compiles patterns.

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PROFILE_PATH: &str = "config/profile.toml";
pub const ENV_PROFILE_PATH: &str = "JOB_RADAR_PROFILE_PATH";

/// Seniority prefixes stripped (at most one) when deriving core role terms.
const SENIORITY_PREFIXES: [&str; 15] = [
    "senior ",
    "sr. ",
    "sr ",
    "lead ",
    "staff ",
    "principal ",
    "director of ",
    "director, ",
    "group ",
    "head of ",
    "vp of ",
    "vp, ",
    "chief ",
    "associate ",
    "junior ",
];

/* ----------------------------
Config schema (from TOML/JSON)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub target_titles: TitlesCfg,
    #[serde(default)]
    pub required_keywords: KeywordsCfg,
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    #[serde(default)]
    pub compensation: CompensationCfg,
    #[serde(default)]
    pub location: LocationCfg,
    #[serde(default)]
    pub target_companies: CompaniesCfg,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitlesCfg {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordsCfg {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompensationCfg {
    #[serde(default)]
    pub min_salary: i64,
    #[serde(default = "default_max_salary")]
    pub max_salary: i64,
    #[serde(default = "default_flexible")]
    pub flexible: bool,
}

fn default_max_salary() -> i64 {
    999_999
}

fn default_flexible() -> bool {
    true
}

impl Default for CompensationCfg {
    fn default() -> Self {
        Self {
            min_salary: 0,
            max_salary: default_max_salary(),
            flexible: default_flexible(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationCfg {
    #[serde(default)]
    pub remote_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompaniesCfg {
    #[serde(default)]
    pub tier1: Vec<String>,
    #[serde(default)]
    pub tier2: Vec<String>,
    #[serde(default)]
    pub tier3: Vec<String>,
}

/* ----------------------------
Compiled profile
---------------------------- */

/// A configured keyword/title and its case-insensitive whole-word regex.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    pub keyword: String,
    re: Regex,
}

impl KeywordPattern {
    pub fn compile(keyword: &str) -> Result<Self> {
        let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
            .map_err(|e| anyhow!("keyword `{}` regex error: {}", keyword, e))?;
        Ok(Self {
            keyword: keyword.to_string(),
            re,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// Number of non-overlapping occurrences in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.re.find_iter(text).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
    pub flexible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocationPrefs {
    pub remote_only: bool,
}

/// Validated, immutable profile. Build once per scan and share by reference.
#[derive(Debug, Clone)]
pub struct Profile {
    primary_titles: Vec<String>,
    secondary_titles: Vec<String>,
    title_patterns: Vec<KeywordPattern>,
    primary_keywords: Vec<KeywordPattern>,
    secondary_keywords: Vec<KeywordPattern>,
    negative_keywords: Vec<KeywordPattern>,
    core_role_terms: BTreeSet<String>,
    company_tiers: HashMap<String, u8>,
    salary: SalaryRange,
    location: LocationPrefs,
}

impl Profile {
    /// Load using env var + default path:
    /// 1) $JOB_RADAR_PROFILE_PATH
    /// 2) config/profile.toml
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_PROFILE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_PATH));
        Self::load_from(&path)
    }

    /// Load from an explicit path. `.json` is parsed as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading profile from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let profile = if ext == "json" {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .with_context(|| format!("invalid profile at {}", path.display()))?;

        info!(
            path = %path.display(),
            titles = profile.all_titles().count(),
            primary_keywords = profile.primary_keywords.len(),
            tiered_companies = profile.company_tiers.len(),
            "profile loaded"
        );
        Ok(profile)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: ProfileConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let cfg: ProfileConfig = serde_json::from_str(json_str)?;
        Self::from_config(cfg)
    }

    /// Validate and compile. Fails fast on anything the matcher can't work with.
    pub fn from_config(cfg: ProfileConfig) -> Result<Self> {
        let primary_titles = clean_list(cfg.target_titles.primary);
        let secondary_titles = clean_list(cfg.target_titles.secondary);
        let primary_kw = clean_list(cfg.required_keywords.primary);
        let secondary_kw = clean_list(cfg.required_keywords.secondary);
        let negative_kw = clean_list(cfg.negative_keywords);

        if primary_titles.is_empty() {
            bail!("target_titles.primary must contain at least one title");
        }
        if primary_kw.is_empty() {
            bail!("required_keywords.primary must contain at least one keyword");
        }
        let comp = cfg.compensation;
        if comp.min_salary < 0 || comp.max_salary < 0 {
            bail!("compensation bounds must not be negative");
        }
        if comp.min_salary > comp.max_salary {
            bail!(
                "compensation.min_salary ({}) exceeds max_salary ({})",
                comp.min_salary,
                comp.max_salary
            );
        }

        let compile_all = |items: &[String]| -> Result<Vec<KeywordPattern>> {
            items.iter().map(|s| KeywordPattern::compile(s)).collect()
        };

        let all_titles: Vec<String> = primary_titles
            .iter()
            .chain(secondary_titles.iter())
            .cloned()
            .collect();

        // Best tier wins when a company shows up in more than one list,
        // whatever order the lists are written in.
        let mut company_tiers = HashMap::new();
        for (tier, names) in [
            (1u8, &cfg.target_companies.tier1),
            (2u8, &cfg.target_companies.tier2),
            (3u8, &cfg.target_companies.tier3),
        ] {
            for name in clean_list(names.clone()) {
                company_tiers.entry(name.to_lowercase()).or_insert(tier);
            }
        }

        Ok(Self {
            title_patterns: compile_all(&all_titles)?,
            core_role_terms: core_role_terms(&all_titles),
            primary_keywords: compile_all(&primary_kw)?,
            secondary_keywords: compile_all(&secondary_kw)?,
            negative_keywords: compile_all(&negative_kw)?,
            primary_titles,
            secondary_titles,
            company_tiers,
            salary: SalaryRange {
                min: comp.min_salary,
                max: comp.max_salary,
                flexible: comp.flexible,
            },
            location: LocationPrefs {
                remote_only: cfg.location.remote_only,
            },
        })
    }

    pub fn primary_titles(&self) -> &[String] {
        &self.primary_titles
    }

    pub fn secondary_titles(&self) -> &[String] {
        &self.secondary_titles
    }

    /// Primary titles followed by secondary titles.
    pub fn all_titles(&self) -> impl Iterator<Item = &String> {
        self.primary_titles.iter().chain(self.secondary_titles.iter())
    }

    pub fn title_patterns(&self) -> &[KeywordPattern] {
        &self.title_patterns
    }

    pub fn primary_keywords(&self) -> &[KeywordPattern] {
        &self.primary_keywords
    }

    pub fn secondary_keywords(&self) -> &[KeywordPattern] {
        &self.secondary_keywords
    }

    pub fn negative_keywords(&self) -> &[KeywordPattern] {
        &self.negative_keywords
    }

    pub fn core_role_terms(&self) -> &BTreeSet<String> {
        &self.core_role_terms
    }

    pub fn salary(&self) -> SalaryRange {
        self.salary
    }

    pub fn location(&self) -> LocationPrefs {
        self.location
    }

    /// Tier for a company name (case-insensitive), if it is a target company.
    pub fn company_tier(&self, company: &str) -> Option<u8> {
        self.company_tiers
            .get(&company.trim().to_lowercase())
            .copied()
    }

    /// Search terms handed to collectors: configured titles only, deduped
    /// case-insensitively, original order.
    pub fn search_queries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.all_titles()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

/// "Senior AI Product Manager" → "ai product manager", "Product Manager, AI" →
/// "product manager"; "... manager" also yields "... management".
pub fn core_role_terms<S: AsRef<str>>(titles: &[S]) -> BTreeSet<String> {
    let mut terms = BTreeSet::new();
    for t in titles {
        let lower = t.as_ref().trim().to_lowercase();
        let stripped = SENIORITY_PREFIXES
            .iter()
            .find_map(|p| lower.strip_prefix(p))
            .unwrap_or(lower.as_str());
        let core = stripped.split(',').next().unwrap_or_default().trim();
        if core.is_empty() {
            continue;
        }
        if let Some(head) = core.strip_suffix(" manager") {
            terms.insert(format!("{head} management"));
        }
        terms.insert(core.to_string());
    }
    terms
}

/// Trim, drop empties and case-insensitive repeats (first spelling wins).
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}
