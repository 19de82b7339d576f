// src/logging.rs
//! Tracing setup plus the dev-only, anonymized match diagnostics.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_DEV_LOG: &str = "JOB_RADAR_DEV_LOG";
pub const ENV_LOG_FORMAT: &str = "JOB_RADAR_LOG_FORMAT";
pub const ENV_RUN_ENV: &str = "JOB_RADAR_ENV";

const DEFAULT_FILTER: &str = "job_radar=info,warn";

/// Install the global subscriber. `RUST_LOG` wins over the default filter;
/// `JOB_RADAR_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // try_init: a second call (tests, embedding apps) must not panic
    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing already initialized");
    }
}

// Dev logging gate: JOB_RADAR_DEV_LOG=1 AND dev env (debug build or JOB_RADAR_ENV in {local,development,dev})
static DEV_LOGGING: Lazy<bool> = Lazy::new(|| {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var(ENV_RUN_ENV)
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
});

pub(crate) fn dev_logging_enabled() -> bool {
    *DEV_LOGGING
}

/// Short, stable id for a piece of text (first 6 bytes of SHA-256, hex).
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}
