//! Metric names and one-time registration so series show up on any installed recorder.

use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

pub const SCAN_COLLECTED_TOTAL: &str = "scan_collected_total";
pub const SCAN_SOURCE_ERRORS_TOTAL: &str = "scan_source_errors_total";
pub const SCAN_NEW_TOTAL: &str = "scan_new_total";
pub const SCAN_LAST_RUN_TS: &str = "scan_last_run_ts";
pub const SCORER_INVALID_TOTAL: &str = "scorer_invalid_total";
pub const SCORER_MATCHED_TOTAL: &str = "scorer_matched_total";
pub const DEDUP_DROPPED_TOTAL: &str = "dedup_dropped_total";

pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(SCAN_COLLECTED_TOTAL, "Postings returned by collectors.");
        describe_counter!(
            SCAN_SOURCE_ERRORS_TOTAL,
            "Collector failures (scan continued)."
        );
        describe_counter!(SCAN_NEW_TOTAL, "Postings that survived dedup.");
        describe_gauge!(SCAN_LAST_RUN_TS, "Unix ts when a scan last finished.");
        describe_counter!(
            SCORER_INVALID_TOTAL,
            "Postings skipped for missing required fields."
        );
        describe_counter!(
            SCORER_MATCHED_TOTAL,
            "Postings that matched and passed the score threshold."
        );
        describe_counter!(
            DEDUP_DROPPED_TOTAL,
            "Scored postings dropped as already seen."
        );
    });
}
