// tests/metrics_scan.rs
#![cfg(feature = "strict-metrics")]
use anyhow::Result;
use job_radar::dedup::{Deduplicator, MemoryStore};
use job_radar::matching::KeywordMatcher;
use job_radar::pipeline::{PostingSource, ScanPipeline};
use job_radar::posting::Posting;
use job_radar::profile::Profile;
use job_radar::scorer::JobScorer;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;

struct Fixture;

#[async_trait::async_trait]
impl PostingSource for Fixture {
    async fn collect(&self, _queries: &[String]) -> Result<Vec<Posting>> {
        Ok(vec![
            Posting::new("Data Scientist", "Globex", "https://g/1", "fixture")
                .with_description("python"),
            Posting::new("Data Scientist", "Globex Inc", "https://g/2", "fixture")
                .with_description("python"),
            Posting::new("", "Nobody", "https://n/1", "fixture"),
        ])
    }
    fn name(&self) -> &str {
        "fixture"
    }
}

struct Broken;

#[async_trait::async_trait]
impl PostingSource for Broken {
    async fn collect(&self, _queries: &[String]) -> Result<Vec<Posting>> {
        anyhow::bail!("timeout")
    }
    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn metrics_exposed_after_scan() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let profile = Arc::new(
        Profile::from_toml_str(
            r#"
[target_titles]
primary = ["Data Scientist"]
[required_keywords]
primary = ["python"]
"#,
        )
        .unwrap(),
    );
    let scorer = JobScorer::from_matcher(KeywordMatcher::new(profile.clone()), 0.0);
    let p = ScanPipeline::new(&profile, scorer, Deduplicator::new(MemoryStore::new(), 30), 0.0, 5);

    let sources: Vec<Box<dyn PostingSource>> = vec![Box::new(Fixture), Box::new(Broken)];
    let report = p.run_scan(&sources).await.unwrap();
    assert_eq!(report.new_jobs.len(), 1);

    // Scrape metrics text and check series presence by substring
    let out = handle.render();
    for name in [
        "scan_collected_total",
        "scan_source_errors_total",
        "scorer_invalid_total",
        "scorer_matched_total",
        "dedup_dropped_total",
        "scan_new_total",
        "scan_last_run_ts",
    ] {
        assert!(out.contains(name), "missing {name} in:\n{out}");
    }
}
