// tests/scorer.rs
use job_radar::matching::KeywordMatcher;
use job_radar::posting::Posting;
use job_radar::profile::Profile;
use job_radar::scorer::{filter_by_score, fingerprint, top_jobs, JobScorer};
use std::sync::Arc;

const TEST_TOML: &str = r#"
negative_keywords = ["intern"]

[target_titles]
primary = ["Data Scientist"]
secondary = ["ML Engineer"]

[required_keywords]
primary = ["python", "statistics", "pytorch"]
secondary = ["sql"]

[target_companies]
tier1 = ["Acme"]
"#;

fn scorer(min_score: f64) -> JobScorer {
    let profile = Profile::from_toml_str(TEST_TOML).expect("inline profile");
    JobScorer::from_matcher(KeywordMatcher::new(Arc::new(profile)), min_score)
}

fn posting(title: &str, company: &str, source: &str, desc: &str) -> Posting {
    Posting::new(title, company, format!("https://{source}.example/{title}"), source)
        .with_description(desc)
}

#[test]
fn malformed_postings_are_skipped_not_fatal() {
    let s = scorer(0.0);
    let batch = vec![
        posting("", "Globex", "lever", "python"),
        posting("Data Scientist", "nan", "lever", "python"),
        Posting::new("Data Scientist", "Globex", "", "lever"),
        posting("Data Scientist", "Globex", "lever", "python statistics"),
    ];
    let (out, stats) = s.score_jobs_with_stats(&batch);
    assert_eq!(out.len(), 1);
    assert_eq!(stats.invalid, 3);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.kept, 1);
}

#[test]
fn output_is_sorted_and_above_threshold() {
    let s = scorer(20.0);
    let batch = vec![
        posting("ML Engineer", "Globex", "lever", "python"),
        posting("Data Scientist", "Acme", "greenhouse", "python statistics pytorch sql"),
        posting("Data Scientist", "Initech", "lever", "python statistics"),
        posting("Chef", "Diner", "lever", "python"),
    ];
    let out = s.score_jobs(&batch);
    assert!(!out.is_empty());
    assert!(out.windows(2).all(|w| w[0].score() >= w[1].score()));
    assert!(out.iter().all(|j| j.score() >= 20.0));
    assert_eq!(out[0].posting.company, "Acme");
    assert!(out.iter().all(|j| j.posting.title != "Chef"));
}

#[test]
fn threshold_is_clamped_and_nan_falls_back() {
    assert_eq!(scorer(250.0).min_score(), 100.0);
    assert_eq!(scorer(-3.0).min_score(), 0.0);
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let s = scorer(bad);
        assert_eq!(s.min_score(), 30.0);
        // the fallback threshold still filters
        let out = s.score_jobs(&[posting("Chef", "Diner", "lever", "python")]);
        assert!(out.is_empty());
    }
}

#[test]
fn equal_scores_keep_input_order() {
    let s = scorer(0.0);
    let batch: Vec<Posting> = (0..20)
        .map(|i| posting("Data Scientist", &format!("Co{i}"), "lever", "python"))
        .collect();
    let out = s.score_jobs(&batch);
    let companies: Vec<&str> = out.iter().map(|j| j.posting.company.as_str()).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("Co{i}")).collect();
    assert_eq!(companies, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn same_role_from_two_boards_shares_fingerprint() {
    let s = scorer(0.0);
    let out = s.score_jobs(&[
        posting("Data Scientist", "Globex Inc.", "greenhouse", "python"),
        posting("DATA SCIENTIST", " globex ", "lever", "python"),
    ]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].fingerprint, out[1].fingerprint);
    assert_eq!(out[0].fingerprint, fingerprint("Globex", "Data Scientist"));
}

#[test]
fn filter_and_top_helpers() {
    let s = scorer(0.0);
    let out = s.score_jobs(&[
        posting("Data Scientist", "Acme", "a", "python statistics pytorch"),
        posting("Data Scientist", "Globex", "b", "python"),
        posting("ML Engineer", "Initech", "c", "sql and python"),
    ]);
    let cut = out[1].score();
    assert_eq!(out.len(), 3);
    let high = filter_by_score(&out, cut);
    assert!(high.len() >= 2);
    assert!(high.iter().all(|j| j.score() >= cut));

    assert_eq!(top_jobs(&out, 1).len(), 1);
    assert_eq!(top_jobs(&out, 99).len(), out.len());
    assert_eq!(s.filter_by_min_score(&out).len(), out.len());
}

#[test]
fn min_score_is_clamped() {
    assert_eq!(scorer(-10.0).min_score(), 0.0);
    assert_eq!(scorer(1e9).min_score(), 100.0);
    let batch = [posting("Data Scientist", "Globex", "x", "python")];
    assert!(scorer(100.0).score_jobs(&batch).is_empty());
}
