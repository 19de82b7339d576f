//! job-radar: run one scan over a JSON array of postings and print what's worth a look.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use job_radar::logging::init_tracing;
use job_radar::matching::build_engine;
use job_radar::pipeline::{JsonFileSource, PostingSource, ScanPipeline};
use job_radar::{JsonlStore, Profile, Settings};

#[derive(Parser)]
#[command(name = "job-radar")]
#[command(about = "Score, dedup and rank job postings against your profile", long_about = None)]
struct Cli {
    /// JSON file holding an array of postings
    postings: PathBuf,

    /// Profile TOML/JSON (overrides JOB_RADAR_PROFILE_PATH)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// JSON-lines store of previously seen jobs (overrides JOB_RADAR_STORE_PATH)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Minimum score to keep a posting, 0-100
    #[arg(long)]
    min_score: Option<f64>,

    /// How many notification candidates to print
    #[arg(long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(p) = cli.profile {
        settings.profile_path = p;
    }
    if let Some(s) = cli.store {
        settings.store_path = s;
    }
    if let Some(m) = cli.min_score {
        if !m.is_finite() {
            anyhow::bail!("--min-score must be a finite number, got {m}");
        }
        settings.min_score = m.clamp(0.0, 100.0);
    }
    if let Some(n) = cli.top {
        settings.top_n = n;
    }

    let profile = Arc::new(Profile::load_from(&settings.profile_path)?);
    let engine = build_engine(settings.scoring_engine, profile.clone());
    let store = JsonlStore::new(settings.store_path.clone());
    let pipeline = ScanPipeline::from_settings(&settings, &profile, engine, store);

    let sources: Vec<Box<dyn PostingSource>> =
        vec![Box::new(JsonFileSource::new(cli.postings.clone()))];
    let report = pipeline.run_scan(&sources).await?;

    info!(
        collected = report.collected,
        new = report.new_jobs.len(),
        saved = report.saved,
        "scan complete"
    );

    if report.notify.is_empty() {
        println!("No new postings above {:.0}.", settings.notify_min_score);
        return Ok(());
    }
    for (i, s) in report.notify.iter().enumerate() {
        let p = &s.posting;
        println!(
            "{:>2}. [{:5.1}] {} @ {} ({})",
            i + 1,
            s.score(),
            p.title,
            p.company,
            p.source
        );
        println!("    {}", p.apply_url.as_deref().unwrap_or(&p.url));
        let kws = s.matched_keywords();
        if !kws.is_empty() {
            println!("    matched: {}", kws.join(", "));
        }
    }
    Ok(())
}
