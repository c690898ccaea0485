mod config;
mod filters;
mod processor;

use anyhow::{Context, Result};
use chrono::Local;
use config::Config;
use dotenv::dotenv;
use fixture_match_core::dataset::prune_dataset_dir;
use fixture_match_core::{AliasTables, EquivalenceCache, MatchingEngine};
use log::{info, warn};
use processor::{AlertProcessor, ProcessStatus};
use std::collections::BTreeMap;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let cfg = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Starting alert resolver (dataset_dir={}, league_cache={}, team_cache={})",
        cfg.dataset_dir.display(),
        cfg.league_cache_path.display(),
        cfg.team_cache_path.display()
    );

    run_retention(&cfg);

    let engine = MatchingEngine::new(
        AliasTables::default(),
        EquivalenceCache::load(&cfg.league_cache_path),
        EquivalenceCache::load(&cfg.team_cache_path),
    );
    info!(
        "Loaded {} league and {} team equivalences",
        engine.league_cache().len(),
        engine.team_cache().len()
    );

    let processor = AlertProcessor::new(&cfg, engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut counts: BTreeMap<ProcessStatus, u64> = BTreeMap::new();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let result = processor.process_line(&line).await;
        *counts.entry(result.status).or_default() += 1;

        let mut out = serde_json::to_string(&result).context("Failed to encode result")?;
        out.push('\n');
        stdout
            .write_all(out.as_bytes())
            .await
            .context("Failed to write result")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    let summary: Vec<String> = counts
        .iter()
        .map(|(status, n)| format!("{}={}", status.as_str(), n))
        .collect();
    info!("Input closed, shutting down ({})", summary.join(", "));

    Ok(())
}

/// Prune dataset files past the retention window. Failures only warn.
fn run_retention(cfg: &Config) {
    if cfg.dataset_retention_days == 0 {
        info!("Dataset retention disabled");
        return;
    }

    let today = Local::now().date_naive();
    match prune_dataset_dir(&cfg.dataset_dir, cfg.dataset_retention_days, today) {
        Ok(report) => info!(
            "Dataset retention: removed {}, kept {}, skipped {}",
            report.removed.len(),
            report.kept,
            report.skipped.len()
        ),
        Err(e) => warn!("Dataset retention failed: {}", e),
    }
}
