use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_dir: PathBuf,
    pub league_cache_path: PathBuf,
    pub team_cache_path: PathBuf,

    pub dataset_load_timeout: Duration,
    /// 0 disables pruning
    pub dataset_retention_days: u32,

    pub alert_whitelist: Vec<String>,
    pub alert_blacklist: Vec<String>,

    pub analysis_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dataset_dir = parse_path_env("DATASET_DIR", "matchday_data");
        let league_cache_path = parse_path_env("LEAGUE_CACHE_PATH", "league_equivalences.json");
        let team_cache_path = parse_path_env("TEAM_CACHE_PATH", "team_equivalences.json");

        let dataset_load_timeout = Duration::from_secs(
            parse_u64_env("DATASET_LOAD_TIMEOUT_SECS", 10).context("DATASET_LOAD_TIMEOUT_SECS")?,
        );
        let dataset_retention_days =
            parse_u32_env("DATASET_RETENTION_DAYS", 10).context("DATASET_RETENTION_DAYS")?;

        let alert_whitelist = parse_csv_env("ALERT_WHITELIST");
        let alert_blacklist = parse_csv_env("ALERT_BLACKLIST");

        let analysis_base_url = env::var("ANALYSIS_BASE_URL")
            .unwrap_or_else(|_| "https://cornerprobet.com/analysis".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            dataset_dir,
            league_cache_path,
            team_cache_path,
            dataset_load_timeout,
            dataset_retention_days,
            alert_whitelist,
            alert_blacklist,
            analysis_base_url,
        })
    }
}

fn parse_path_env(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Comma-separated list; unset or blank means empty.
fn parse_csv_env(key: &str) -> Vec<String> {
    env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer)"))
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer)"))
}
