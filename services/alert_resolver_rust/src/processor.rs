use crate::config::Config;
use crate::filters::AlertFilter;
use anyhow::{anyhow, Context, Result};
use fixture_match_core::{analysis_url, extract, AlertOutcome, FixtureIndex, MatchingEngine};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// One forwarded alert, as posted by the message forwarder.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundAlert {
    pub text: String,
    #[serde(default)]
    pub from: Option<String>,
    /// Passed through untouched; forwarders send either epoch seconds or a string
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Resolved,
    NotFound,
    InvalidLeague,
    NotExtractable,
    Filtered,
    Error,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Resolved => "resolved",
            ProcessStatus::NotFound => "not_found",
            ProcessStatus::InvalidLeague => "invalid_league",
            ProcessStatus::NotExtractable => "not_extractable",
            ProcessStatus::Filtered => "filtered",
            ProcessStatus::Error => "error",
        }
    }
}

/// One output line per input line.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedAlert {
    pub status: ProcessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AlertOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_url: Option<String>,
}

impl ProcessedAlert {
    fn new(status: ProcessStatus) -> Self {
        Self {
            status,
            from: None,
            timestamp: None,
            reason: None,
            outcome: None,
            analysis_url: None,
        }
    }

    fn failed(reason: String) -> Self {
        Self {
            reason: Some(reason),
            ..Self::new(ProcessStatus::Error)
        }
    }
}

pub struct AlertProcessor {
    engine: Arc<MatchingEngine>,
    filter: AlertFilter,
    dataset_dir: PathBuf,
    load_timeout: Duration,
    analysis_base_url: String,
}

impl AlertProcessor {
    pub fn new(cfg: &Config, engine: MatchingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            filter: AlertFilter::from_config(cfg),
            dataset_dir: cfg.dataset_dir.clone(),
            load_timeout: cfg.dataset_load_timeout,
            analysis_base_url: cfg.analysis_base_url.clone(),
        }
    }

    /// Handle one raw input line. Never fails: problems become `Error` results.
    pub async fn process_line(&self, line: &str) -> ProcessedAlert {
        let inbound: InboundAlert = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to parse inbound alert: {}", e);
                return ProcessedAlert::failed(format!("invalid_json: {}", e));
            }
        };

        let from = inbound.from.clone();
        let timestamp = inbound.timestamp.clone();
        let mut result = match self.process(inbound).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Alert processing failed: {:#}", e);
                ProcessedAlert::failed(format!("{:#}", e))
            }
        };
        result.from = from;
        result.timestamp = timestamp;
        result
    }

    async fn process(&self, inbound: InboundAlert) -> Result<ProcessedAlert> {
        let (accepted, reason) = self.filter.should_process(&inbound.text);
        if !accepted {
            info!("Alert filtered: {}", reason.as_deref().unwrap_or("unknown"));
            return Ok(ProcessedAlert {
                reason,
                ..ProcessedAlert::new(ProcessStatus::Filtered)
            });
        }

        let Some(alert) = extract(&inbound.text) else {
            return Ok(ProcessedAlert {
                outcome: Some(AlertOutcome::NotExtractable),
                ..ProcessedAlert::new(ProcessStatus::NotExtractable)
            });
        };

        let index = self.load_index().await?;

        let engine = Arc::clone(&self.engine);
        let outcome = tokio::task::spawn_blocking(move || engine.resolve_extracted(&index, alert))
            .await
            .context("resolution task panicked")?;

        let (status, url) = match &outcome {
            AlertOutcome::Resolved { resolution } => (
                ProcessStatus::Resolved,
                Some(analysis_url(
                    &self.analysis_base_url,
                    &resolution.home,
                    &resolution.away,
                    &resolution.fixture_id,
                )),
            ),
            AlertOutcome::NotFound { .. } => (ProcessStatus::NotFound, None),
            AlertOutcome::InvalidLeague { .. } => (ProcessStatus::InvalidLeague, None),
            AlertOutcome::NotExtractable => (ProcessStatus::NotExtractable, None),
        };

        Ok(ProcessedAlert {
            outcome: Some(outcome),
            analysis_url: url,
            ..ProcessedAlert::new(status)
        })
    }

    /// Read the newest dataset off the runtime, bounded by the load timeout.
    async fn load_index(&self) -> Result<FixtureIndex> {
        let dir = self.dataset_dir.clone();
        let task = tokio::task::spawn_blocking(move || FixtureIndex::load_latest(&dir));

        let index = tokio::time::timeout(self.load_timeout, task)
            .await
            .map_err(|_| {
                anyhow!(
                    "dataset load timed out after {}s",
                    self.load_timeout.as_secs()
                )
            })?
            .context("dataset load task panicked")??;

        Ok(index)
    }
}
