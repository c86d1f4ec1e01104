//! Subcommand implementations

pub mod efficiency;
pub mod rates;
pub mod report;
pub mod savings;
pub mod spot;

use anyhow::{Context, Result};
use impact_lib::{parse_snapshots_str, ReportMetrics, Snapshot, StructuredLogger};
use std::path::Path;

use crate::config::Settings;

/// Shared state for one invocation
pub struct Session {
    pub settings: Settings,
    pub metrics: ReportMetrics,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            metrics: ReportMetrics::new(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    /// Record and log a structure that came out unavailable
    pub fn note_unavailable(&self, logger: &StructuredLogger, metric: &str) {
        let reason = if self.settings.cutoff.is_none() {
            "missing_cutoff"
        } else {
            "empty_period"
        };
        self.metrics.inc_unavailable();
        logger.log_unavailable(metric, reason);
    }
}

/// Read and validate a snapshot feed file
pub fn load_feed(path: &Path, kind: &str) -> Result<Vec<Snapshot>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {kind} feed {}", path.display()))?;
    let snapshots = parse_snapshots_str(&content)
        .with_context(|| format!("Malformed {kind} feed {}", path.display()))?;

    StructuredLogger::new(path.display().to_string()).log_feed_loaded(kind, snapshots.len());
    Ok(snapshots)
}
