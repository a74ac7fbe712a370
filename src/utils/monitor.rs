use crate::domain::model::PassReport;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct PassStats {
    pub passes: u64,
    pub elements_seen: u64,
    pub elements_written: u64,
    pub total_time: Duration,
    pub slowest_pass: Duration,
    pub last_pass_at: Option<DateTime<Utc>>,
}

/// Collects timing for replacement passes. Disabled monitors still count
/// passes but stay silent.
#[derive(Debug, Clone, Default)]
pub struct PassMonitor {
    stats: PassStats,
    enabled: bool,
}

impl PassMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            stats: PassStats::default(),
            enabled,
        }
    }

    pub fn record(&mut self, report: &PassReport, elapsed: Duration) {
        let stats = &mut self.stats;
        stats.passes += 1;
        stats.elements_seen += (report.containers + report.standalone) as u64;
        stats.elements_written += report.written() as u64;
        stats.total_time += elapsed;
        stats.slowest_pass = stats.slowest_pass.max(elapsed);
        stats.last_pass_at = Some(Utc::now());

        if self.enabled {
            tracing::info!(
                "📊 Pass #{} - {} elements, {} written, {} skipped, took {:?}",
                stats.passes,
                report.containers + report.standalone,
                report.written(),
                report.skipped,
                elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let stats = &self.stats;
        tracing::info!(
            "📊 Final Stats - {} passes, {} elements written, total {:?}, slowest {:?}",
            stats.passes,
            stats.elements_written,
            stats.total_time,
            stats.slowest_pass
        );
    }

    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    pub fn passes(&self) -> u64 {
        self.stats.passes
    }
}
