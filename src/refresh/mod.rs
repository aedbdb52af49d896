//! Background refresh of the exit node store.
//!
//! One pass fetches the selected upstream list, extracts addresses and
//! upserts them with the current timestamp. The loop runs a pass immediately
//! and then on every tick of a fixed-period ticker until its cancellation
//! token fires. A failed pass is logged and counted; the loop carries on with
//! the next tick.
//!
//! Missed ticks are skipped, so a pass that overruns the interval is followed
//! by at most one immediate pass rather than a burst. Passes never overlap.

mod source;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{RefreshError, RefreshStats};
use crate::fetch::Fetcher;
use crate::storage::ExitNodeStore;

pub use source::{Source, SourceSelector};

#[cfg(test)]
mod tests;

/// Outcome of a successful refresh pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// URL the pass fetched
    pub source: String,
    /// Addresses extracted from the body (duplicates included)
    pub extracted: usize,
    /// Addresses written to the store
    pub persisted: usize,
    /// Unix seconds written as `last_seen`
    pub timestamp: i64,
}

/// Runs fetch → extract → persist passes against an injected store.
pub struct Refresher {
    fetcher: Fetcher,
    store: Arc<ExitNodeStore>,
    selector: SourceSelector,
    interval: Duration,
    stats: Arc<RefreshStats>,
}

impl Refresher {
    pub fn new(
        fetcher: Fetcher,
        store: Arc<ExitNodeStore>,
        selector: SourceSelector,
        interval: Duration,
        stats: Arc<RefreshStats>,
    ) -> Self {
        Self {
            fetcher,
            store,
            selector,
            interval,
            stats,
        }
    }

    /// Runs a single pass against the next selected source.
    ///
    /// The outcome is logged and recorded in the refresh statistics before it
    /// is returned.
    pub async fn run_pass(&self) -> Result<PassReport, RefreshError> {
        let url = self.selector.next_url().to_string();
        self.stats.record_pass_started(&url);

        let result = self.pass(&url).await;
        match &result {
            Ok(report) => {
                self.stats
                    .record_pass_succeeded(report.persisted, report.timestamp);
                info!(
                    "Refresh from {} saved {} addresses ({} parsed)",
                    report.source, report.persisted, report.extracted
                );
            }
            Err(e) => {
                self.stats.increment_failure(e.failure_type());
                warn!("Refresh from {url} failed: {e}");
            }
        }
        result
    }

    async fn pass(&self, url: &str) -> Result<PassReport, RefreshError> {
        let ips = self.fetcher.fetch_ips(url).await?;
        self.stats.record_extracted(ips.len());
        info!("parsed: {}", ips.len());

        let timestamp = Utc::now().timestamp();
        let persisted = self.store.upsert_all(&ips, timestamp).await?;

        Ok(PassReport {
            source: url.to_string(),
            extracted: ips.len(),
            persisted,
            timestamp,
        })
    }

    /// Runs passes until `cancel` fires.
    ///
    /// The first tick completes immediately, so the first pass starts right
    /// away. Cancellation also interrupts an in-flight pass; writes already
    /// committed by that pass are kept.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Refresher started ({:?} sources, every {}s)",
            self.selector.policy(),
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Refresh pass interrupted by shutdown");
                    break;
                }
                _ = self.run_pass() => {}
            }
        }

        info!("Refresher stopped");
    }

    /// Spawns [`Refresher::run`] on the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
