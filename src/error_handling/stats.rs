//! Refresh statistics tracking.
//!
//! This module provides thread-safe counters describing what the refresher
//! has done since the process started. They are read by the status server
//! and logged after every pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::RwLock;
use strum::IntoEnumIterator;

use super::types::FailureType;

/// Thread-safe refresh statistics tracker.
///
/// Every failure category is initialized to zero on creation, so counters
/// can be incremented from any task through a shared `Arc<RefreshStats>`.
pub struct RefreshStats {
    failures: HashMap<FailureType, AtomicUsize>,
    passes_started: AtomicUsize,
    passes_succeeded: AtomicUsize,
    last_extracted: AtomicUsize,
    total_persisted: AtomicUsize,
    /// Unix seconds of the last successful pass, 0 if none yet
    last_success_at: AtomicI64,
    last_source: RwLock<Option<String>>,
}

impl RefreshStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for failure in FailureType::iter() {
            failures.insert(failure, AtomicUsize::new(0));
        }

        RefreshStats {
            failures,
            passes_started: AtomicUsize::new(0),
            passes_succeeded: AtomicUsize::new(0),
            last_extracted: AtomicUsize::new(0),
            total_persisted: AtomicUsize::new(0),
            last_success_at: AtomicI64::new(0),
            last_source: RwLock::new(None),
        }
    }

    /// Records the start of a pass against `source`.
    pub fn record_pass_started(&self, source: &str) {
        self.passes_started.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_source.write() {
            *last = Some(source.to_string());
        }
    }

    /// Records the number of addresses the extractor produced in the current pass.
    pub fn record_extracted(&self, count: usize) {
        self.last_extracted.store(count, Ordering::Relaxed);
    }

    /// Records a completed pass that persisted `persisted` addresses at `timestamp`.
    pub fn record_pass_succeeded(&self, persisted: usize, timestamp: i64) {
        self.passes_succeeded.fetch_add(1, Ordering::Relaxed);
        self.total_persisted.fetch_add(persisted, Ordering::Relaxed);
        self.last_success_at.store(timestamp, Ordering::Relaxed);
    }

    /// Increment a failure counter.
    ///
    /// Every category is inserted by `new()`, so a miss indicates a bug; it is
    /// logged instead of panicking.
    pub fn increment_failure(&self, failure: FailureType) {
        if let Some(counter) = self.failures.get(&failure) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                failure
            );
        }
    }

    /// Get the count for a failure category.
    pub fn get_failure_count(&self, failure: FailureType) -> usize {
        self.failures
            .get(&failure)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of failed passes (store read failures are not passes).
    pub fn total_failed_passes(&self) -> usize {
        FailureType::iter()
            .filter(|f| *f != FailureType::StoreRead)
            .map(|f| self.get_failure_count(f))
            .sum()
    }

    /// Total fetch-stage failures across all fetch categories.
    pub fn total_fetch_failures(&self) -> usize {
        FailureType::iter()
            .filter(FailureType::is_fetch)
            .map(|f| self.get_failure_count(f))
            .sum()
    }

    pub fn passes_started(&self) -> usize {
        self.passes_started.load(Ordering::SeqCst)
    }

    pub fn passes_succeeded(&self) -> usize {
        self.passes_succeeded.load(Ordering::SeqCst)
    }

    pub fn last_extracted(&self) -> usize {
        self.last_extracted.load(Ordering::SeqCst)
    }

    pub fn total_persisted(&self) -> usize {
        self.total_persisted.load(Ordering::SeqCst)
    }

    /// Unix seconds of the last successful pass, `None` before the first one.
    pub fn last_success_at(&self) -> Option<i64> {
        match self.last_success_at.load(Ordering::SeqCst) {
            0 => None,
            ts => Some(ts),
        }
    }

    pub fn last_source(&self) -> Option<String> {
        self.last_source.read().ok().and_then(|s| s.clone())
    }
}

impl Default for RefreshStats {
    fn default() -> Self {
        Self::new()
    }
}
