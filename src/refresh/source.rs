//! Upstream source selection.
//!
//! Two lists are known: the structured exit-addresses listing and the bulk
//! exit list. The selector decides which one each refresh pass fetches.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::config::{Config, SourcePolicy};

/// One of the two upstream exit node lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    ExitAddresses,
    BulkExitList,
}

impl Source {
    /// All sources in alternation order.
    pub const ALL: [Source; 2] = [Source::ExitAddresses, Source::BulkExitList];

    fn index(self) -> usize {
        match self {
            Source::ExitAddresses => 0,
            Source::BulkExitList => 1,
        }
    }
}

/// Picks the source URL for each pass according to a [`SourcePolicy`].
///
/// `Random` resolves to a fixed source once, at construction; only
/// `Alternate` changes the source between passes.
#[derive(Debug)]
pub struct SourceSelector {
    urls: [String; 2],
    policy: SourcePolicy,
    fixed: Option<Source>,
    cursor: AtomicUsize,
}

impl SourceSelector {
    pub fn new(
        policy: SourcePolicy,
        exit_addresses_url: impl Into<String>,
        bulk_exit_list_url: impl Into<String>,
    ) -> Self {
        let fixed = match policy {
            SourcePolicy::Alternate => None,
            SourcePolicy::Random => Some(Source::ALL[rand::rng().random_range(0..Source::ALL.len())]),
            SourcePolicy::ExitAddresses => Some(Source::ExitAddresses),
            SourcePolicy::BulkExitList => Some(Source::BulkExitList),
        };

        Self {
            urls: [exit_addresses_url.into(), bulk_exit_list_url.into()],
            policy,
            fixed,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.source_policy,
            config.exit_addresses_url.clone(),
            config.bulk_exit_list_url.clone(),
        )
    }

    pub fn policy(&self) -> SourcePolicy {
        self.policy
    }

    /// Source for the next pass; advances the rotation under `Alternate`.
    pub fn next_source(&self) -> Source {
        match self.fixed {
            Some(source) => source,
            None => {
                let n = self.cursor.fetch_add(1, Ordering::Relaxed);
                Source::ALL[n % Source::ALL.len()]
            }
        }
    }

    /// URL for the next pass.
    pub fn next_url(&self) -> &str {
        self.url(self.next_source())
    }

    pub fn url(&self, source: Source) -> &str {
        &self.urls[source.index()]
    }
}
