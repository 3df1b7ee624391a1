// src/fetch/mod.rs
//! Metadata Fetcher (C2): a polite HTTP client that extracts page metadata
//! under a per-domain politeness policy. See `http` for the bulk-mode
//! implementation and `extract` for the HTML extraction rules (§4.2).

pub mod extract;
pub mod http;

use std::time::Duration;

/// Configuration consumed by the fetcher, immutable for the life of a
/// pipeline run (§3).
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub domain_delay: Duration,
    pub max_concurrent_domains: usize,
    pub max_failures_per_domain: u32,
    pub skip_domain_cooldown: Duration,
    pub bulk_mode: bool,
    pub skip_internal: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("bkmr-ingest/{}", env!("CARGO_PKG_VERSION")),
            domain_delay: Duration::from_millis(500),
            max_concurrent_domains: 4,
            max_failures_per_domain: 3,
            skip_domain_cooldown: Duration::from_secs(300),
            bulk_mode: false,
            skip_internal: false,
        }
    }
}

/// `(title, description, tags)` extracted from a fetched page (§3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Outcome of one fetch attempt, tagged per the retry-classification
/// contract in §4.2. The coordinator, not the fetcher, decides what to
/// do with `retryable`; today nothing retries within a run (§9 Open
/// Question).
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(PageContent),
    Failed { reason: String, retryable: bool },
    SkippedDomain,
    SkippedInternal,
}

/// A fetcher is always an explicitly constructed value parameterised by
/// `FetchConfig`; there is no process-wide default instance (§9).
#[async_trait::async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}
