// src/ingestion/config.rs
//! `IngestionConfig` (§3): the typed, explicit value threaded into the
//! coordinator for one `import` run. Never loaded implicitly, always
//! built from parsed CLI arguments (§4.8, §9 Design Notes).

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub broker_addr: String,
    pub broker_port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic: String,
    pub qos: u8,
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub workers: usize,
    pub fetch: bool,
    pub bulk_mode: bool,
    pub domain_delay: Duration,
    pub fetch_timeout: Duration,
    pub max_concurrent_domains: usize,
    pub max_failures_per_domain: u32,
    pub skip_domain_cooldown: Duration,
    pub skip_internal: bool,
    pub resume_file: Option<PathBuf>,
    pub progress_interval: Duration,
    pub publisher: Option<PublisherConfig>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            fetch: false,
            bulk_mode: false,
            domain_delay: Duration::from_millis(500),
            fetch_timeout: Duration::from_secs(10),
            max_concurrent_domains: 4,
            max_failures_per_domain: 3,
            skip_domain_cooldown: Duration::from_secs(300),
            skip_internal: false,
            resume_file: None,
            progress_interval: Duration::from_secs(10),
            publisher: None,
        }
    }
}

impl IngestionConfig {
    /// `workers` is clamped to a minimum of 1 per §4.6.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}
