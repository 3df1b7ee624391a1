// src/fetch/http.rs
//! Bulk-mode HTTP metadata fetcher: per-host serialization, a global cap
//! on concurrently in-flight hosts, and failure-accounting cooldown
//! (§4.2, §5). Non-bulk mode skips all of this and issues a plain,
//! timeout-bounded GET.

use super::extract::extract;
use super::{FetchConfig, FetchOutcome, MetadataFetcher, PageContent};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, instrument, warn};
use url::{Host, Url};

/// Per-host bookkeeping (§3). `request_lock` is the actual serialization
/// primitive, held for the duration of one request to this host, while
/// the enclosing map's mutex only ever guards looking the entry up or
/// inserting it, a short critical section that never spans the network
/// call itself (§5).
struct DomainState {
    request_lock: Arc<Mutex<()>>,
    last_request: Option<Instant>,
    consecutive_failures: u32,
    cooldown_until: Option<Instant>,
}

impl DomainState {
    fn new() -> Self {
        Self {
            request_lock: Arc::new(Mutex::new(())),
            last_request: None,
            consecutive_failures: 0,
            cooldown_until: None,
        }
    }
}

pub struct HttpMetadataFetcher {
    client: reqwest::Client,
    config: FetchConfig,
    domains: Mutex<HashMap<String, DomainState>>,
    domain_cap: Semaphore,
    requests_issued: AtomicU32,
}

impl HttpMetadataFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        let domain_cap = Semaphore::new(config.max_concurrent_domains.max(1));

        Ok(Self {
            client,
            config,
            domains: Mutex::new(HashMap::new()),
            domain_cap,
            requests_issued: AtomicU32::new(0),
        })
    }

    /// Total number of requests that actually reached the network. Used
    /// by tests asserting the cooldown law (§8 invariant 6).
    pub fn requests_issued(&self) -> u32 {
        self.requests_issued.load(Ordering::SeqCst)
    }

    async fn fetch_plain(&self, url: &str) -> FetchOutcome {
        match self.client.get(url).send().await {
            Ok(response) => classify_success(response, &self.client).await,
            Err(e) => FetchOutcome::Failed {
                reason: describe_error(&e),
                retryable: true,
            },
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_bulk(&self, url: &str, host: String) -> FetchOutcome {
        // Cooldown check + request-lock handoff: a short critical section
        // over the map only (§5).
        let request_lock = {
            let mut domains = self.domains.lock().await;
            let state = domains.entry(host.clone()).or_insert_with(DomainState::new);

            if let Some(until) = state.cooldown_until {
                if Instant::now() < until {
                    debug!(host = %host, "domain in cooldown, skipping network I/O");
                    return FetchOutcome::SkippedDomain;
                }
            }
            state.request_lock.clone()
        };

        let _domain_permit = match self.domain_cap.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return FetchOutcome::Failed {
                    reason: "fetcher shutting down".to_string(),
                    retryable: false,
                }
            }
        };

        // Held for the duration of the request: this is what makes
        // requests to the same host serialize (§4.2).
        let _host_guard = request_lock.lock().await;

        let wait = {
            let domains = self.domains.lock().await;
            domains
                .get(&host)
                .and_then(|s| s.last_request)
                .map(|last| self.config.domain_delay.saturating_sub(last.elapsed()))
                .unwrap_or(Duration::ZERO)
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        self.requests_issued.fetch_add(1, Ordering::SeqCst);
        let outcome = match self.client.get(url).send().await {
            Ok(response) => classify_success(response, &self.client).await,
            Err(e) => FetchOutcome::Failed {
                reason: describe_error(&e),
                retryable: true,
            },
        };

        self.record_outcome(&host, &outcome).await;
        outcome
    }

    async fn record_outcome(&self, host: &str, outcome: &FetchOutcome) {
        let mut domains = self.domains.lock().await;
        let state = domains
            .entry(host.to_string())
            .or_insert_with(DomainState::new);
        state.last_request = Some(Instant::now());

        // A network error or 5xx counts as a failure; 2xx and non-server
        // (4xx) responses reset the counter (§4.2).
        let is_failure = matches!(
            outcome,
            FetchOutcome::Failed { retryable: true, .. }
        );
        if is_failure {
            state.consecutive_failures += 1;
            if state.consecutive_failures >= self.config.max_failures_per_domain {
                state.cooldown_until = Some(Instant::now() + self.config.skip_domain_cooldown);
                warn!(host = %host, failures = state.consecutive_failures, "domain entering cooldown");
            }
        } else if !matches!(outcome, FetchOutcome::SkippedDomain | FetchOutcome::SkippedInternal) {
            state.consecutive_failures = 0;
        }
    }

    async fn is_internal(&self, url: &Url) -> bool {
        match url.host() {
            Some(Host::Ipv4(ip)) => is_internal_ipv4(ip),
            Some(Host::Ipv6(ip)) => is_internal_ipv6(ip),
            Some(Host::Domain(domain)) => {
                if domain.eq_ignore_ascii_case("localhost") {
                    return true;
                }
                match tokio::net::lookup_host((domain, 0)).await {
                    Ok(addrs) => addrs.map(|a| a.ip()).any(|ip| match ip {
                        IpAddr::V4(v4) => is_internal_ipv4(v4),
                        IpAddr::V6(v6) => is_internal_ipv6(v6),
                    }),
                    Err(_) => false,
                }
            }
            None => false,
        }
    }
}

fn is_internal_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local()
}

fn is_internal_ipv6(ip: Ipv6Addr) -> bool {
    ip.is_loopback() || (ip.segments()[0] & 0xfe00) == 0xfc00 || (ip.segments()[0] & 0xffc0) == 0xfe80
}

async fn classify_success(response: reqwest::Response, _client: &reqwest::Client) -> FetchOutcome {
    let status = response.status();
    if status.is_server_error() {
        return FetchOutcome::Failed {
            reason: format!("server error: {}", status),
            retryable: true,
        };
    }
    if !status.is_success() {
        return FetchOutcome::Failed {
            reason: format!("HTTP {}", status),
            retryable: false,
        };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Success(extract_or_empty(&body)),
        Err(e) => FetchOutcome::Failed {
            reason: describe_error(&e),
            retryable: true,
        },
    }
}

fn extract_or_empty(body: &str) -> PageContent {
    extract(body)
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timeout".to_string()
    } else if e.is_connect() {
        format!("connection error: {}", e)
    } else {
        e.to_string()
    }
}

#[async_trait::async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                return FetchOutcome::Failed {
                    reason: format!("invalid url: {}", e),
                    retryable: false,
                }
            }
        };

        if self.config.skip_internal && self.is_internal(&parsed).await {
            return FetchOutcome::SkippedInternal;
        }

        if !self.config.bulk_mode {
            return self.fetch_plain(url).await;
        }

        let host = match parsed.host_str() {
            Some(h) => h.to_string(),
            None => {
                return FetchOutcome::Failed {
                    reason: "url has no host".to_string(),
                    retryable: false,
                }
            }
        };
        self.fetch_bulk(url, host).await
    }
}
