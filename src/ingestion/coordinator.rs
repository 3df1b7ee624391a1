// src/ingestion/coordinator.rs
//! Ingestion Coordinator (C6): orchestrates parse→dedup→enrich→persist→
//! publish over a worker pool, with resume and graceful cancellation
//! (§4.6).

use super::config::IngestionConfig;
use super::progress::{read_resume_cursor, ImportProgress};
use crate::domain::bookmark::Bookmark;
use crate::domain::repositories::bookmark_repository::BookmarkRepository;
use crate::fetch::{FetchOutcome, MetadataFetcher};
use crate::parsers::ImportCandidate;
use crate::publish::{EventPublisher, ImportedEvent};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Aggregate outcome of one `import` run (§4.6 step 7, §7).
///
/// `duplicates_skipped` counts only cross-batch collisions (an existing
/// repository row), so `parsed_unique == created + duplicates_skipped +
/// errors` holds per §8 invariant 3: `parsed_unique` is already the
/// post-intra-dedup count, so in-batch repeats must not be counted again
/// here. `intra_batch_duplicates` reports those separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResult {
    pub parsed_unique: u64,
    pub created: u64,
    pub duplicates_skipped: u64,
    pub intra_batch_duplicates: u64,
    pub errors: u64,
    pub cancelled: bool,
}

pub struct Coordinator {
    repository: Arc<dyn BookmarkRepository>,
    fetcher: Option<Arc<dyn MetadataFetcher>>,
    publisher: Arc<dyn EventPublisher>,
    config: IngestionConfig,
}

impl Coordinator {
    pub fn new(
        repository: Arc<dyn BookmarkRepository>,
        fetcher: Option<Arc<dyn MetadataFetcher>>,
        publisher: Arc<dyn EventPublisher>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            repository,
            fetcher,
            publisher,
            config,
        }
    }

    /// Runs the full pipeline over `candidates` (already parsed, in
    /// document order). `source` tags every published event (§4.5).
    #[instrument(level = "info", skip(self, candidates, cancel))]
    pub async fn run(
        &self,
        candidates: Vec<ImportCandidate>,
        source: &str,
        cancel: CancellationToken,
    ) -> IngestResult {
        let (unique, intra_batch_duplicates) = dedup_intra_batch(candidates);

        let resume_base = match &self.config.resume_file {
            Some(path) => read_resume_cursor(path).unwrap_or(0),
            None => 0,
        };
        let skip = resume_base.min(unique.len() as u64) as usize;
        if skip > 0 {
            info!(skip, "resuming import, skipping already-attempted candidates");
        }
        let work: Vec<ImportCandidate> = unique.into_iter().skip(skip).collect();
        let total = work.len() as u64;

        let progress = ImportProgress::new(total, self.config.resume_file.clone(), resume_base);
        let cross_batch_duplicates = Arc::new(AtomicU64::new(0));

        let (tx, rx) = mpsc::channel::<ImportCandidate>(self.config.worker_count() * 4);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut handles = Vec::new();
        for _ in 0..self.config.worker_count() {
            let rx = rx.clone();
            let repository = self.repository.clone();
            let fetcher = self.fetcher.clone();
            let publisher = self.publisher.clone();
            let progress = progress.clone();
            let cross_batch_duplicates = cross_batch_duplicates.clone();
            let fetch_enabled = self.config.fetch || self.config.bulk_mode;
            let source = source.to_string();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let candidate = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    let Some(candidate) = candidate else { break };

                    process_one(
                        candidate,
                        &repository,
                        fetcher.as_deref(),
                        publisher.as_ref(),
                        fetch_enabled,
                        &source,
                        &progress,
                        &cross_batch_duplicates,
                    )
                    .await;

                    if cancel.is_cancelled() {
                        break;
                    }
                }
            }));
        }

        let progress_ticker = {
            let progress = progress.clone();
            let cancel = cancel.clone();
            let interval = self.config.progress_interval;
            tokio::spawn(async move { report_progress(progress, cancel, interval).await })
        };

        let dispatch_cancel = cancel.clone();
        let dispatched = dispatch(tx, work, dispatch_cancel).await;
        let cancelled = dispatched < total;

        for handle in handles {
            let _ = handle.await;
        }
        cancel.cancel();
        let _ = progress_ticker.await;

        if let Err(e) = progress.persist_final() {
            warn!(error = %e, "failed to persist final resume cursor");
        }

        let stored_count = self.repository.count().unwrap_or(-1);
        info!(stored_count, "verified repository count after run");

        let processed = progress.processed();
        let cross_batch = cross_batch_duplicates.load(Ordering::SeqCst);
        if intra_batch_duplicates > 0 {
            info!(intra_batch_duplicates, "dropped in-batch duplicate candidates");
        }
        IngestResult {
            parsed_unique: total + skip as u64,
            created: processed.saturating_sub(progress.errors()).saturating_sub(cross_batch),
            duplicates_skipped: cross_batch,
            intra_batch_duplicates,
            errors: progress.errors(),
            cancelled,
        }
    }
}

/// Collapses repeats within the parsed stream, preserving first-seen
/// order (§4.4 stage 1). Returns the unique candidates and a count of
/// how many were dropped.
fn dedup_intra_batch(candidates: Vec<ImportCandidate>) -> (Vec<ImportCandidate>, u64) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(candidates.len());
    let mut dropped = 0u64;

    for candidate in candidates {
        if seen.insert(candidate.url.clone()) {
            unique.push(candidate);
        } else {
            dropped += 1;
        }
    }
    (unique, dropped)
}

async fn dispatch(
    tx: mpsc::Sender<ImportCandidate>,
    work: Vec<ImportCandidate>,
    cancel: CancellationToken,
) -> u64 {
    let mut dispatched = 0u64;
    for candidate in work {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("dispatch cancelled");
                break;
            }
            send_result = tx.send(candidate) => {
                if send_result.is_err() {
                    break;
                }
                dispatched += 1;
            }
        }
    }
    drop(tx);
    dispatched
}

#[allow(clippy::too_many_arguments)]
async fn process_one(
    mut candidate: ImportCandidate,
    repository: &Arc<dyn BookmarkRepository>,
    fetcher: Option<&dyn MetadataFetcher>,
    publisher: &dyn EventPublisher,
    fetch_enabled: bool,
    source: &str,
    progress: &Arc<ImportProgress>,
    cross_batch_duplicates: &Arc<AtomicU64>,
) {
    let mut title = std::mem::take(&mut candidate.title);
    let mut description = String::new();
    let mut tags = Vec::new();

    if fetch_enabled {
        if let Some(fetcher) = fetcher {
            match fetcher.fetch(&candidate.url).await {
                FetchOutcome::Success(page) => {
                    if !page.title.is_empty() {
                        title = page.title;
                    }
                    description = page.description;
                    tags = page.tags;
                }
                FetchOutcome::Failed { reason, .. } => {
                    description = Bookmark::fetch_failed_description(&reason);
                }
                FetchOutcome::SkippedDomain => {
                    description = Bookmark::fetch_failed_description("domain in cooldown");
                }
                FetchOutcome::SkippedInternal => {
                    description = Bookmark::fetch_failed_description("internal address skipped");
                }
            }
        }
    }

    let repository = repository.clone();
    let url = candidate.url.clone();
    let created_at = candidate.created_at;

    let outcome = tokio::task::spawn_blocking(move || -> Result<Option<Bookmark>, String> {
        if repository
            .exists_by_url(&url)
            .map_err(|e| e.to_string())?
        {
            return Ok(None);
        }

        let mut bookmark = Bookmark::new(url, title, description, tags).map_err(|e| e.to_string())?;
        if let Some(created_at) = created_at {
            bookmark.created_at = created_at;
        }
        repository.create(&mut bookmark).map_err(|e| e.to_string())?;
        Ok(Some(bookmark))
    })
    .await;

    let failed;
    match outcome {
        Ok(Ok(Some(bookmark))) => {
            failed = false;
            publisher.publish(&ImportedEvent::new(&bookmark, source)).await;
        }
        Ok(Ok(None)) => {
            failed = false;
            cross_batch_duplicates.fetch_add(1, Ordering::SeqCst);
            debug!(url = %candidate.url, "duplicate url, skipping persistence");
        }
        Ok(Err(reason)) => {
            failed = true;
            debug!(url = %candidate.url, reason = %reason, "repository create failed, not publishing");
        }
        Err(e) => {
            failed = true;
            warn!(error = %e, "repository task panicked");
        }
    }

    if let Err(e) = progress.record_processed(failed) {
        warn!(error = %e, "failed to persist progress");
    }
}

async fn report_progress(
    progress: Arc<ImportProgress>,
    cancel: CancellationToken,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let processed = progress.processed();
                let elapsed = progress.start.elapsed();
                let rate = if elapsed.as_secs_f64() > 0.0 {
                    processed as f64 / elapsed.as_secs_f64()
                } else {
                    0.0
                };
                info!(processed, total = progress.total, rate, elapsed = ?elapsed, "import progress");
                if processed >= progress.total {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryBookmarkRepository;
    use crate::publish::NullPublisher;

    fn candidate(url: &str) -> ImportCandidate {
        ImportCandidate {
            url: url.to_string(),
            title: "title".to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn given_duplicate_urls_in_batch_when_run_then_only_unique_created() {
        let repository: Arc<dyn BookmarkRepository> = Arc::new(InMemoryBookmarkRepository::new());
        let coordinator = Coordinator::new(
            repository.clone(),
            None,
            Arc::new(NullPublisher),
            IngestionConfig::default(),
        );

        let candidates = vec![
            candidate("https://u1.com"),
            candidate("https://u2.com"),
            candidate("https://u1.com"),
        ];

        let result = coordinator
            .run(candidates, "html-import", CancellationToken::new())
            .await;

        assert_eq!(result.parsed_unique, 2);
        assert_eq!(result.created, 2);
        assert_eq!(result.duplicates_skipped, 0);
        assert_eq!(result.intra_batch_duplicates, 1);
        assert_eq!(
            result.parsed_unique,
            result.created + result.duplicates_skipped + result.errors
        );
        assert_eq!(repository.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn given_same_import_run_twice_when_run_then_second_creates_nothing() {
        let repository: Arc<dyn BookmarkRepository> = Arc::new(InMemoryBookmarkRepository::new());
        let coordinator = Coordinator::new(
            repository.clone(),
            None,
            Arc::new(NullPublisher),
            IngestionConfig::default(),
        );

        let candidates = vec![candidate("https://u1.com"), candidate("https://u2.com")];
        coordinator
            .run(candidates.clone(), "html-import", CancellationToken::new())
            .await;

        let second = coordinator
            .run(candidates, "html-import", CancellationToken::new())
            .await;

        assert_eq!(second.created, 0);
        assert_eq!(second.duplicates_skipped, 2);
        assert_eq!(repository.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn given_resume_file_with_cursor_when_run_then_skips_already_attempted() {
        let repository: Arc<dyn BookmarkRepository> = Arc::new(InMemoryBookmarkRepository::new());
        let resume_file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(resume_file.path(), "2").unwrap();

        let config = IngestionConfig {
            resume_file: Some(resume_file.path().to_path_buf()),
            ..Default::default()
        };
        let coordinator = Coordinator::new(repository.clone(), None, Arc::new(NullPublisher), config);

        let candidates = vec![
            candidate("https://u1.com"),
            candidate("https://u2.com"),
            candidate("https://u3.com"),
        ];

        let result = coordinator
            .run(candidates, "html-import", CancellationToken::new())
            .await;

        assert_eq!(result.created, 1);
        assert!(repository.get_by_url("https://u3.com").unwrap().is_some());
        assert!(repository.get_by_url("https://u1.com").unwrap().is_none());
    }
}
