// src/ingestion/progress.rs
//! `ImportProgress` (§3): atomic counters shared across workers, plus the
//! resume-file persistence the coordinator drives every 100 processed
//! items (§4.6 step 4).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// How often (in processed items) the resume cursor is flushed to disk.
pub const PERSIST_EVERY: u64 = 100;

pub struct ImportProgress {
    pub processed: AtomicU64,
    pub errors: AtomicU64,
    pub total: u64,
    pub start: Instant,
    resume_file: Option<PathBuf>,
    resume_base: u64,
    last_persisted_position: AtomicU64,
}

impl ImportProgress {
    pub fn new(total: u64, resume_file: Option<PathBuf>, resume_base: u64) -> Arc<Self> {
        Arc::new(Self {
            processed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total,
            start: Instant::now(),
            resume_file,
            resume_base,
            last_persisted_position: AtomicU64::new(resume_base),
        })
    }

    /// Records one completed candidate (success or failure) and, every
    /// `PERSIST_EVERY` items, flushes the resume cursor.
    pub fn record_processed(&self, failed: bool) -> io::Result<()> {
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        if failed {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        if processed % PERSIST_EVERY == 0 {
            self.persist(self.resume_base + processed)?;
        }
        Ok(())
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn persist(&self, position: u64) -> io::Result<()> {
        let Some(path) = &self.resume_file else {
            return Ok(());
        };
        write_resume_file(path, position)?;
        self.last_persisted_position.store(position, Ordering::SeqCst);
        debug!(position, path = %path.display(), "persisted resume cursor");
        Ok(())
    }

    pub fn last_persisted_position(&self) -> u64 {
        self.last_persisted_position.load(Ordering::SeqCst)
    }

    /// Final flush performed when the run ends, so the cursor always
    /// reflects exactly what was attempted even if it falls between
    /// `PERSIST_EVERY` boundaries.
    pub fn persist_final(&self) -> io::Result<()> {
        self.persist(self.resume_base + self.processed())
    }
}

fn write_resume_file(path: &Path, position: u64) -> io::Result<()> {
    std::fs::write(path, position.to_string())
}

/// Reads the resume cursor, if a resume file is configured and exists.
/// A missing file means a fresh run (starts at 0), not an error.
pub fn read_resume_cursor(path: &Path) -> io::Result<u64> {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents
            .trim()
            .parse::<u64>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn given_missing_resume_file_when_read_cursor_then_zero() {
        let path = std::env::temp_dir().join("bkmr-ingest-test-missing-resume-file");
        let _ = std::fs::remove_file(&path);
        assert_eq!(read_resume_cursor(&path).unwrap(), 0);
    }

    #[test]
    fn given_persisted_cursor_when_read_then_matches() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "150").unwrap();
        assert_eq!(read_resume_cursor(file.path()).unwrap(), 150);
    }

    #[test]
    fn given_hundred_processed_when_record_then_persisted() {
        let file = NamedTempFile::new().unwrap();
        let progress = ImportProgress::new(300, Some(file.path().to_path_buf()), 0);

        for i in 0..100 {
            progress.record_processed(i % 10 == 0).unwrap();
        }

        assert_eq!(progress.processed(), 100);
        assert_eq!(read_resume_cursor(file.path()).unwrap(), 100);
    }

    #[test]
    fn given_resume_base_when_persist_final_then_offset_applied() {
        let file = NamedTempFile::new().unwrap();
        let progress = ImportProgress::new(300, Some(file.path().to_path_buf()), 100);
        for _ in 0..5 {
            progress.record_processed(false).unwrap();
        }
        progress.persist_final().unwrap();
        assert_eq!(read_resume_cursor(file.path()).unwrap(), 105);
    }
}
