// src/infrastructure/repositories/in_memory/bookmark_repository.rs
//! Lightweight in-process `BookmarkRepository` fake used by tests that
//! want to exercise the ingestion pipeline without a real SQLite file.

use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainError;
use crate::domain::repositories::bookmark_repository::BookmarkRepository;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

pub struct InMemoryBookmarkRepository {
    rows: RwLock<HashMap<i64, Bookmark>>,
    next_id: AtomicI64,
}

impl InMemoryBookmarkRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryBookmarkRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkRepository for InMemoryBookmarkRepository {
    fn create(&self, bookmark: &mut Bookmark) -> Result<(), DomainError> {
        let mut rows = self.rows.write().expect("lock poisoned");
        if rows.values().any(|b| b.url == bookmark.url) {
            return Err(DomainError::DuplicateUrl(bookmark.url.clone()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        bookmark.id = Some(id);
        rows.insert(id, bookmark.clone());
        Ok(())
    }

    fn get_by_url(&self, url: &str) -> Result<Option<Bookmark>, DomainError> {
        let rows = self.rows.read().expect("lock poisoned");
        Ok(rows.values().find(|b| b.url == url).cloned())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Bookmark>, DomainError> {
        let rows = self.rows.read().expect("lock poisoned");
        Ok(rows.get(&id).cloned())
    }

    fn update(&self, bookmark: &Bookmark) -> Result<(), DomainError> {
        let mut rows = self.rows.write().expect("lock poisoned");
        let id = bookmark
            .id
            .ok_or_else(|| DomainError::Other("cannot update a bookmark without an id".to_string()))?;

        if !rows.contains_key(&id) {
            return Err(DomainError::BookmarkNotFound(id.to_string()));
        }
        if rows
            .values()
            .any(|b| b.id != Some(id) && b.url == bookmark.url)
        {
            return Err(DomainError::DuplicateUrl(bookmark.url.clone()));
        }

        rows.insert(id, bookmark.clone());
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().expect("lock poisoned");
        Ok(rows.remove(&id).is_some())
    }

    fn list(&self, limit: i64, offset: i64) -> Result<Vec<Bookmark>, DomainError> {
        let rows = self.rows.read().expect("lock poisoned");
        let mut all: Vec<&Bookmark> = rows.values().collect();
        all.sort_by_key(|b| b.id);
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<i64, DomainError> {
        let rows = self.rows.read().expect("lock poisoned");
        Ok(rows.len() as i64)
    }

    fn search(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<Bookmark>, DomainError> {
        let rows = self.rows.read().expect("lock poisoned");
        let mut matches: Vec<&Bookmark> = rows
            .values()
            .filter(|b| b.search_haystack().contains(query))
            .collect();
        matches.sort_by_key(|b| b.id);
        Ok(matches
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    fn list_all_tags(&self) -> Result<Vec<String>, DomainError> {
        let rows = self.rows.read().expect("lock poisoned");
        let tags: BTreeSet<String> = rows
            .values()
            .flat_map(|b| b.tags.iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }

    fn purge(&self) -> Result<(), DomainError> {
        let mut rows = self.rows.write().expect("lock poisoned");
        rows.clear();
        self.next_id.store(1, Ordering::SeqCst);
        Ok(())
    }
}
