// src/application/retrieval.rs
//! Retrieval (C7): pass-through to the repository with argument
//! validation (§4.7).

use crate::domain::bookmark::Bookmark;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::bookmark_repository::BookmarkRepository;
use std::sync::Arc;

pub struct RetrievalService {
    repository: Arc<dyn BookmarkRepository>,
}

impl RetrievalService {
    pub fn new(repository: Arc<dyn BookmarkRepository>) -> Self {
        Self { repository }
    }

    pub fn get(&self, id: i64) -> DomainResult<Bookmark> {
        self.repository
            .get_by_id(id)?
            .ok_or_else(|| DomainError::BookmarkNotFound(id.to_string()))
    }

    pub fn list(&self, limit: i64, offset: i64) -> DomainResult<Vec<Bookmark>> {
        self.repository.list(limit, offset)
    }

    pub fn search(&self, query: &str, limit: i64, offset: i64) -> DomainResult<Vec<Bookmark>> {
        if query.trim().is_empty() {
            return Err(DomainError::Other("search query cannot be empty".to_string()));
        }
        self.repository.search(query, limit, offset)
    }

    pub fn list_all_tags(&self) -> DomainResult<Vec<String>> {
        self.repository.list_all_tags()
    }

    pub fn count(&self) -> DomainResult<i64> {
        self.repository.count()
    }

    /// Strips `tag` from the bookmark's tag list and persists if it was
    /// present (§4.7).
    pub fn remove_tag(&self, id: i64, tag: &str) -> DomainResult<bool> {
        let mut bookmark = self.get(id)?;
        let removed = bookmark.remove_tag(tag)?;
        if removed {
            self.repository.update(&bookmark)?;
        }
        Ok(removed)
    }

    /// Re-fetches the existing row, merges any provided non-`None`
    /// fields, and persists only if something actually changed (§4.7).
    pub fn update(
        &self,
        id: i64,
        title: Option<String>,
        description: Option<String>,
        tags: Option<Vec<String>>,
    ) -> DomainResult<bool> {
        let mut bookmark = self.get(id)?;
        let changed = bookmark.apply_update(title, description, tags)?;
        if changed {
            self.repository.update(&bookmark)?;
        }
        Ok(changed)
    }

    pub fn delete(&self, id: i64) -> DomainResult<bool> {
        self.repository.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryBookmarkRepository;

    fn service_with_one_bookmark() -> (RetrievalService, i64) {
        let repository: Arc<dyn BookmarkRepository> = Arc::new(InMemoryBookmarkRepository::new());
        let mut bookmark = Bookmark::new(
            "https://example.com",
            "Example",
            "desc",
            vec!["rust".to_string()],
        )
        .unwrap();
        repository.create(&mut bookmark).unwrap();
        let id = bookmark.id.unwrap();
        (RetrievalService::new(repository), id)
    }

    #[test]
    fn given_empty_query_when_search_then_error() {
        let (service, _) = service_with_one_bookmark();
        let result = service.search("   ", 10, 0);
        assert!(result.is_err());
    }

    #[test]
    fn given_unknown_id_when_get_then_not_found() {
        let (service, _) = service_with_one_bookmark();
        let result = service.get(9999);
        assert!(matches!(result, Err(DomainError::BookmarkNotFound(_))));
    }

    #[test]
    fn given_existing_tag_when_remove_tag_then_persisted() {
        let (service, id) = service_with_one_bookmark();
        let removed = service.remove_tag(id, "rust").unwrap();
        assert!(removed);
        assert!(service.get(id).unwrap().tags.is_empty());
    }

    #[test]
    fn given_no_actual_changes_when_update_then_not_persisted_as_changed() {
        let (service, id) = service_with_one_bookmark();
        let changed = service
            .update(id, Some("Example".to_string()), None, None)
            .unwrap();
        assert!(!changed);
    }
}
