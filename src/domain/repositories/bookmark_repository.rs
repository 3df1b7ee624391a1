// src/domain/repositories/bookmark_repository.rs
use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainError;

/*
   The BookmarkRepository trait is the contract the ingestion pipeline and
   the single-row CLI commands consume. It speaks in domain terms (a
   Bookmark, an id, a url) rather than in storage terms (a row, a
   connection), so the pipeline can run against a real SQLite-backed
   implementation in production and an in-memory fake in tests.
*/
pub trait BookmarkRepository: Send + Sync {
    /// Assigns `bookmark.id`, stores it, and indexes `bookmark.url`. Fails
    /// with `DuplicateUrl` if the url is already present.
    fn create(&self, bookmark: &mut Bookmark) -> Result<(), DomainError>;

    /// Consults the dedup index first so a miss never touches the row
    /// store.
    fn get_by_url(&self, url: &str) -> Result<Option<Bookmark>, DomainError>;

    fn get_by_id(&self, id: i64) -> Result<Option<Bookmark>, DomainError>;

    /// Rewrites the mutable fields of the row matching `bookmark.id` and
    /// refreshes `updated_at`. Never changes `id` or `created_at`. Fails
    /// with `DuplicateUrl` if the new url collides with a different row.
    fn update(&self, bookmark: &Bookmark) -> Result<(), DomainError>;

    /// Idempotent with respect to a non-existent id: returns `Ok(false)`
    /// rather than an error.
    fn delete(&self, id: i64) -> Result<bool, DomainError>;

    /// Returns up to `limit` rows starting at `offset`, ordered by `id`
    /// ascending.
    fn list(&self, limit: i64, offset: i64) -> Result<Vec<Bookmark>, DomainError>;

    fn count(&self) -> Result<i64, DomainError>;

    /// Case-sensitive substring match across url, title, description and
    /// the joined tag string; paginated like `list`.
    fn search(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<Bookmark>, DomainError>;

    /// Sorted set of all tag tokens appearing on any bookmark.
    fn list_all_tags(&self) -> Result<Vec<String>, DomainError>;

    /// Removes all rows and resets the monotonic id counter and the dedup
    /// index. Post-condition: `count() == 0`.
    fn purge(&self) -> Result<(), DomainError>;

    /// `true` iff a row with this url already exists. Default
    /// implementation built on `get_by_url`.
    fn exists_by_url(&self, url: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_url(url)?.is_some())
    }
}
