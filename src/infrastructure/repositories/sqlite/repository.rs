// src/infrastructure/repositories/sqlite/repository.rs
use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainError;
use crate::domain::repositories::bookmark_repository::BookmarkRepository;
use crate::domain::tag;
use crate::infrastructure::repositories::sqlite::connection::ConnectionPool;
use crate::infrastructure::repositories::sqlite::model::{BookmarkChanges, DbBookmark, NewBookmark};
use crate::infrastructure::repositories::sqlite::schema::bookmarks::dsl as bm;
use diesel::prelude::*;
use diesel::sql_query;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// `diesel`/`r2d2`-backed implementation of `BookmarkRepository`. Each
/// method borrows a pooled connection for the duration of the call, so
/// concurrent readers never contend on a single handle; SQLite's own
/// locking arbitrates concurrent writers. The `UNIQUE(url)` index doubles
/// as the dedup index; there is no separate structure to keep consistent.
pub struct SqliteBookmarkRepository {
    pool: ConnectionPool,
}

impl SqliteBookmarkRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<crate::infrastructure::repositories::sqlite::connection::PooledConnection, DomainError> {
        self.pool
            .get()
            .map_err(|e| DomainError::RepositoryError(format!("connection pool error: {}", e)))
    }
}

impl BookmarkRepository for SqliteBookmarkRepository {
    #[instrument(level = "debug", skip(self, bookmark), fields(url = %bookmark.url))]
    fn create(&self, bookmark: &mut Bookmark) -> Result<(), DomainError> {
        let mut conn = self.conn()?;

        if self.exists_by_url(&bookmark.url)? {
            return Err(DomainError::DuplicateUrl(bookmark.url.clone()));
        }

        let new_row = NewBookmark::from(&*bookmark);
        let inserted: DbBookmark = diesel::insert_into(bm::bookmarks)
            .values(&new_row)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => DomainError::DuplicateUrl(bookmark.url.clone()),
                other => DomainError::RepositoryError(other.to_string()),
            })?;

        bookmark.id = Some(inserted.id);
        bookmark.created_at = inserted.into_domain().created_at;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn get_by_url(&self, url: &str) -> Result<Option<Bookmark>, DomainError> {
        let mut conn = self.conn()?;
        let row = bm::bookmarks
            .filter(bm::url.eq(url))
            .first::<DbBookmark>(&mut conn)
            .optional()
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;
        Ok(row.map(DbBookmark::into_domain))
    }

    #[instrument(level = "debug", skip(self))]
    fn get_by_id(&self, id: i64) -> Result<Option<Bookmark>, DomainError> {
        let mut conn = self.conn()?;
        let row = bm::bookmarks
            .filter(bm::id.eq(id))
            .first::<DbBookmark>(&mut conn)
            .optional()
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;
        Ok(row.map(DbBookmark::into_domain))
    }

    #[instrument(level = "debug", skip(self, bookmark), fields(id = ?bookmark.id))]
    fn update(&self, bookmark: &Bookmark) -> Result<(), DomainError> {
        let id = bookmark
            .id
            .ok_or_else(|| DomainError::RepositoryError("cannot update bookmark without id".to_string()))?;

        let mut conn = self.conn()?;

        if let Some(existing) = bm::bookmarks
            .filter(bm::url.eq(&bookmark.url))
            .filter(bm::id.ne(id))
            .first::<DbBookmark>(&mut conn)
            .optional()
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?
        {
            let _ = existing;
            return Err(DomainError::DuplicateUrl(bookmark.url.clone()));
        }

        let changes = BookmarkChanges::from(bookmark);
        let affected = diesel::update(bm::bookmarks.filter(bm::id.eq(id)))
            .set(&changes)
            .execute(&mut conn)
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;

        if affected == 0 {
            return Err(DomainError::BookmarkNotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(bm::bookmarks.filter(bm::id.eq(id)))
            .execute(&mut conn)
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;
        Ok(affected > 0)
    }

    #[instrument(level = "debug", skip(self))]
    fn list(&self, limit: i64, offset: i64) -> Result<Vec<Bookmark>, DomainError> {
        let mut conn = self.conn()?;
        let rows = bm::bookmarks
            .order(bm::id.asc())
            .limit(limit)
            .offset(offset)
            .load::<DbBookmark>(&mut conn)
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;
        Ok(rows.into_iter().map(DbBookmark::into_domain).collect())
    }

    #[instrument(level = "debug", skip(self))]
    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.conn()?;
        bm::bookmarks
            .count()
            .get_result(&mut conn)
            .map_err(|e| DomainError::RepositoryError(e.to_string()))
    }

    /// Case-sensitive substring match. SQLite's `LIKE` is case-insensitive
    /// for ASCII by default, so matching is done in process over the
    /// ordered row set rather than pushed into SQL, per the explicit
    /// non-goal of full-text indexing.
    #[instrument(level = "debug", skip(self))]
    fn search(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<Bookmark>, DomainError> {
        let mut conn = self.conn()?;
        let rows = bm::bookmarks
            .order(bm::id.asc())
            .load::<DbBookmark>(&mut conn)
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;

        let matches: Vec<Bookmark> = rows
            .into_iter()
            .map(DbBookmark::into_domain)
            .filter(|b| b.search_haystack().contains(query))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok(matches)
    }

    #[instrument(level = "debug", skip(self))]
    fn list_all_tags(&self) -> Result<Vec<String>, DomainError> {
        let mut conn = self.conn()?;
        let tag_strings: Vec<String> = bm::bookmarks
            .select(bm::tags)
            .load::<String>(&mut conn)
            .map_err(|e| DomainError::RepositoryError(e.to_string()))?;

        let mut all: BTreeSet<String> = BTreeSet::new();
        for stored in tag_strings {
            for t in tag::parse_tag_string(&stored) {
                all.insert(t);
            }
        }
        Ok(all.into_iter().collect())
    }

    #[instrument(level = "debug", skip(self))]
    fn purge(&self) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            diesel::delete(bm::bookmarks).execute(conn)?;
            // Reset the AUTOINCREMENT counter so the next insert starts at id = 1.
            sql_query("DELETE FROM sqlite_sequence WHERE name = 'bookmarks'").execute(conn)?;
            diesel::result::QueryResult::Ok(())
        })
        .map_err(|e: diesel::result::Error| DomainError::RepositoryError(e.to_string()))?;
        debug!("repository purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::sqlite::connection::init_pool;

    // A real r2d2 pool hands out a fresh connection per checkout; SQLite's
    // `:memory:` database is private to the connection that opened it, so
    // pooled tests need a throwaway file-backed database, not `:memory:`.
    fn repo() -> (tempfile::TempDir, SqliteBookmarkRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("test.db");
        let pool = init_pool(db_path.to_str().unwrap()).expect("init pool");
        (dir, SqliteBookmarkRepository::new(pool))
    }

    #[test]
    fn given_concurrent_writers_when_create_then_all_succeed_without_busy_error() {
        use std::sync::Arc;
        use std::thread;

        let (_dir, repo) = repo();
        let repo = Arc::new(repo);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                thread::spawn(move || {
                    let mut b = Bookmark::new(
                        format!("https://worker{}.example.com", i),
                        "t".to_string(),
                        "d".to_string(),
                        vec![],
                    )
                    .unwrap();
                    repo.create(&mut b)
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("writer thread panicked").expect("create should not fail with SQLITE_BUSY");
        }

        assert_eq!(repo.count().unwrap(), 8);
    }

    #[test]
    fn given_new_bookmark_when_create_then_id_assigned_starting_at_one() {
        let (_dir, repo) = repo();
        let mut b = Bookmark::new("https://example.com", "t", "d", vec![]).unwrap();
        repo.create(&mut b).unwrap();
        assert_eq!(b.id, Some(1));
    }

    #[test]
    fn given_existing_url_when_create_again_then_duplicate_error() {
        let (_dir, repo) = repo();
        let mut b1 = Bookmark::new("https://example.com", "t", "d", vec![]).unwrap();
        repo.create(&mut b1).unwrap();

        let mut b2 = Bookmark::new("https://example.com", "t2", "d2", vec![]).unwrap();
        let result = repo.create(&mut b2);
        assert!(matches!(result, Err(DomainError::DuplicateUrl(_))));
    }

    #[test]
    fn given_url_when_get_by_url_then_returns_row_else_none() {
        let (_dir, repo) = repo();
        let mut b = Bookmark::new("https://example.com", "t", "d", vec![]).unwrap();
        repo.create(&mut b).unwrap();

        assert!(repo.get_by_url("https://example.com").unwrap().is_some());
        assert!(repo.get_by_url("https://nope.com").unwrap().is_none());
    }

    #[test]
    fn given_nonexistent_id_when_delete_then_returns_false() {
        let (_dir, repo) = repo();
        assert!(!repo.delete(999).unwrap());
    }

    #[test]
    fn given_rows_when_purge_then_count_zero_and_ids_reset() {
        let (_dir, repo) = repo();
        let mut b1 = Bookmark::new("https://a.com", "t", "d", vec![]).unwrap();
        let mut b2 = Bookmark::new("https://b.com", "t", "d", vec![]).unwrap();
        repo.create(&mut b1).unwrap();
        repo.create(&mut b2).unwrap();
        assert_eq!(repo.count().unwrap(), 2);

        repo.purge().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.list_all_tags().unwrap().is_empty());

        let mut b3 = Bookmark::new("https://c.com", "t", "d", vec![]).unwrap();
        repo.create(&mut b3).unwrap();
        assert_eq!(b3.id, Some(1));
    }

    #[test]
    fn given_query_when_search_then_case_sensitive_substring_match() {
        let (_dir, repo) = repo();
        let mut b = Bookmark::new("https://example.com", "Rust Book", "d", vec![]).unwrap();
        repo.create(&mut b).unwrap();

        assert_eq!(repo.search("Rust", 10, 0).unwrap().len(), 1);
        assert_eq!(repo.search("rust", 10, 0).unwrap().len(), 0);
    }

    #[test]
    fn given_tags_across_bookmarks_when_list_all_tags_then_sorted_deduped() {
        let (_dir, repo) = repo();
        let mut b1 =
            Bookmark::new("https://a.com", "t", "d", vec!["rust".to_string(), "cli".to_string()])
                .unwrap();
        let mut b2 = Bookmark::new("https://b.com", "t", "d", vec!["rust".to_string()]).unwrap();
        repo.create(&mut b1).unwrap();
        repo.create(&mut b2).unwrap();

        assert_eq!(repo.list_all_tags().unwrap(), vec!["cli".to_string(), "rust".to_string()]);
    }

    #[test]
    fn given_update_colliding_with_other_url_when_update_then_duplicate_error() {
        let (_dir, repo) = repo();
        let mut b1 = Bookmark::new("https://a.com", "t", "d", vec![]).unwrap();
        let mut b2 = Bookmark::new("https://b.com", "t", "d", vec![]).unwrap();
        repo.create(&mut b1).unwrap();
        repo.create(&mut b2).unwrap();

        b2.url = "https://a.com".to_string();
        let result = repo.update(&b2);
        assert!(matches!(result, Err(DomainError::DuplicateUrl(_))));
    }
}
