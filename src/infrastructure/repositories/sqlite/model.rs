// src/infrastructure/repositories/sqlite/model.rs
use crate::domain::bookmark::Bookmark;
use crate::domain::tag;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct DbBookmark {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DbBookmark {
    pub fn into_domain(self) -> Bookmark {
        Bookmark {
            id: Some(self.id),
            url: self.url,
            title: self.title,
            description: self.description,
            tags: tag::parse_tag_string(&self.tags),
            created_at: DateTime::<Utc>::from_naive_utc_and_offset(self.created_at, Utc),
            updated_at: DateTime::<Utc>::from_naive_utc_and_offset(self.updated_at, Utc),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&Bookmark> for NewBookmark {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            description: bookmark.description.clone(),
            tags: tag::format_tag_string(&bookmark.tags),
            created_at: bookmark.created_at.naive_utc(),
            updated_at: bookmark.updated_at.naive_utc(),
        }
    }
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct BookmarkChanges {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub updated_at: NaiveDateTime,
}

impl From<&Bookmark> for BookmarkChanges {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            description: bookmark.description.clone(),
            tags: tag::format_tag_string(&bookmark.tags),
            updated_at: bookmark.updated_at.naive_utc(),
        }
    }
}
