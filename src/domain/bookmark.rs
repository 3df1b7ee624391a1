// src/domain/bookmark.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tag;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use std::fmt;

/// A bookmark: a URL carrying human-supplied or fetched metadata.
///
/// `id` is assigned by the repository on insert and never reused, even
/// across a `purge`. `tags` is always canonical: lowercase, trimmed,
/// deduplicated, comma-free.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct Bookmark {
    #[builder(default)]
    pub id: Option<i64>,
    pub url: String,
    #[builder(default)]
    pub title: String,
    #[builder(default)]
    pub description: String,
    #[builder(default)]
    pub tags: Vec<String>,
    #[builder(default = "Utc::now()")]
    pub created_at: DateTime<Utc>,
    #[builder(default = "Utc::now()")]
    pub updated_at: DateTime<Utc>,
}

impl Bookmark {
    /// Constructs a new, not-yet-persisted bookmark. `tags` is canonicalised
    /// (lowercased, trimmed, deduplicated) and validated; an empty `url`
    /// is rejected.
    pub fn new<S: AsRef<str>>(
        url: S,
        title: S,
        description: S,
        tags: Vec<String>,
    ) -> DomainResult<Self> {
        let url = url.as_ref().trim().to_string();
        if url.is_empty() {
            return Err(DomainError::InvalidUrl("url cannot be empty".to_string()));
        }

        let tags = tag::canonicalize_list(tags)?;
        let now = Utc::now();

        Ok(Self {
            id: None,
            url,
            title: title.as_ref().to_string(),
            description: description.as_ref().to_string(),
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sentinel description recorded when metadata enrichment fails.
    pub fn fetch_failed_description(reason: &str) -> String {
        format!("Metadata fetch failed: {}", reason)
    }

    pub fn is_fetch_failed(&self) -> bool {
        self.description.starts_with("Metadata fetch failed:")
    }

    /// Replaces mutable fields in place and refreshes `updated_at`. Does
    /// not touch `id` or `created_at`.
    pub fn apply_update(&mut self, title: Option<String>, description: Option<String>, tags: Option<Vec<String>>) -> DomainResult<bool> {
        let mut changed = false;

        if let Some(title) = title {
            if title != self.title {
                self.title = title;
                changed = true;
            }
        }
        if let Some(description) = description {
            if description != self.description {
                self.description = description;
                changed = true;
            }
        }
        if let Some(tags) = tags {
            let tags = tag::canonicalize_list(tags)?;
            if tags != self.tags {
                self.tags = tags;
                changed = true;
            }
        }

        if changed {
            self.updated_at = Utc::now();
        }
        Ok(changed)
    }

    /// Removes a tag, if present. No-op (not an error) if the tag is absent.
    pub fn remove_tag(&mut self, tag: &str) -> DomainResult<bool> {
        let tag = tag::normalize(tag)?;
        let before = self.tags.len();
        self.tags.retain(|t| t != &tag);
        let removed = self.tags.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        Ok(removed)
    }

    /// Substring haystack used by `Repository::search`: url, title,
    /// description and the comma-joined tag string concatenated.
    pub fn search_haystack(&self) -> String {
        format!(
            "{}{}{}{}",
            self.url,
            self.title,
            self.description,
            tag::format_tag_string(&self.tags)
        )
    }

    pub fn formatted_tags(&self) -> String {
        tag::format_tag_string(&self.tags)
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.id.map_or("new".to_string(), |id| id.to_string()),
            self.title,
            self.url,
            self.formatted_tags()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_valid_input_when_new_then_fields_populated_and_tags_canonical() {
        let bookmark = Bookmark::new(
            "https://example.com",
            "Example",
            "An example site",
            vec!["Rust".to_string(), "rust".to_string()],
        )
        .unwrap();

        assert_eq!(bookmark.url, "https://example.com");
        assert_eq!(bookmark.title, "Example");
        assert_eq!(bookmark.tags, vec!["rust".to_string()]);
        assert!(bookmark.id.is_none());
    }

    #[test]
    fn given_empty_url_when_new_then_error() {
        let result = Bookmark::new("  ", "t", "d", vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn given_comma_tag_when_new_then_error() {
        let result = Bookmark::new("https://example.com", "t", "d", vec!["a,b".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn given_update_with_same_values_when_apply_update_then_not_changed() {
        let mut bookmark =
            Bookmark::new("https://example.com", "t", "d", vec!["x".to_string()]).unwrap();
        let updated_at = bookmark.updated_at;

        let changed = bookmark
            .apply_update(Some("t".to_string()), Some("d".to_string()), None)
            .unwrap();

        assert!(!changed);
        assert_eq!(bookmark.updated_at, updated_at);
    }

    #[test]
    fn given_update_with_new_title_when_apply_update_then_changed_and_timestamp_bumped() {
        let mut bookmark = Bookmark::new("https://example.com", "t", "d", vec![]).unwrap();
        let updated_at = bookmark.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));

        let changed = bookmark
            .apply_update(Some("new title".to_string()), None, None)
            .unwrap();

        assert!(changed);
        assert_eq!(bookmark.title, "new title");
        assert!(bookmark.updated_at >= updated_at);
    }

    #[test]
    fn given_existing_tag_when_remove_tag_then_removed() {
        let mut bookmark = Bookmark::new(
            "https://example.com",
            "t",
            "d",
            vec!["rust".to_string(), "cli".to_string()],
        )
        .unwrap();

        let removed = bookmark.remove_tag("rust").unwrap();
        assert!(removed);
        assert_eq!(bookmark.tags, vec!["cli".to_string()]);
    }

    #[test]
    fn given_absent_tag_when_remove_tag_then_false_not_error() {
        let mut bookmark = Bookmark::new("https://example.com", "t", "d", vec![]).unwrap();
        let removed = bookmark.remove_tag("nonexistent").unwrap();
        assert!(!removed);
    }

    #[test]
    fn given_fetch_failure_when_check_is_fetch_failed_then_true() {
        let mut bookmark = Bookmark::new("https://example.com", "t", "d", vec![]).unwrap();
        bookmark.description = Bookmark::fetch_failed_description("timeout");
        assert!(bookmark.is_fetch_failed());
        assert_eq!(bookmark.description, "Metadata fetch failed: timeout");
    }

    #[test]
    fn given_bookmark_when_search_haystack_then_concatenates_fields() {
        let bookmark = Bookmark::new(
            "https://example.com",
            "Example",
            "desc",
            vec!["rust".to_string()],
        )
        .unwrap();
        let haystack = bookmark.search_haystack();
        assert!(haystack.contains("example.com"));
        assert!(haystack.contains("Example"));
        assert!(haystack.contains("desc"));
        assert!(haystack.contains("rust"));
    }
}
