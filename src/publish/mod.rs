// src/publish/mod.rs
//! Event Publisher (C5): best-effort MQTT notification emitted once per
//! successfully created bookmark (§4.5). See `mqtt` for the
//! `rumqttc`-backed implementation.

pub mod mqtt;

use crate::domain::bookmark::Bookmark;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Wire shape from §4.5/§6: one JSON document per created bookmark,
/// tagged with the import source that produced it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportedEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub bookmark: BookmarkPayload,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookmarkPayload {
    pub id: Option<i64>,
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportedEvent {
    /// `source` is one of `"html-import" | "json-import" | "text-import"`
    /// (§4.5), set by the coordinator from the detected import format.
    pub fn new(bookmark: &Bookmark, source: &str) -> Self {
        Self {
            kind: "imported",
            timestamp: Utc::now(),
            source: source.to_string(),
            bookmark: BookmarkPayload {
                id: bookmark.id,
                url: bookmark.url.clone(),
                title: bookmark.title.clone(),
                description: bookmark.description.clone(),
                tags: bookmark.tags.clone(),
                created_at: bookmark.created_at,
                updated_at: bookmark.updated_at,
            },
        }
    }
}

/// A publisher that drops events rather than block or queue when the
/// broker is unreachable (§4.5, §9 Open Question: best-effort, no
/// outbox/replay). A publish failure is logged by the implementation and
/// never propagated; it must not roll back the corresponding create.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &ImportedEvent);
}

/// Used when no broker is configured; every call is a no-op.
pub struct NullPublisher;

#[async_trait::async_trait]
impl EventPublisher for NullPublisher {
    async fn publish(&self, _event: &ImportedEvent) {}
}
