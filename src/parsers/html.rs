// src/parsers/html.rs
//! Netscape Bookmark File parser (§6): walks every `<a>` element and emits
//! one candidate per anchor, carrying its `href`, visible text and
//! `ADD_DATE` attribute (html5ever normalises attribute names to
//! lowercase regardless of source casing).

use super::{ImportCandidate, ParseResult};
use chrono::{DateTime, TimeZone, Utc};
use select::document::Document;
use select::predicate::Name;

pub fn parse(content: &str) -> ParseResult<Vec<ImportCandidate>> {
    let document = Document::from(content);

    let candidates = document
        .find(Name("a"))
        .filter_map(|node| {
            let href = node.attr("href")?.trim();
            if href.is_empty() {
                return None;
            }

            let title = node.text().trim().to_string();
            let created_at = node.attr("add_date").and_then(parse_add_date);

            Some(ImportCandidate {
                url: href.to_string(),
                title,
                created_at,
            })
        })
        .collect();

    Ok(candidates)
}

/// Unix seconds, falling back to RFC3339, falling back to unset (§4.3).
fn parse_add_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = raw.trim().parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
