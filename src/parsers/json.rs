// src/parsers/json.rs
//! Folder-tree JSON parser (§6): recursively descends `folder` nodes via
//! their `children` array and emits one candidate per `link` node with a
//! non-empty `url`.

use super::{ImportCandidate, ParseError, ParseResult};
use chrono::{TimeZone, Utc};
use serde_json::Value;

pub fn parse(content: &str) -> ParseResult<Vec<ImportCandidate>> {
    let root: Value =
        serde_json::from_str(content).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let mut candidates = Vec::new();
    walk(&root, &mut candidates);
    Ok(candidates)
}

fn walk(node: &Value, out: &mut Vec<ImportCandidate>) {
    match node {
        Value::Array(items) => {
            for item in items {
                walk(item, out);
            }
        }
        Value::Object(map) => match map.get("type").and_then(Value::as_str) {
            Some("folder") => {
                if let Some(children) = map.get("children") {
                    walk(children, out);
                }
            }
            Some("link") => {
                let url = map
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim();
                if url.is_empty() {
                    return;
                }

                let title = map
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();

                // addDate is milliseconds; divide by 1000 per §4.3.
                let created_at = map
                    .get("addDate")
                    .and_then(Value::as_i64)
                    .and_then(|ms| Utc.timestamp_opt(ms / 1000, 0).single());

                out.push(ImportCandidate {
                    url: url.to_string(),
                    title,
                    created_at,
                });
            }
            _ => {}
        },
        _ => {}
    }
}
