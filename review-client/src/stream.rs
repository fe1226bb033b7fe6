//! Wire format of the per-review update stream.
//!
//! The server pushes newline-delimited JSON records, each a `{key, data}`
//! pair. Keys are turned into typed [`ReviewUpdate`]s here, at the transport
//! boundary; nothing downstream ever sees a wire key. Unrecognized keys are
//! logged and dropped.

use analysis::types::{AiReview, MoveAnalysis};
use analysis::ReviewUpdate;
use serde::Deserialize;

/// One event delivered to the subscriber.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Update(ReviewUpdate),
    /// The set of reviews for the game changed; re-fetch the list.
    Refresh,
}

/// Raw wire record before key parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUpdate {
    pub key: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Parse one wire record. `None` means the record carried nothing usable.
pub fn parse_update(raw: RawUpdate) -> Option<StreamEvent> {
    if raw.key == "refresh" {
        return Some(StreamEvent::Refresh);
    }
    let update = if raw.key == "metadata" {
        let review: AiReview = decode(&raw.key, raw.data)?;
        ReviewUpdate::Metadata(review)
    } else if raw.key == "error" {
        let message = match raw.data {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        ReviewUpdate::Error(message)
    } else if let Some(n) = raw.key.strip_prefix("move-") {
        let Ok(move_number) = n.parse::<u32>() else {
            tracing::warn!(key = %raw.key, "malformed move update key");
            return None;
        };
        let analysis: MoveAnalysis = decode(&raw.key, raw.data)?;
        ReviewUpdate::Move {
            move_number,
            analysis,
        }
    } else if let Some(suffix) = raw.key.strip_prefix("variation-") {
        // The remainder is the variation key itself: "<n>-<encoded moves>".
        if !suffix.split_once('-').is_some_and(|(n, _)| n.parse::<u32>().is_ok()) {
            tracing::warn!(key = %raw.key, "malformed variation update key");
            return None;
        }
        let analysis: MoveAnalysis = decode(&raw.key, raw.data)?;
        ReviewUpdate::Variation {
            key: suffix.to_string(),
            analysis,
        }
    } else {
        tracing::warn!(key = %raw.key, "unrecognized review update key, dropping");
        return None;
    };
    Some(StreamEvent::Update(update))
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, data: serde_json::Value) -> Option<T> {
    match serde_json::from_value(data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "undecodable review update payload");
            None
        }
    }
}
