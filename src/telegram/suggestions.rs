//! Follow-up suggestions offered as inline buttons.
//!
//! Each batch is stored under `(chat id, timestamp)`; a button's callback data
//! is `suggest_<index>_<timestamp>`. Batches expire after two minutes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub const MAX_SUGGESTIONS: usize = 3;
pub const LABEL_CHARS: usize = 60;
pub const SUGGESTION_TTL: Duration = Duration::from_secs(120);
const CALLBACK_PREFIX: &str = "suggest_";

/// Non-blank suggestions, at most [`MAX_SUGGESTIONS`] of them.
pub fn usable_suggestions(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter(|s| !s.trim().is_empty())
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

pub fn button_label(suggestion: &str) -> String {
    let head: String = suggestion.chars().take(LABEL_CHARS).collect();
    if suggestion.chars().count() > LABEL_CHARS {
        format!("💡 {}...", head)
    } else {
        format!("💡 {}", head)
    }
}

pub fn callback_data(index: usize, timestamp: i64) -> String {
    format!("{}{}_{}", CALLBACK_PREFIX, index, timestamp)
}

pub fn parse_callback_data(data: &str) -> Option<(usize, i64)> {
    let rest = data.strip_prefix(CALLBACK_PREFIX)?;
    let (index, timestamp) = rest.split_once('_')?;
    Some((index.parse().ok()?, timestamp.parse().ok()?))
}

struct Batch {
    suggestions: Vec<String>,
    stored_at: Instant,
}

pub struct SuggestionCache {
    ttl: Duration,
    batches: Mutex<HashMap<(i64, i64), Batch>>,
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(SUGGESTION_TTL)
    }
}

impl SuggestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            batches: Mutex::new(HashMap::new()),
        }
    }

    pub async fn store(&self, chat_id: i64, timestamp: i64, suggestions: Vec<String>) {
        self.store_at(chat_id, timestamp, suggestions, Instant::now()).await
    }

    async fn store_at(&self, chat_id: i64, timestamp: i64, suggestions: Vec<String>, now: Instant) {
        self.batches.lock().await.insert(
            (chat_id, timestamp),
            Batch {
                suggestions,
                stored_at: now,
            },
        );
    }

    /// Takes the chosen suggestion and drops its batch. `None` when the batch
    /// expired, was already used, or the index is out of range.
    pub async fn take(&self, chat_id: i64, index: usize, timestamp: i64) -> Option<String> {
        self.take_at(chat_id, index, timestamp, Instant::now()).await
    }

    async fn take_at(&self, chat_id: i64, index: usize, timestamp: i64, now: Instant) -> Option<String> {
        let mut batches = self.batches.lock().await;
        let key = (chat_id, timestamp);

        let (expired, chosen) = {
            let batch = batches.get(&key)?;
            (
                now.saturating_duration_since(batch.stored_at) > self.ttl,
                batch.suggestions.get(index).cloned(),
            )
        };
        if expired {
            batches.remove(&key);
            return None;
        }

        let chosen = chosen?;
        batches.remove(&key);
        Some(chosen)
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut batches = self.batches.lock().await;
        let before = batches.len();
        batches.retain(|_, batch| now.saturating_duration_since(batch.stored_at) <= self.ttl);
        before - batches.len()
    }
}
