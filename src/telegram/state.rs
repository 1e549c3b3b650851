//! Shared state for the bot's handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::api_client::BackendClient;
use super::rate_limiter::RateLimiter;
use super::suggestions::SuggestionCache;

pub struct BotState {
    pub backend: BackendClient,
    pub limiter: RateLimiter,
    pub suggestions: SuggestionCache,
    /// Bot username without the leading `@`, filled in from `getMe`.
    pub username: String,
    conversations: RwLock<HashMap<u64, Uuid>>,
}

impl BotState {
    pub fn new(backend: BackendClient, limiter: RateLimiter, username: String) -> Self {
        Self {
            backend,
            limiter,
            suggestions: SuggestionCache::default(),
            username,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    pub async fn conversation(&self, user_id: u64) -> Option<Uuid> {
        self.conversations.read().await.get(&user_id).copied()
    }

    pub async fn remember_conversation(&self, user_id: u64, conversation_id: Uuid) {
        self.conversations
            .write()
            .await
            .insert(user_id, conversation_id);
    }

    /// Returns whether the user had a conversation to forget.
    pub async fn clear_conversation(&self, user_id: u64) -> bool {
        self.conversations.write().await.remove(&user_id).is_some()
    }

    pub async fn active_conversations(&self) -> usize {
        self.conversations.read().await.len()
    }
}

pub type SharedState = Arc<BotState>;
