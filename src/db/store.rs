use crate::db;
use crate::models::{Conversation, Document};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Conversation persistence as seen by the chat orchestration.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<Conversation>, String>;

    async fn find_by_id_or_session(
        &self,
        id: Uuid,
        session_id: &str,
    ) -> Result<Option<Conversation>, String>;

    /// Persist a new conversation, or hand back the one its session already has.
    async fn create(&self, conversation: &Conversation) -> Result<Conversation, String>;

    async fn save(&self, conversation: &Conversation) -> Result<(), String>;
}

/// Read side of document persistence used when resolving question scope.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Document>, String>;

    /// Indexed documents, newest first.
    async fn list_indexed(&self) -> Result<Vec<Document>, String>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<Conversation>, String> {
        db::conversation::fetch_by_session(&self.pool, session_id).await
    }

    async fn find_by_id_or_session(
        &self,
        id: Uuid,
        session_id: &str,
    ) -> Result<Option<Conversation>, String> {
        db::conversation::fetch_by_id_or_session(&self.pool, id, session_id).await
    }

    async fn create(&self, conversation: &Conversation) -> Result<Conversation, String> {
        db::conversation::create(&self.pool, conversation).await
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), String> {
        db::conversation::upsert(&self.pool, conversation).await
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Document>, String> {
        db::document::fetch(&self.pool, id).await
    }

    async fn list_indexed(&self) -> Result<Vec<Document>, String> {
        db::document::list_indexed(&self.pool).await
    }
}
