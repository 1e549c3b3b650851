use crate::models::{Conversation, ConversationSummary};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str =
    "id, session_id, messages, start_time, last_activity, user_ip, user_agent, is_active";

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<Conversation>, String> {
    let query_span = tracing::info_span!("Fetch conversation by id", id = %id);
    let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");

    sqlx::query_as::<_, Conversation>(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch conversation: {:?}", err);
            "Could not fetch data".to_string()
        })
}

pub async fn fetch_by_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<Conversation>, String> {
    let query_span = tracing::info_span!("Fetch conversation by session", session_id = %session_id);
    let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE session_id = $1");

    sqlx::query_as::<_, Conversation>(&query)
        .bind(session_id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch conversation: {:?}", err);
            "Could not fetch data".to_string()
        })
}

/// A match on `id` wins over a match on `session_id`.
pub async fn fetch_by_id_or_session(
    pool: &PgPool,
    id: Uuid,
    session_id: &str,
) -> Result<Option<Conversation>, String> {
    let query_span = tracing::info_span!("Fetch conversation by id or session", id = %id);
    let query = format!(
        r#"SELECT {CONVERSATION_COLUMNS} FROM conversations
        WHERE id = $1 OR session_id = $2
        ORDER BY (id = $1) DESC
        LIMIT 1"#
    );

    sqlx::query_as::<_, Conversation>(&query)
        .bind(id)
        .bind(session_id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch conversation: {:?}", err);
            "Could not fetch data".to_string()
        })
}

/// Insert a fresh conversation. When another request already created one for
/// the same session, that row is returned instead.
pub async fn create(pool: &PgPool, conversation: &Conversation) -> Result<Conversation, String> {
    let query_span = tracing::info_span!("Creating conversation", session_id = %conversation.session_id);
    let query = format!(
        r#"INSERT INTO conversations (
            id, session_id, messages, start_time, last_activity, user_ip, user_agent, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (session_id) DO UPDATE
        SET updated_at = NOW()
        RETURNING {CONVERSATION_COLUMNS}"#
    );

    sqlx::query_as::<_, Conversation>(&query)
        .bind(conversation.id)
        .bind(&conversation.session_id)
        .bind(&conversation.messages)
        .bind(conversation.start_time)
        .bind(conversation.last_activity)
        .bind(&conversation.user_ip)
        .bind(&conversation.user_agent)
        .bind(conversation.is_active)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to create conversation: {:?}", err);
            "Failed to save conversation".to_string()
        })
}

pub async fn upsert(pool: &PgPool, conversation: &Conversation) -> Result<(), String> {
    let query_span = tracing::info_span!("Saving conversation", id = %conversation.id);

    sqlx::query(
        r#"INSERT INTO conversations (
            id, session_id, messages, start_time, last_activity, user_ip, user_agent, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO UPDATE
        SET messages = EXCLUDED.messages,
            last_activity = EXCLUDED.last_activity,
            updated_at = NOW()"#,
    )
    .bind(conversation.id)
    .bind(&conversation.session_id)
    .bind(&conversation.messages)
    .bind(conversation.start_time)
    .bind(conversation.last_activity)
    .bind(&conversation.user_ip)
    .bind(&conversation.user_agent)
    .bind(conversation.is_active)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| ())
    .map_err(|err| {
        tracing::error!("Failed to save conversation: {:?}", err);
        "Failed to save conversation".to_string()
    })
}

/// Active conversations, most recent activity first.
pub async fn list_active(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ConversationSummary>, String> {
    let query_span = tracing::info_span!("Fetch active conversations", limit, offset);

    sqlx::query_as::<_, ConversationSummary>(
        r#"SELECT
            id,
            session_id,
            start_time,
            last_activity,
            jsonb_array_length(messages) AS message_count,
            LEFT(COALESCE(messages -> -1 ->> 'text', ''), 100) AS last_message,
            user_ip
        FROM conversations
        WHERE is_active = TRUE
        ORDER BY last_activity DESC
        LIMIT $1 OFFSET $2"#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to list conversations: {:?}", err);
        "Failed to fetch conversations".to_string()
    })
}

pub async fn count_active(pool: &PgPool) -> Result<i64, String> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM conversations WHERE is_active = TRUE")
        .fetch_one(pool)
        .instrument(tracing::info_span!("Count active conversations"))
        .await
        .map_err(|err| {
            tracing::error!("Failed to count conversations: {:?}", err);
            "Failed to fetch conversations".to_string()
        })
}

pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, String> {
    sqlx::query("UPDATE conversations SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(tracing::info_span!("Deactivate conversation", id = %id))
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to deactivate conversation: {:?}", err);
            "Failed to update conversation".to_string()
        })
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, String> {
    sqlx::query("DELETE FROM conversations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(tracing::info_span!("Delete conversation", id = %id))
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to delete conversation: {:?}", err);
            "Failed to delete conversation".to_string()
        })
}
