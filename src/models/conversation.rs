use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

pub const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<serde_json::Value>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into(), vec![])
    }

    pub fn bot(text: impl Into<String>, sources: Vec<serde_json::Value>) -> Self {
        Self::new(Sender::Bot, text.into(), sources)
    }

    fn new(sender: Sender, text: String, sources: Vec<serde_json::Value>) -> Self {
        let text = if text.chars().count() > MAX_MESSAGE_CHARS {
            text.chars().take(MAX_MESSAGE_CHARS).collect()
        } else {
            text
        };

        Self {
            sender,
            text,
            timestamp: Utc::now(),
            sources,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub session_id: String,
    pub messages: Json<Vec<Message>>,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
}

impl Conversation {
    pub fn new(session_id: String, user_ip: Option<String>, user_agent: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session_id,
            messages: Json(vec![]),
            start_time: now,
            last_activity: now,
            user_ip,
            user_agent,
            is_active: true,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.last_activity = message.timestamp;
        self.messages.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages.0
    }
}

/// Row of the admin conversation listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: i32,
    pub last_message: String,
    pub user_ip: Option<String>,
}
