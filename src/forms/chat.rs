use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

use crate::services::AskRequest;

pub const QUESTION_MIN_CHARS: usize = 2;
pub const QUESTION_MAX_CHARS: usize = 1000;
pub const QUESTION_LENGTH_MESSAGE: &str = "Question must be between 2 and 1000 characters";

/// Trimmed question, or the length message when it falls outside 2..=1000 characters.
pub fn checked_question(question: &str) -> Result<String, String> {
    let question = question.trim();
    let chars = question.chars().count();
    if (QUESTION_MIN_CHARS..=QUESTION_MAX_CHARS).contains(&chars) {
        Ok(question.to_string())
    } else {
        Err(QUESTION_LENGTH_MESSAGE.to_string())
    }
}

/// Conversation ids that do not parse are treated like unknown ones.
fn lenient_uuid(value: Option<&str>) -> Option<Uuid> {
    value.and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// Length is checked on the trimmed question in [`AskQuestion::into_request`],
/// so the form carries no `#[validate]` rules of its own.
#[derive(Serialize, Deserialize, Debug)]
pub struct AskQuestion {
    pub question: String,
    #[serde(default, alias = "conversationId")]
    pub conversation_id: Option<String>,
    #[serde(default, alias = "documentId")]
    pub document_id: Option<Uuid>,
}

impl AskQuestion {
    pub fn into_request(self) -> Result<AskRequest, String> {
        Ok(AskRequest {
            question: checked_question(&self.question)?,
            conversation_id: lenient_uuid(self.conversation_id.as_deref()),
            document_id: self.document_id,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct TelegramAsk {
    pub question: String,
    #[serde(alias = "telegramUserId")]
    #[validate(minimum = 1)]
    pub telegram_user_id: i64,
    #[serde(alias = "telegramChatId")]
    pub telegram_chat_id: i64,
    #[serde(default, alias = "conversationId")]
    pub conversation_id: Option<String>,
    #[serde(default, alias = "documentId")]
    pub document_id: Option<Uuid>,
}

impl TelegramAsk {
    pub fn into_request(self) -> Result<AskRequest, String> {
        Ok(AskRequest {
            question: checked_question(&self.question)?,
            conversation_id: lenient_uuid(self.conversation_id.as_deref()),
            document_id: self.document_id,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ConversationListQuery {
    #[validate(minimum = 1)]
    pub page: Option<i64>,
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub limit: Option<i64>,
}

impl ConversationListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20)
    }

    /// Saturates for absurd pages, which then simply come back empty.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}
