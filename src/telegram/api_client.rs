//! HTTP client for the backend's Telegram endpoints.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Result, TelegramError};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
const USER_AGENT: &str = "CampusMitra-TelegramBot/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct AskPayload<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<Uuid>,
    telegram_user_id: i64,
    telegram_chat_id: i64,
}

/// Who is asking, as Telegram reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asker {
    pub user_id: i64,
    pub chat_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotAnswer {
    pub response: String,
    #[serde(default)]
    pub top_source_suggestions: Vec<String>,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub uptime: u64,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: String,
    item: Option<T>,
}

pub struct BackendClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TelegramError::Request(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[tracing::instrument(name = "Backend ask.", skip(self, question))]
    pub async fn ask(
        &self,
        question: &str,
        conversation_id: Option<Uuid>,
        asker: Asker,
    ) -> Result<BotAnswer> {
        let payload = AskPayload {
            question: question.trim(),
            conversation_id,
            document_id: None,
            telegram_user_id: asker.user_id,
            telegram_chat_id: asker.chat_id,
        };
        self.post("/api/telegram/ask", &payload).await
    }

    #[tracing::instrument(name = "Backend document ask.", skip(self, question))]
    pub async fn ask_document(
        &self,
        question: &str,
        document_id: Uuid,
        conversation_id: Option<Uuid>,
        asker: Asker,
    ) -> Result<BotAnswer> {
        let payload = AskPayload {
            question: question.trim(),
            conversation_id,
            document_id: Some(document_id),
            telegram_user_id: asker.user_id,
            telegram_chat_id: asker.chat_id,
        };
        self.post("/api/telegram/ask-document", &payload).await
    }

    pub async fn health(&self) -> Result<BackendHealth> {
        let resp = self
            .http_client
            .get(self.url("/api/telegram/health"))
            .send()
            .await?;
        read_item(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, payload: &AskPayload<'_>) -> Result<T> {
        let resp = self
            .http_client
            .post(self.url(path))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Backend request to {} failed: {:?}", path, e);
                TelegramError::from(e)
            })?;
        tracing::debug!(status = resp.status().as_u16(), path, "Backend responded");
        read_item(resp).await
    }
}

/// Unwraps the `{success, message, item}` envelope.
async fn read_item<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;

    let envelope = match serde_json::from_str::<Envelope<T>>(&text) {
        Ok(envelope) => envelope,
        Err(_) => {
            return Err(TelegramError::Api {
                status,
                message: "Unknown error".to_string(),
            })
        }
    };

    match envelope.item {
        Some(item) if envelope.success && (200..300).contains(&status) => Ok(item),
        _ => Err(TelegramError::Api {
            status,
            message: if envelope.message.is_empty() {
                "Unknown error".to_string()
            } else {
                envelope.message
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ASKER: Asker = Asker {
        user_id: 42,
        chat_id: 4200,
    };

    #[tokio::test]
    async fn ask_posts_identity_and_unwraps_item() {
        let server = MockServer::start().await;
        let conversation = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/api/telegram/ask"))
            .and(header("user-agent", USER_AGENT))
            .and(body_partial_json(serde_json::json!({
                "question": "Where is the library?",
                "telegram_user_id": 42,
                "telegram_chat_id": 4200
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "OK",
                "item": {
                    "response": "Block C.",
                    "top_source_suggestions": ["Library hours"],
                    "conversation_id": conversation,
                    "platform": "telegram"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let answer = client
            .ask("  Where is the library?  ", None, ASKER)
            .await
            .unwrap();

        assert_eq!(answer.response, "Block C.");
        assert_eq!(answer.top_source_suggestions, vec!["Library hours"]);
        assert_eq!(answer.conversation_id, Some(conversation));
    }

    #[tokio::test]
    async fn ask_document_targets_document_endpoint() {
        let server = MockServer::start().await;
        let document = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/api/telegram/ask-document"))
            .and(body_partial_json(serde_json::json!({ "document_id": document })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "OK",
                "item": { "response": "Page 2 says so." }
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let answer = client
            .ask_document("What does it say?", document, None, ASKER)
            .await
            .unwrap();
        assert_eq!(answer.response, "Page 2 says so.");
        assert!(answer.conversation_id.is_none());
    }

    #[tokio::test]
    async fn error_envelope_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/telegram/ask"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "message": "Question must be between 2 and 1000 characters"
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let err = client.ask("?", None, ASKER).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API Error (400): Question must be between 2 and 1000 characters"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_as_unavailable() {
        let client = BackendClient::new("http://127.0.0.1:1").unwrap();
        let err = client.ask("Hello there", None, ASKER).await.unwrap_err();
        assert!(matches!(err, TelegramError::BackendUnavailable));
    }

    #[tokio::test]
    async fn health_reads_bot_facing_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/telegram/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "OK",
                "item": { "status": "healthy", "platform": "telegram", "uptime": 12 }
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.uptime, 12);
    }
}
