//! Question orchestration.
//!
//! Every question is routed to one of three pipeline calls. The route is a
//! [`AskScope`] resolved before anything is persisted, so document errors never
//! leave half-written conversations behind. Pipeline failures are absorbed into
//! an apologetic bot message.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::connectors::{AiPipelineConnector, ChatAnswer, ConnectorError};
use crate::db::{ConversationStore, DocumentStore};
use crate::models::{Conversation, Document, DocumentStatus, Message};

pub const MAX_RESPONSE_CHARS: usize = 4500;
pub const TRUNCATION_MARKER: &str = "\n\n[Response truncated due to length limit]";

const KNOWLEDGE_BASE_APOLOGY: &str = "I apologize, but I'm having trouble accessing my knowledge base right now. Please try again in a moment.";
const DOCUMENT_APOLOGY: &str = "I apologize, but I'm having trouble accessing the document right now. Please try again in a moment.";
const MULTI_DOCUMENT_APOLOGY: &str = "I apologize, but I'm having trouble searching across the documents right now. Please try again in a moment.";

/// Cut `text` to at most `max_chars` characters including the truncation marker.
///
/// Prefers a cut right after the last `.` or newline when that boundary lies in
/// the final fifth of the budget; otherwise hard-cuts and appends `...`.
/// Already-short text is returned unchanged, which makes the cut idempotent.
pub fn truncate_response(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(TRUNCATION_MARKER.chars().count());
    let head: Vec<char> = text.chars().take(budget).collect();

    let boundary = head.iter().rposition(|c| *c == '.' || *c == '\n');
    if let Some(cut) = boundary.filter(|cut| cut * 5 > budget * 4) {
        let mut truncated: String = head[..=cut].iter().collect();
        truncated.push_str(TRUNCATION_MARKER);
        return truncated;
    }

    let mut truncated: String = head[..budget.saturating_sub(3)].iter().collect();
    truncated.push_str("...");
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Who is asking: the session key plus client details stored on new conversations.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session_id: String,
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl SessionContext {
    pub fn generated_session_id() -> String {
        format!("session_{}", Utc::now().timestamp_millis())
    }

    pub fn telegram(telegram_user_id: i64, user_ip: Option<String>) -> Self {
        Self {
            session_id: format!("telegram_{}", telegram_user_id),
            user_ip,
            user_agent: Some(format!("TelegramBot/{}", telegram_user_id)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AskScope {
    General,
    SingleDocument(Document),
    /// Queryable documents, newest first.
    MultiDocument(Vec<Document>),
}

impl AskScope {
    fn apology(&self) -> &'static str {
        match self {
            AskScope::General => KNOWLEDGE_BASE_APOLOGY,
            AskScope::SingleDocument(_) => DOCUMENT_APOLOGY,
            AskScope::MultiDocument(_) => MULTI_DOCUMENT_APOLOGY,
        }
    }

    fn documents_used(&self) -> Vec<String> {
        match self {
            AskScope::General => vec![],
            AskScope::SingleDocument(document) => vec![document.title.clone()],
            AskScope::MultiDocument(documents) => {
                documents.iter().map(|doc| doc.title.clone()).collect()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Document not found")]
    DocumentNotFound,
    #[error("Document is not yet indexed and ready for queries")]
    DocumentNotReady,
    #[error("Document was not properly processed by the AI pipeline. Please re-upload the document.")]
    DocumentNotProcessed,
    #[error("{0}")]
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: String,
    pub conversation_id: Option<Uuid>,
    pub document_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub response: String,
    pub content_type: String,
    pub sources: Vec<serde_json::Value>,
    pub top_source_suggestions: Vec<String>,
    pub conversation_id: Uuid,
    pub session_id: String,
    pub documents_used: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct ChatService {
    conversations: Arc<dyn ConversationStore>,
    documents: Arc<dyn DocumentStore>,
    pipeline: Arc<dyn AiPipelineConnector>,
}

impl ChatService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        documents: Arc<dyn DocumentStore>,
        pipeline: Arc<dyn AiPipelineConnector>,
    ) -> Self {
        Self {
            conversations,
            documents,
            pipeline,
        }
    }

    pub async fn resolve_scope(&self, document_id: Option<Uuid>) -> Result<AskScope, ChatError> {
        if let Some(document_id) = document_id {
            let document = self
                .documents
                .fetch(document_id)
                .await
                .map_err(ChatError::Storage)?
                .ok_or(ChatError::DocumentNotFound)?;

            if document.status != DocumentStatus::Indexed {
                return Err(ChatError::DocumentNotReady);
            }
            if document.real_pipeline_id().is_none() {
                return Err(ChatError::DocumentNotProcessed);
            }
            return Ok(AskScope::SingleDocument(document));
        }

        let queryable: Vec<Document> = self
            .documents
            .list_indexed()
            .await
            .map_err(ChatError::Storage)?
            .into_iter()
            .filter(Document::is_queryable)
            .collect();

        if queryable.is_empty() {
            Ok(AskScope::General)
        } else {
            Ok(AskScope::MultiDocument(queryable))
        }
    }

    /// Unknown conversation ids start a fresh conversation for the session.
    async fn resolve_conversation(
        &self,
        conversation_id: Option<Uuid>,
        ctx: &SessionContext,
    ) -> Result<Conversation, ChatError> {
        let found = match conversation_id {
            Some(id) => self
                .conversations
                .find_by_id_or_session(id, &ctx.session_id)
                .await
                .map_err(ChatError::Storage)?,
            None => self
                .conversations
                .find_by_session(&ctx.session_id)
                .await
                .map_err(ChatError::Storage)?,
        };

        if let Some(conversation) = found {
            return Ok(conversation);
        }
        if let Some(id) = conversation_id {
            tracing::warn!(
                "Conversation {} not found, starting new conversation for session {}",
                id,
                ctx.session_id
            );
        }

        let fresh = Conversation::new(
            ctx.session_id.clone(),
            ctx.user_ip.clone(),
            ctx.user_agent.clone(),
        );
        self.conversations
            .create(&fresh)
            .await
            .map_err(ChatError::Storage)
    }

    /// Call the pipeline for `scope`. A failed multi-document search is retried once as a general query.
    async fn dispatch(
        &self,
        question: &str,
        scope: &AskScope,
    ) -> (Result<ChatAnswer, ConnectorError>, Vec<String>) {
        match scope {
            AskScope::General => (self.pipeline.query(question, None).await, vec![]),
            AskScope::SingleDocument(document) => (
                self.pipeline
                    .query(question, document.real_pipeline_id())
                    .await,
                scope.documents_used(),
            ),
            AskScope::MultiDocument(documents) => {
                let ids: Vec<String> = documents
                    .iter()
                    .filter_map(|doc| doc.real_pipeline_id().map(str::to_string))
                    .collect();

                match self.pipeline.search_multiple(question, &ids).await {
                    Ok(answer) => (Ok(answer), scope.documents_used()),
                    Err(err) => {
                        tracing::warn!(
                            "Multi-document search failed, falling back to general chat: {}",
                            err
                        );
                        (self.pipeline.query(question, None).await, vec![])
                    }
                }
            }
        }
    }

    #[tracing::instrument(name = "Ask question.", skip(self, request), fields(session_id = %ctx.session_id))]
    pub async fn ask(
        &self,
        request: AskRequest,
        ctx: SessionContext,
    ) -> Result<AskOutcome, ChatError> {
        let question = request.question.trim();
        let scope = self.resolve_scope(request.document_id).await?;

        let mut conversation = self
            .resolve_conversation(request.conversation_id, &ctx)
            .await?;
        conversation.push(Message::user(question));
        self.conversations
            .save(&conversation)
            .await
            .map_err(ChatError::Storage)?;

        let (answer, documents_used) = self.dispatch(question, &scope).await;

        let outcome = match answer {
            Ok(answer) => {
                let response = truncate_response(&answer.response, MAX_RESPONSE_CHARS);
                let sources = answer.sources.unwrap_or_default();
                conversation.push(Message::bot(response.clone(), sources.clone()));

                AskOutcome {
                    response,
                    content_type: answer.content_type,
                    sources,
                    top_source_suggestions: answer.top_source_suggestions.unwrap_or_default(),
                    conversation_id: conversation.id,
                    session_id: conversation.session_id.clone(),
                    documents_used,
                    timestamp: Utc::now(),
                }
            }
            Err(err) => {
                tracing::error!("AI pipeline error: {}", err);
                let response = scope.apology().to_string();
                conversation.push(Message::bot(response.clone(), vec![]));

                AskOutcome {
                    response,
                    content_type: "markdown".to_string(),
                    sources: vec![],
                    top_source_suggestions: vec![],
                    conversation_id: conversation.id,
                    session_id: conversation.session_id.clone(),
                    documents_used: vec![],
                    timestamp: Utc::now(),
                }
            }
        };

        self.conversations
            .save(&conversation)
            .await
            .map_err(ChatError::Storage)?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{DocumentUpload, ProcessOutcome};
    use crate::models::Sender;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryConversations {
        rows: Mutex<HashMap<Uuid, Conversation>>,
    }

    impl MemoryConversations {
        fn all(&self) -> Vec<Conversation> {
            self.rows.lock().unwrap().values().cloned().collect()
        }
    }

    #[async_trait::async_trait]
    impl ConversationStore for MemoryConversations {
        async fn find_by_session(&self, session_id: &str) -> Result<Option<Conversation>, String> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|c| c.session_id == session_id)
                .cloned())
        }

        async fn find_by_id_or_session(
            &self,
            id: Uuid,
            session_id: &str,
        ) -> Result<Option<Conversation>, String> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .get(&id)
                .or_else(|| rows.values().find(|c| c.session_id == session_id))
                .cloned())
        }

        async fn create(&self, conversation: &Conversation) -> Result<Conversation, String> {
            let mut rows = self.rows.lock().unwrap();
            let existing = rows
                .values()
                .find(|c| c.session_id == conversation.session_id)
                .cloned();
            if let Some(existing) = existing {
                return Ok(existing);
            }
            rows.insert(conversation.id, conversation.clone());
            Ok(conversation.clone())
        }

        async fn save(&self, conversation: &Conversation) -> Result<(), String> {
            self.rows
                .lock()
                .unwrap()
                .insert(conversation.id, conversation.clone());
            Ok(())
        }
    }

    struct MemoryDocuments(Vec<Document>);

    #[async_trait::async_trait]
    impl DocumentStore for MemoryDocuments {
        async fn fetch(&self, id: Uuid) -> Result<Option<Document>, String> {
            Ok(self.0.iter().find(|d| d.id == id).cloned())
        }

        async fn list_indexed(&self) -> Result<Vec<Document>, String> {
            Ok(self
                .0
                .iter()
                .filter(|d| d.status == DocumentStatus::Indexed)
                .cloned()
                .collect())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Query(Option<String>),
        Multi(Vec<String>),
    }

    /// Pipeline whose query/multi answers are fixed per test; records every call.
    struct ScriptedPipeline {
        query_ok: bool,
        multi_ok: bool,
        response: String,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedPipeline {
        fn new(query_ok: bool, multi_ok: bool) -> Self {
            Self {
                query_ok,
                multi_ok,
                response: "Answer.".to_string(),
                calls: Mutex::new(vec![]),
            }
        }

        fn answer(&self, ok: bool) -> Result<ChatAnswer, ConnectorError> {
            if ok {
                Ok(ChatAnswer {
                    success: true,
                    response: self.response.clone(),
                    content_type: "markdown".to_string(),
                    sources: Some(vec![serde_json::json!({"filename": "a.pdf", "page": 1})]),
                    top_source_suggestions: Some(vec!["Hostel rules".to_string()]),
                })
            } else {
                Err(ConnectorError::ServiceUnavailable("down".to_string()))
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AiPipelineConnector for ScriptedPipeline {
        async fn query(
            &self,
            _query: &str,
            document_id: Option<&str>,
        ) -> Result<ChatAnswer, ConnectorError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Query(document_id.map(str::to_string)));
            self.answer(self.query_ok)
        }

        async fn search_multiple(
            &self,
            _query: &str,
            document_ids: &[String],
        ) -> Result<ChatAnswer, ConnectorError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Multi(document_ids.to_vec()));
            self.answer(self.multi_ok)
        }

        async fn process_document(
            &self,
            _upload: DocumentUpload,
        ) -> Result<ProcessOutcome, ConnectorError> {
            unreachable!()
        }

        async fn document_status(&self, _pipeline_id: &str) -> Result<String, ConnectorError> {
            unreachable!()
        }

        async fn delete_document(&self, _pipeline_id: &str) -> Result<(), ConnectorError> {
            unreachable!()
        }

        async fn health(&self) -> Result<(), ConnectorError> {
            Ok(())
        }
    }

    fn document(title: &str, status: DocumentStatus, pipeline_id: Option<&str>) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: title.to_string(),
            filename: format!("1_{title}.pdf"),
            original_name: format!("{title}.pdf"),
            file_path: format!("uploads/1_{title}.pdf"),
            mime_type: "application/pdf".to_string(),
            size: 100,
            status,
            ai_pipeline_id: pipeline_id.map(str::to_string),
            error_message: None,
            uploaded_by: None,
            upload_date: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ctx() -> SessionContext {
        SessionContext {
            session_id: "session_1".to_string(),
            user_ip: Some("127.0.0.1".to_string()),
            user_agent: Some("test".to_string()),
        }
    }

    fn ask(question: &str) -> AskRequest {
        AskRequest {
            question: question.to_string(),
            conversation_id: None,
            document_id: None,
        }
    }

    struct Harness {
        conversations: Arc<MemoryConversations>,
        pipeline: Arc<ScriptedPipeline>,
        service: ChatService,
    }

    fn harness(documents: Vec<Document>, pipeline: ScriptedPipeline) -> Harness {
        let conversations = Arc::new(MemoryConversations::default());
        let pipeline = Arc::new(pipeline);
        let service = ChatService::new(
            conversations.clone(),
            Arc::new(MemoryDocuments(documents)),
            pipeline.clone(),
        );
        Harness {
            conversations,
            pipeline,
            service,
        }
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_response("hello.", MAX_RESPONSE_CHARS), "hello.");
        let exact = "a".repeat(MAX_RESPONSE_CHARS);
        assert_eq!(truncate_response(&exact, MAX_RESPONSE_CHARS), exact);
    }

    #[test]
    fn long_text_is_cut_at_late_sentence_boundary() {
        let budget = MAX_RESPONSE_CHARS - TRUNCATION_MARKER.chars().count();
        let mut text = "a".repeat(budget - 10);
        text.push('.');
        text.push_str(&"b".repeat(1000));

        let truncated = truncate_response(&text, MAX_RESPONSE_CHARS);
        assert!(truncated.ends_with(&format!(".{TRUNCATION_MARKER}")));
        assert!(truncated.chars().count() <= MAX_RESPONSE_CHARS);
        assert!(!truncated.contains('b'));
    }

    #[test]
    fn early_boundary_falls_back_to_hard_cut() {
        let mut text = "Intro.".to_string();
        text.push_str(&"x".repeat(6000));

        let truncated = truncate_response(&text, MAX_RESPONSE_CHARS);
        assert!(truncated.ends_with(&format!("...{TRUNCATION_MARKER}")));
        assert_eq!(truncated.chars().count(), MAX_RESPONSE_CHARS);
    }

    #[test]
    fn truncation_is_idempotent() {
        let text = "word. ".repeat(2000);
        let once = truncate_response(&text, MAX_RESPONSE_CHARS);
        let twice = truncate_response(&once, MAX_RESPONSE_CHARS);
        assert_eq!(once, twice);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_RESPONSE_CHARS);
        assert_eq!(truncate_response(&text, MAX_RESPONSE_CHARS), text);
    }

    #[test]
    fn telegram_session_context() {
        let ctx = SessionContext::telegram(42, None);
        assert_eq!(ctx.session_id, "telegram_42");
        assert_eq!(ctx.user_agent.as_deref(), Some("TelegramBot/42"));
    }

    #[tokio::test]
    async fn no_queryable_documents_means_general() {
        let docs = vec![
            document("mock", DocumentStatus::Indexed, Some("mock_1")),
            document("pending", DocumentStatus::Processing, None),
        ];
        let h = harness(docs, ScriptedPipeline::new(true, true));

        let outcome = h.service.ask(ask("Where is the library?"), ctx()).await.unwrap();

        assert_eq!(h.pipeline.calls(), vec![Call::Query(None)]);
        assert_eq!(outcome.response, "Answer.");
        assert!(outcome.documents_used.is_empty());
    }

    #[tokio::test]
    async fn queryable_documents_mean_multi_search() {
        let docs = vec![
            document("Handbook", DocumentStatus::Indexed, Some("p-1")),
            document("Fees", DocumentStatus::Indexed, Some("p-2")),
            document("Old", DocumentStatus::Indexed, Some("mock_3")),
        ];
        let h = harness(docs, ScriptedPipeline::new(true, true));

        let outcome = h.service.ask(ask("fees?"), ctx()).await.unwrap();

        assert_eq!(
            h.pipeline.calls(),
            vec![Call::Multi(vec!["p-1".to_string(), "p-2".to_string()])]
        );
        assert_eq!(outcome.documents_used, vec!["Handbook", "Fees"]);
        assert_eq!(outcome.top_source_suggestions, vec!["Hostel rules"]);
    }

    #[tokio::test]
    async fn failed_multi_search_falls_back_to_general() {
        let docs = vec![document("Handbook", DocumentStatus::Indexed, Some("p-1"))];
        let h = harness(docs, ScriptedPipeline::new(true, false));

        let outcome = h.service.ask(ask("fees?"), ctx()).await.unwrap();

        assert_eq!(
            h.pipeline.calls(),
            vec![Call::Multi(vec!["p-1".to_string()]), Call::Query(None)]
        );
        assert_eq!(outcome.response, "Answer.");
        assert!(outcome.documents_used.is_empty());
    }

    #[tokio::test]
    async fn failed_fallback_persists_canned_reply() {
        let docs = vec![document("Handbook", DocumentStatus::Indexed, Some("p-1"))];
        let h = harness(docs, ScriptedPipeline::new(false, false));

        let outcome = h.service.ask(ask("fees?"), ctx()).await.unwrap();

        assert_eq!(outcome.response, MULTI_DOCUMENT_APOLOGY);
        assert!(outcome.sources.is_empty());

        let saved = h.conversations.all();
        assert_eq!(saved.len(), 1);
        let messages = saved[0].messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].text, MULTI_DOCUMENT_APOLOGY);
    }

    #[tokio::test]
    async fn general_failure_uses_knowledge_base_apology() {
        let h = harness(vec![], ScriptedPipeline::new(false, false));
        let outcome = h.service.ask(ask("hello"), ctx()).await.unwrap();
        assert_eq!(outcome.response, KNOWLEDGE_BASE_APOLOGY);
        assert_eq!(outcome.content_type, "markdown");
    }

    #[tokio::test]
    async fn explicit_document_is_queried_alone() {
        let doc = document("Handbook", DocumentStatus::Indexed, Some("p-9"));
        let id = doc.id;
        let h = harness(vec![doc], ScriptedPipeline::new(true, true));

        let outcome = h
            .service
            .ask(
                AskRequest {
                    document_id: Some(id),
                    ..ask("rules?")
                },
                ctx(),
            )
            .await
            .unwrap();

        assert_eq!(h.pipeline.calls(), vec![Call::Query(Some("p-9".to_string()))]);
        assert_eq!(outcome.documents_used, vec!["Handbook"]);
    }

    #[tokio::test]
    async fn failed_document_query_uses_document_apology() {
        let doc = document("Handbook", DocumentStatus::Indexed, Some("p-9"));
        let id = doc.id;
        let h = harness(vec![doc], ScriptedPipeline::new(false, false));

        let outcome = h
            .service
            .ask(
                AskRequest {
                    document_id: Some(id),
                    ..ask("rules?")
                },
                ctx(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.response, DOCUMENT_APOLOGY);
    }

    #[tokio::test]
    async fn document_errors_are_reported_before_persisting() {
        let processing = document("Draft", DocumentStatus::Processing, None);
        let mock = document("Mock", DocumentStatus::Indexed, Some("mock_1"));
        let (processing_id, mock_id) = (processing.id, mock.id);
        let h = harness(vec![processing, mock], ScriptedPipeline::new(true, true));

        let missing = h
            .service
            .ask(AskRequest { document_id: Some(Uuid::new_v4()), ..ask("q?") }, ctx())
            .await;
        assert!(matches!(missing, Err(ChatError::DocumentNotFound)));

        let not_ready = h
            .service
            .ask(AskRequest { document_id: Some(processing_id), ..ask("q?") }, ctx())
            .await;
        assert!(matches!(not_ready, Err(ChatError::DocumentNotReady)));

        let mocked = h
            .service
            .ask(AskRequest { document_id: Some(mock_id), ..ask("q?") }, ctx())
            .await;
        assert!(matches!(mocked, Err(ChatError::DocumentNotProcessed)));

        assert!(h.conversations.all().is_empty());
        assert!(h.pipeline.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_conversation_starts_a_new_one() {
        let h = harness(vec![], ScriptedPipeline::new(true, true));
        let unknown = Uuid::new_v4();

        let outcome = h
            .service
            .ask(AskRequest { conversation_id: Some(unknown), ..ask("hi there") }, ctx())
            .await
            .unwrap();

        assert_ne!(outcome.conversation_id, unknown);
        assert_eq!(outcome.session_id, "session_1");
        assert_eq!(h.conversations.all().len(), 1);
    }

    #[tokio::test]
    async fn same_session_continues_the_conversation() {
        let h = harness(vec![], ScriptedPipeline::new(true, true));

        let first = h.service.ask(ask("first question"), ctx()).await.unwrap();
        let second = h.service.ask(ask("second question"), ctx()).await.unwrap();

        assert_eq!(first.conversation_id, second.conversation_id);
        let saved = h.conversations.all();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].messages().len(), 4);
        assert_eq!(saved[0].messages()[2].text, "second question");
    }

    /// Lookups never see existing rows, as when two first questions for one
    /// session race each other.
    struct LaggingConversations(MemoryConversations);

    #[async_trait::async_trait]
    impl ConversationStore for LaggingConversations {
        async fn find_by_session(&self, _session_id: &str) -> Result<Option<Conversation>, String> {
            Ok(None)
        }

        async fn find_by_id_or_session(
            &self,
            _id: Uuid,
            _session_id: &str,
        ) -> Result<Option<Conversation>, String> {
            Ok(None)
        }

        async fn create(&self, conversation: &Conversation) -> Result<Conversation, String> {
            self.0.create(conversation).await
        }

        async fn save(&self, conversation: &Conversation) -> Result<(), String> {
            self.0.save(conversation).await
        }
    }

    #[tokio::test]
    async fn racing_first_questions_share_the_session_conversation() {
        let conversations = Arc::new(LaggingConversations(MemoryConversations::default()));
        let service = ChatService::new(
            conversations.clone(),
            Arc::new(MemoryDocuments(vec![])),
            Arc::new(ScriptedPipeline::new(true, true)),
        );

        let first = service.ask(ask("first question"), ctx()).await.unwrap();
        let second = service.ask(ask("second question"), ctx()).await.unwrap();

        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(conversations.0.all().len(), 1);
    }

    #[tokio::test]
    async fn conversation_id_is_honoured_across_sessions() {
        let h = harness(vec![], ScriptedPipeline::new(true, true));
        let first = h.service.ask(ask("first"), ctx()).await.unwrap();

        let other_session = SessionContext {
            session_id: "session_2".to_string(),
            ..ctx()
        };
        let second = h
            .service
            .ask(
                AskRequest { conversation_id: Some(first.conversation_id), ..ask("second") },
                other_session,
            )
            .await
            .unwrap();

        assert_eq!(second.conversation_id, first.conversation_id);
        assert_eq!(h.conversations.all().len(), 1);
    }

    #[tokio::test]
    async fn long_answers_are_truncated_before_storage() {
        let mut pipeline = ScriptedPipeline::new(true, true);
        pipeline.response = "z".repeat(MAX_RESPONSE_CHARS * 2);
        let h = harness(vec![], pipeline);

        let outcome = h.service.ask(ask("tell me everything"), ctx()).await.unwrap();

        assert!(outcome.response.ends_with(TRUNCATION_MARKER));
        assert_eq!(h.conversations.all()[0].messages()[1].text, outcome.response);
    }
}
