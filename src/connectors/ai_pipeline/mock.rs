use std::time::Duration;

use rand::seq::SliceRandom;

use super::types::{default_content_type, ChatAnswer, DocumentUpload, ProcessOutcome};
use super::AiPipelineConnector;
use crate::connectors::errors::ConnectorError;
use crate::models::MOCK_PIPELINE_PREFIX;

const ADMISSION: &str = "I can help with admission procedures, entrance exam details, application deadlines, and eligibility criteria. What admission-related question do you have?";
const FINANCE: &str = "I have access to information about fee structures, scholarship programs, and financial aid options. What financial information do you need?";
const ACADEMICS: &str = "I can help you find information about course requirements, schedules, faculty details, and academic procedures. What specific topic are you interested in?";
const FACILITIES: &str = "For campus services, I can provide details about the library, hostels, dining facilities, sports centers, and student activities. How can I assist you today?";

const GENERIC: [&str; 7] = [
    "Hello! I'm here to help you with your campus-related questions. I can assist with information about admissions, academics, events, facilities, and more. What would you like to know?",
    ACADEMICS,
    FACILITIES,
    FINANCE,
    ADMISSION,
    "For current students, I can provide information about exam schedules, assignment deadlines, course materials, and academic support services. How can I help?",
    "I can assist with campus facility bookings, event information, club activities, and student services. What would you like to know about?",
];

const MOCK_INDEXING_DELAY: Duration = Duration::from_secs(3);

/// Local stand-in for the pipeline, used when `MOCK_AI_PIPELINE=true`.
pub struct MockAiPipelineConnector {
    indexing_delay: Duration,
}

impl Default for MockAiPipelineConnector {
    fn default() -> Self {
        Self {
            indexing_delay: MOCK_INDEXING_DELAY,
        }
    }
}

impl MockAiPipelineConnector {
    pub fn with_indexing_delay(indexing_delay: Duration) -> Self {
        Self { indexing_delay }
    }

    fn answer_for(question: &str) -> String {
        let question = question.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| question.contains(word));

        let text = if mentions(&["admission", "apply"]) {
            ADMISSION
        } else if mentions(&["fee", "payment", "scholarship"]) {
            FINANCE
        } else if mentions(&["course", "academic", "exam"]) {
            ACADEMICS
        } else if mentions(&["hostel", "facility", "library"]) {
            FACILITIES
        } else {
            GENERIC
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(GENERIC[0])
        };

        text.to_string()
    }

    fn canned(question: &str) -> ChatAnswer {
        ChatAnswer {
            success: true,
            response: Self::answer_for(question),
            content_type: default_content_type(),
            sources: Some(vec![
                serde_json::json!({"title": "Student Handbook 2024", "relevance": 0.95}),
                serde_json::json!({"title": "Campus Guidelines", "relevance": 0.87}),
            ]),
            top_source_suggestions: None,
        }
    }
}

#[async_trait::async_trait]
impl AiPipelineConnector for MockAiPipelineConnector {
    async fn query(
        &self,
        query: &str,
        _document_id: Option<&str>,
    ) -> Result<ChatAnswer, ConnectorError> {
        Ok(Self::canned(query))
    }

    async fn search_multiple(
        &self,
        query: &str,
        _document_ids: &[String],
    ) -> Result<ChatAnswer, ConnectorError> {
        Ok(Self::canned(query))
    }

    async fn process_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<ProcessOutcome, ConnectorError> {
        Ok(ProcessOutcome::Deferred {
            pipeline_id: format!("{}{}", MOCK_PIPELINE_PREFIX, upload.document_id),
            after: self.indexing_delay,
        })
    }

    async fn document_status(&self, _pipeline_id: &str) -> Result<String, ConnectorError> {
        Ok("Document processed in mock mode".to_string())
    }

    async fn delete_document(&self, _pipeline_id: &str) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn health(&self) -> Result<(), ConnectorError> {
        Ok(())
    }
}
