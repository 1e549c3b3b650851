use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::Instrument;

use super::types::{
    ChatAnswer, DocumentUpload, ErrorBody, MultiSearchRequest, ProcessOutcome, ProcessResponse,
    QueryRequest, StatusResponse,
};
use super::AiPipelineConnector;
use crate::connectors::config::AiPipelineConfig;
use crate::connectors::errors::ConnectorError;

/// HTTP-based AI pipeline client
pub struct AiPipelineClient {
    base_url: String,
    http_client: reqwest::Client,
    query_timeout: Duration,
    process_timeout: Duration,
    status_timeout: Duration,
}

impl AiPipelineClient {
    pub fn new(config: AiPipelineConfig) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            process_timeout: Duration::from_secs(config.process_timeout_secs),
            status_timeout: Duration::from_secs(config.status_timeout_secs),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn checked_answer(answer: ChatAnswer) -> Result<ChatAnswer, ConnectorError> {
        if answer.success {
            Ok(answer)
        } else {
            Err(ConnectorError::Unsuccessful(answer.response))
        }
    }
}

/// Decode a 2xx body, or turn a non-2xx answer into [`ConnectorError::Rejected`].
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ConnectorError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.detail_text())
            .unwrap_or(text);
        return Err(ConnectorError::Rejected {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_str::<T>(&text).map_err(|_| ConnectorError::InvalidResponse(text))
}

#[async_trait::async_trait]
impl AiPipelineConnector for AiPipelineClient {
    async fn query(
        &self,
        query: &str,
        document_id: Option<&str>,
    ) -> Result<ChatAnswer, ConnectorError> {
        let span = tracing::info_span!("ai_pipeline_query", document_id = ?document_id);

        let resp = self
            .http_client
            .post(self.url("/api/chat/query"))
            .timeout(self.query_timeout)
            .json(&QueryRequest { query, document_id })
            .send()
            .instrument(span)
            .await?;

        read_json::<ChatAnswer>(resp)
            .await
            .and_then(Self::checked_answer)
    }

    async fn search_multiple(
        &self,
        query: &str,
        document_ids: &[String],
    ) -> Result<ChatAnswer, ConnectorError> {
        let span = tracing::info_span!("ai_pipeline_search_multiple", documents = document_ids.len());

        let resp = self
            .http_client
            .post(self.url("/api/chat/search-multiple"))
            .timeout(self.query_timeout)
            .json(&MultiSearchRequest {
                query,
                document_ids,
            })
            .send()
            .instrument(span)
            .await?;

        read_json::<ChatAnswer>(resp)
            .await
            .and_then(Self::checked_answer)
    }

    async fn process_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<ProcessOutcome, ConnectorError> {
        let span = tracing::info_span!(
            "ai_pipeline_process_document",
            document_id = %upload.document_id,
            filename = %upload.filename
        );

        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.mime_type)
            .map_err(|err| ConnectorError::HttpError(err.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http_client
            .post(self.url("/api/documents/process"))
            .timeout(self.process_timeout)
            .multipart(form)
            .send()
            .instrument(span)
            .await?;

        let processed = read_json::<ProcessResponse>(resp).await?;
        match (processed.success, processed.document_id) {
            (true, Some(pipeline_id)) if !pipeline_id.is_empty() => {
                Ok(ProcessOutcome::Indexed { pipeline_id })
            }
            (true, _) => Err(ConnectorError::InvalidResponse(
                "processing succeeded without a document id".to_string(),
            )),
            (false, _) => Err(ConnectorError::Unsuccessful(processed.message)),
        }
    }

    async fn document_status(&self, pipeline_id: &str) -> Result<String, ConnectorError> {
        let span = tracing::info_span!("ai_pipeline_document_status", pipeline_id = %pipeline_id);

        let resp = self
            .http_client
            .get(self.url(&format!("/api/documents/status/{}", pipeline_id)))
            .timeout(self.status_timeout)
            .send()
            .instrument(span)
            .await?;

        let status = read_json::<StatusResponse>(resp).await?;
        if status.success {
            Ok(status.message)
        } else {
            Err(ConnectorError::Unsuccessful(status.message))
        }
    }

    async fn delete_document(&self, pipeline_id: &str) -> Result<(), ConnectorError> {
        let span = tracing::info_span!("ai_pipeline_delete_document", pipeline_id = %pipeline_id);

        let resp = self
            .http_client
            .delete(self.url(&format!("/api/documents/{}", pipeline_id)))
            .timeout(self.status_timeout)
            .send()
            .instrument(span)
            .await?;

        read_json::<serde_json::Value>(resp).await.map(|_| ())
    }

    async fn health(&self) -> Result<(), ConnectorError> {
        let resp = self
            .http_client
            .get(self.url("/health"))
            .timeout(self.status_timeout)
            .send()
            .await?;

        read_json::<serde_json::Value>(resp).await.map(|_| ())
    }
}
