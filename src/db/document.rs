use crate::models::{Document, DocumentStatus, DocumentSummary};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = r#"id, title, filename, original_name, file_path, mime_type, size,
    status, ai_pipeline_id, error_message, uploaded_by, upload_date, updated_at"#;

pub async fn insert(pool: &PgPool, document: &Document) -> Result<Document, String> {
    let query_span = tracing::info_span!("Saving new document into the database", title = %document.title);
    let query = format!(
        r#"INSERT INTO documents (
            id, title, filename, original_name, file_path, mime_type, size,
            status, ai_pipeline_id, error_message, uploaded_by, upload_date, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {DOCUMENT_COLUMNS}"#
    );

    sqlx::query_as::<_, Document>(&query)
        .bind(document.id)
        .bind(&document.title)
        .bind(&document.filename)
        .bind(&document.original_name)
        .bind(&document.file_path)
        .bind(&document.mime_type)
        .bind(document.size)
        .bind(document.status)
        .bind(&document.ai_pipeline_id)
        .bind(&document.error_message)
        .bind(document.uploaded_by)
        .bind(document.upload_date)
        .bind(document.updated_at)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to insert document: {:?}", err);
            "Failed to insert document".to_string()
        })
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<Document>, String> {
    let query_span = tracing::info_span!("Fetch document by id", id = %id);
    let query = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 LIMIT 1");

    sqlx::query_as::<_, Document>(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch document, error: {:?}", err);
            "Could not fetch data".to_string()
        })
}

/// Every document, newest first, with the uploader's username.
pub async fn list_summaries(pool: &PgPool) -> Result<Vec<DocumentSummary>, String> {
    let query_span = tracing::info_span!("Fetch document listing");

    sqlx::query_as::<_, DocumentSummary>(
        r#"SELECT
            d.id,
            d.title,
            d.original_name AS filename,
            d.size,
            d.upload_date AS uploaded_at,
            d.status,
            COALESCE(a.username, 'Unknown') AS uploaded_by
        FROM documents d
        LEFT JOIN admin_users a ON a.id = d.uploaded_by
        ORDER BY d.upload_date DESC"#,
    )
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to list documents: {:?}", err);
        "Failed to fetch documents".to_string()
    })
}

pub async fn list_indexed(pool: &PgPool) -> Result<Vec<Document>, String> {
    let query_span = tracing::info_span!("Fetch indexed documents");
    let query = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE status = $1 ORDER BY upload_date DESC"
    );

    sqlx::query_as::<_, Document>(&query)
        .bind(DocumentStatus::Indexed)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch indexed documents: {:?}", err);
            "Could not fetch data".to_string()
        })
}

/// Documents left behind by mock mode or by failed processing.
pub async fn list_stale(pool: &PgPool) -> Result<Vec<Document>, String> {
    let query_span = tracing::info_span!("Fetch stale documents");
    let query = format!(
        r#"SELECT {DOCUMENT_COLUMNS} FROM documents
        WHERE ai_pipeline_id LIKE 'mock\_%'
           OR status IN ('pending_api_key', 'failed')"#
    );

    sqlx::query_as::<_, Document>(&query)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch stale documents: {:?}", err);
            "Could not fetch data".to_string()
        })
}

/// Absent `ai_pipeline_id`/`error_message` keep their stored values.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: DocumentStatus,
    ai_pipeline_id: Option<&str>,
    error_message: Option<&str>,
) -> Result<Option<Document>, String> {
    let query_span = tracing::info_span!("Update document status", id = %id, status = %status);
    let query = format!(
        r#"UPDATE documents
        SET status = $2,
            ai_pipeline_id = COALESCE($3, ai_pipeline_id),
            error_message = COALESCE($4, error_message),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {DOCUMENT_COLUMNS}"#
    );

    sqlx::query_as::<_, Document>(&query)
        .bind(id)
        .bind(status)
        .bind(ai_pipeline_id)
        .bind(error_message)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to update document status: {:?}", err);
            "Failed to update document".to_string()
        })
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, String> {
    let query_span = tracing::info_span!("Delete document", id = %id);

    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to delete document: {:?}", err);
            "Failed to delete document".to_string()
        })
}
