use crate::configuration::Settings;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models::AdminUser;
use crate::routes::document::document_error;
use crate::services::{DocumentService, NewUpload};
use actix_multipart::{Field, Multipart};
use actix_web::{post, web, Error, HttpResponse, Result};
use futures_util::TryStreamExt;
use serde_valid::Validate;
use std::sync::Arc;

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|err| {
        tracing::warn!("Malformed multipart payload: {}", err);
        JsonResponse::bad_request("Malformed multipart payload")
    })? {
        if bytes.len() + chunk.len() > limit {
            return Err(JsonResponse::bad_request(format!(
                "File too large. Maximum size is {}MB",
                limit / (1024 * 1024)
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Multipart form with a `document` file part and a `title` text part.
#[tracing::instrument(name = "Upload document.", skip(payload, documents, settings, admin))]
#[post("/upload")]
pub async fn upload_handler(
    admin: web::ReqData<Arc<AdminUser>>,
    mut payload: Multipart,
    documents: web::Data<DocumentService>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse> {
    let max_bytes = settings.uploads.max_file_size_bytes();
    let mut title: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(|err| {
        tracing::warn!("Malformed multipart payload: {}", err);
        JsonResponse::bad_request("Malformed multipart payload")
    })? {
        let name = field.name().to_string();
        match name.as_str() {
            "title" => {
                let raw = read_field(&mut field, 4096).await?;
                title = Some(String::from_utf8_lossy(&raw).trim().to_string());
            }
            "document" => {
                let original_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or("document")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_default();
                let bytes = read_field(&mut field, max_bytes).await?;
                file = Some((original_name, mime_type, bytes));
            }
            _ => {
                read_field(&mut field, max_bytes).await?;
            }
        }
    }

    let (original_name, mime_type, bytes) =
        file.ok_or_else(|| JsonResponse::bad_request("No file uploaded"))?;
    let meta = forms::UploadMeta {
        title: title.unwrap_or_default(),
    };
    if let Err(errors) = meta.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }

    let outcome = documents
        .upload(
            NewUpload {
                title: meta.title,
                original_name,
                mime_type,
                bytes,
            },
            admin.id,
        )
        .await
        .map_err(document_error)?;

    Ok(JsonResponse::build()
        .set_item(outcome.document)
        .created(outcome.message))
}
