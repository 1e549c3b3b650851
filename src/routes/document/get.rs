use crate::helpers::JsonResponse;
use crate::routes::document::document_error;
use crate::services::DocumentService;
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, Responder, Result};
use uuid::Uuid;

#[tracing::instrument(name = "List announcements.", skip(documents))]
#[get("/announcements")]
pub async fn announcements_handler(documents: web::Data<DocumentService>) -> Result<impl Responder> {
    documents
        .list()
        .await
        .map(|list| JsonResponse::build().set_list(list).ok("OK"))
        .map_err(document_error)
}

#[tracing::instrument(name = "Document status.", skip(documents))]
#[get("/{id}/status")]
pub async fn status_handler(
    path: web::Path<(Uuid,)>,
    documents: web::Data<DocumentService>,
) -> Result<impl Responder> {
    documents
        .status(path.0)
        .await
        .map(|report| JsonResponse::build().set_item(report).ok("OK"))
        .map_err(document_error)
}

/// Streams the stored file inline under its original name.
#[tracing::instrument(name = "View document.", skip(documents))]
#[get("/{id}/view")]
pub async fn view_handler(
    path: web::Path<(Uuid,)>,
    documents: web::Data<DocumentService>,
) -> Result<NamedFile> {
    let (document, file_path) = documents.file(path.0).await.map_err(document_error)?;

    let file = NamedFile::open_async(file_path).await.map_err(|err| {
        tracing::error!("Failed to open document file: {:?}", err);
        JsonResponse::not_found("Document file not found")
    })?;

    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Inline,
        parameters: vec![DispositionParam::Filename(document.original_name)],
    }))
}
