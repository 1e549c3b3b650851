use crate::helpers::JsonResponse;
use crate::routes::document::document_error;
use crate::services::DocumentService;
use actix_web::{delete, post, web, Responder, Result};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct Cleanup {
    pub deleted_count: u64,
}

#[tracing::instrument(name = "Delete document.", skip(documents))]
#[delete("/{id}")]
pub async fn delete_handler(
    path: web::Path<(Uuid,)>,
    documents: web::Data<DocumentService>,
) -> Result<impl Responder> {
    documents
        .delete(path.0)
        .await
        .map(|_| JsonResponse::<()>::build().ok("Document deleted successfully"))
        .map_err(document_error)
}

#[tracing::instrument(name = "Cleanup documents.", skip(documents))]
#[post("/cleanup")]
pub async fn cleanup_handler(documents: web::Data<DocumentService>) -> Result<impl Responder> {
    documents
        .cleanup()
        .await
        .map(|deleted_count| {
            JsonResponse::build()
                .set_item(Cleanup { deleted_count })
                .ok(format!("Cleaned up {} documents", deleted_count))
        })
        .map_err(document_error)
}
