use crate::forms;
use crate::helpers::JsonResponse;
use crate::routes::document::document_error;
use crate::services::DocumentService;
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;

/// Processing result pushed by the AI pipeline.
#[tracing::instrument(name = "Document status webhook.", skip(documents))]
#[post("/webhook")]
pub async fn webhook_handler(
    form: web::Json<forms::WebhookStatus>,
    documents: web::Data<DocumentService>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }

    documents
        .update_status(
            form.document_id,
            form.status,
            form.ai_pipeline_id.as_deref(),
            form.error_message.as_deref(),
        )
        .await
        .map(|document| JsonResponse::build().set_item(document).ok("Document status updated"))
        .map_err(document_error)
}
