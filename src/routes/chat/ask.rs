use crate::forms;
use crate::helpers::JsonResponse;
use crate::routes::chat::{chat_error, session_context};
use crate::services::ChatService;
use actix_web::{post, web, HttpRequest, Responder, Result};

#[tracing::instrument(name = "Ask question.", skip(req, form, chat))]
#[post("/ask")]
pub async fn ask_handler(
    req: HttpRequest,
    form: web::Json<forms::AskQuestion>,
    chat: web::Data<ChatService>,
) -> Result<impl Responder> {
    let request = form
        .into_inner()
        .into_request()
        .map_err(JsonResponse::bad_request)?;

    chat.ask(request, session_context(&req))
        .await
        .map(|outcome| JsonResponse::build().set_item(outcome).ok("OK"))
        .map_err(chat_error)
}

#[tracing::instrument(name = "Ask document question.", skip(req, form, chat))]
#[post("/ask-document")]
pub async fn ask_document_handler(
    req: HttpRequest,
    form: web::Json<forms::AskQuestion>,
    chat: web::Data<ChatService>,
) -> Result<impl Responder> {
    if form.document_id.is_none() {
        return Err(JsonResponse::bad_request(
            "Document ID is required for document-specific queries",
        ));
    }
    let request = form
        .into_inner()
        .into_request()
        .map_err(JsonResponse::bad_request)?;

    chat.ask(request, session_context(&req))
        .await
        .map(|outcome| JsonResponse::build().set_item(outcome).ok("OK"))
        .map_err(chat_error)
}
