use crate::forms;
use crate::helpers::JsonResponse;
use crate::routes::chat::{chat_error, client_ip};
use crate::services::{AskOutcome, ChatService, SessionContext};
use actix_web::{post, web, HttpRequest, Responder, Result};
use serde::Serialize;
use serde_valid::Validate;

/// Chat answer tagged with the Telegram identity it was asked from.
#[derive(Debug, Serialize)]
pub struct TelegramAnswer {
    #[serde(flatten)]
    pub outcome: AskOutcome,
    pub platform: &'static str,
    pub telegram_user_id: i64,
    pub telegram_chat_id: i64,
}

async fn answer(
    req: &HttpRequest,
    form: forms::TelegramAsk,
    chat: &ChatService,
) -> Result<TelegramAnswer> {
    let telegram_user_id = form.telegram_user_id;
    let telegram_chat_id = form.telegram_chat_id;
    let ctx = SessionContext::telegram(telegram_user_id, client_ip(req));
    let request = form.into_request().map_err(JsonResponse::bad_request)?;

    let outcome = chat.ask(request, ctx).await.map_err(chat_error)?;
    Ok(TelegramAnswer {
        outcome,
        platform: "telegram",
        telegram_user_id,
        telegram_chat_id,
    })
}

#[tracing::instrument(name = "Telegram ask.", skip(req, form, chat), fields(telegram_user_id = form.telegram_user_id))]
#[post("/ask")]
pub async fn ask_handler(
    req: HttpRequest,
    form: web::Json<forms::TelegramAsk>,
    chat: web::Data<ChatService>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }

    let answer = answer(&req, form.into_inner(), chat.get_ref()).await?;
    Ok(JsonResponse::build().set_item(answer).ok("OK"))
}

#[tracing::instrument(name = "Telegram document ask.", skip(req, form, chat), fields(telegram_user_id = form.telegram_user_id))]
#[post("/ask-document")]
pub async fn ask_document_handler(
    req: HttpRequest,
    form: web::Json<forms::TelegramAsk>,
    chat: web::Data<ChatService>,
) -> Result<impl Responder> {
    if form.document_id.is_none() {
        return Err(JsonResponse::bad_request(
            "Document ID is required for document-specific queries",
        ));
    }
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }

    let answer = answer(&req, form.into_inner(), chat.get_ref()).await?;
    Ok(JsonResponse::build().set_item(answer).ok("OK"))
}
