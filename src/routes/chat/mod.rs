mod ask;
mod conversation;

pub use ask::*;
pub use conversation::*;

use crate::helpers::JsonResponse;
use crate::services::{ChatError, SessionContext};
use actix_web::{Error, HttpRequest};

/// Session key from `X-Session-ID`, then the `session_id` cookie, else a fresh one.
pub(crate) fn session_context(req: &HttpRequest) -> SessionContext {
    let session_id = req
        .headers()
        .get("x-session-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| {
            req.cookie("session_id")
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(SessionContext::generated_session_id);

    SessionContext {
        session_id,
        user_ip: client_ip(req),
        user_agent: req
            .headers()
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

pub(crate) fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(str::to_string)
}

pub(crate) fn chat_error(err: ChatError) -> Error {
    match err {
        ChatError::DocumentNotFound => JsonResponse::not_found(err.to_string()),
        ChatError::DocumentNotReady | ChatError::DocumentNotProcessed => {
            JsonResponse::bad_request(err.to_string())
        }
        ChatError::Storage(msg) => {
            tracing::error!("Chat storage failure: {}", msg);
            JsonResponse::internal_server_error("Failed to process your question")
        }
    }
}
