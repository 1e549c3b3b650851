use crate::db;
use crate::forms;
use crate::helpers::{JsonResponse, Pagination};
use actix_web::{delete, get, put, web, Responder, Result};
use serde_valid::Validate;
use sqlx::PgPool;
use uuid::Uuid;

#[tracing::instrument(name = "List active conversations.", skip(pg_pool))]
#[get("")]
pub async fn list_handler(
    query: web::Query<forms::ConversationListQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    if let Err(errors) = query.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }

    let conversations =
        db::conversation::list_active(pg_pool.get_ref(), query.limit(), query.offset())
            .await
            .map_err(JsonResponse::internal_server_error)?;
    let total = db::conversation::count_active(pg_pool.get_ref())
        .await
        .map_err(JsonResponse::internal_server_error)?;

    Ok(JsonResponse::build()
        .set_list(conversations)
        .set_pagination(Pagination::new(query.page(), query.limit(), total))
        .ok("OK"))
}

#[tracing::instrument(name = "Get conversation.", skip(pg_pool))]
#[get("/{id}")]
pub async fn item_handler(
    path: web::Path<(Uuid,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    db::conversation::fetch(pg_pool.get_ref(), path.0)
        .await
        .map_err(JsonResponse::internal_server_error)?
        .map(|conversation| JsonResponse::build().set_item(conversation).ok("OK"))
        .ok_or_else(|| JsonResponse::not_found("Conversation not found"))
}

#[tracing::instrument(name = "Delete conversation.", skip(pg_pool))]
#[delete("/{id}")]
pub async fn delete_handler(
    path: web::Path<(Uuid,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    match db::conversation::delete(pg_pool.get_ref(), path.0).await {
        Ok(true) => Ok(JsonResponse::<()>::build().ok("Conversation deleted successfully")),
        Ok(false) => Err(JsonResponse::not_found("Conversation not found")),
        Err(msg) => Err(JsonResponse::internal_server_error(msg)),
    }
}

#[tracing::instrument(name = "Deactivate conversation.", skip(pg_pool))]
#[put("/{id}/deactivate")]
pub async fn deactivate_handler(
    path: web::Path<(Uuid,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    match db::conversation::deactivate(pg_pool.get_ref(), path.0).await {
        Ok(true) => Ok(JsonResponse::<()>::build().ok("Conversation deactivated successfully")),
        Ok(false) => Err(JsonResponse::not_found("Conversation not found")),
        Err(msg) => Err(JsonResponse::internal_server_error(msg)),
    }
}
