use crate::configuration::Settings;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::services::{auth, AuthError};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;
use sqlx::PgPool;

#[tracing::instrument(name = "Admin login.", skip(form, pg_pool, settings), fields(username = %form.username))]
#[post("/login")]
pub async fn login_handler(
    form: web::Json<forms::Login>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }

    auth::login(
        pg_pool.get_ref(),
        &settings.jwt,
        form.username.trim(),
        &form.password,
    )
    .await
    .map(|outcome| JsonResponse::build().set_item(outcome).ok("Login successful"))
    .map_err(|err| match err {
        AuthError::InvalidCredentials => JsonResponse::unauthorized(err.to_string()),
        err => JsonResponse::internal_server_error(err.to_string()),
    })
}
