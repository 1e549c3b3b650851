use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use serde::Serialize;

/// Envelope shared by every JSON endpoint: `{success, message, item?, list?, pagination?}`.
#[derive(Serialize, Debug)]
pub struct JsonResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_conversations: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };

        Self {
            current_page: page,
            total_pages,
            total_conversations: total,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

pub struct JsonResponseBuilder<T> {
    message: String,
    item: Option<T>,
    list: Option<Vec<T>>,
    pagination: Option<Pagination>,
}

impl<T> Default for JsonResponseBuilder<T> {
    fn default() -> Self {
        Self {
            message: String::new(),
            item: None,
            list: None,
            pagination: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub fn set_msg<I: Into<String>>(mut self, msg: I) -> Self {
        self.message = msg.into();
        self
    }

    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    pub fn set_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    fn to_json_response(self, success: bool) -> JsonResponse<T> {
        JsonResponse {
            success,
            message: self.message,
            item: self.item,
            list: self.list,
            pagination: self.pagination,
        }
    }

    pub fn ok<I: Into<String>>(self, msg: I) -> web::Json<JsonResponse<T>> {
        web::Json(self.set_msg(msg).to_json_response(true))
    }

    pub fn created<I: Into<String>>(self, msg: I) -> HttpResponse {
        HttpResponse::Created().json(self.set_msg(msg).to_json_response(true))
    }

    /// Error envelope with an explicit status, usable outside the shorthand helpers.
    pub fn error<I: Into<String>>(self, status: StatusCode, msg: I) -> Error {
        let msg = msg.into();
        let msg = if msg.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string()
        } else {
            msg
        };
        let body = self.set_msg(msg.clone()).to_json_response(false);
        InternalError::from_response(msg, HttpResponse::build(status).json(body)).into()
    }

    pub fn bad_request<I: Into<String>>(self, msg: I) -> Error {
        self.error(StatusCode::BAD_REQUEST, msg)
    }

    pub fn form_error<I: Into<String>>(self, msg: I) -> Error {
        self.error(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized<I: Into<String>>(self, msg: I) -> Error {
        self.error(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found<I: Into<String>>(self, msg: I) -> Error {
        self.error(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal_server_error<I: Into<String>>(self, msg: I) -> Error {
        self.error(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

impl JsonResponse<()> {
    pub fn bad_request<I: Into<String>>(msg: I) -> Error {
        JsonResponse::<()>::build().bad_request(msg)
    }

    pub fn unauthorized<I: Into<String>>(msg: I) -> Error {
        JsonResponse::<()>::build().unauthorized(msg)
    }

    pub fn not_found<I: Into<String>>(msg: I) -> Error {
        JsonResponse::<()>::build().not_found(msg)
    }

    pub fn internal_server_error<I: Into<String>>(msg: I) -> Error {
        JsonResponse::<()>::build().internal_server_error(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn ok_envelope_skips_empty_fields() {
        let json = JsonResponse::<String>::build().ok("OK");
        let value = serde_json::to_value(&json.0).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "message": "OK"}));
    }

    #[test]
    fn item_is_serialized_when_set() {
        let json = JsonResponse::build().set_item(42).ok("found");
        let value = serde_json::to_value(&json.0).unwrap();
        assert_eq!(value["item"], 42);
    }

    #[test]
    fn error_carries_status_and_envelope() {
        let err = JsonResponse::<()>::build().not_found("Document not found");
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().try_into_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Document not found");
    }

    #[test]
    fn blank_error_message_falls_back_to_reason() {
        let err = JsonResponse::<()>::build().internal_server_error("");
        let bytes = err.error_response().into_body().try_into_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["message"], "Internal Server Error");
    }

    #[test]
    fn pagination_math() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(3, 20, 45);
        assert!(!p.has_next);
        assert!(p.has_prev);

        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
    }
}
