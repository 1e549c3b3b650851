mod delete;
mod get;
mod upload;
mod webhook;

pub use delete::*;
pub use get::*;
pub use upload::*;
pub use webhook::*;

use crate::helpers::JsonResponse;
use crate::services::DocumentError;
use actix_web::Error;

pub(crate) fn document_error(err: DocumentError) -> Error {
    match err {
        DocumentError::UnsupportedType(_)
        | DocumentError::TooLarge(_)
        | DocumentError::EmptyFile => {
            JsonResponse::bad_request(err.to_string())
        }
        DocumentError::NotFound | DocumentError::FileMissing => {
            JsonResponse::not_found(err.to_string())
        }
        DocumentError::Processing(msg) | DocumentError::Storage(msg) => {
            JsonResponse::internal_server_error(msg)
        }
    }
}
