//! Route-level business logic.
//!
//! - [`posts`]: the seven post/comment handlers
//! - [`request`]: transport-neutral request/response values
//! - [`validation`]: required-field checks
//!
//! Every handler funnels its outcome through [`respond`], the single place
//! where [`HandlerError`] kinds become status codes and error bodies.

pub mod posts;
pub mod request;
pub mod validation;

pub use request::{ApiRequest, ApiResponse, Status};

use log::{error, warn};
use serde_json::json;

use crate::db::repository::RepositoryError;

/// Body message for every 404.
pub const POST_NOT_FOUND: &str = "The post with the specified ID does not exist.";

/// Why a request ended without reaching its success response.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A required body field was missing or empty. Carries the client-facing message.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// The addressed post does not exist.
    #[error("post {0} does not exist")]
    NotFound(String),

    /// The storage collaborator failed.
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        #[source]
        source: RepositoryError,
        /// Include the underlying error in the response body under `err`.
        diagnostics: bool,
    },
}

impl HandlerError {
    pub fn storage(message: &'static str, source: RepositoryError) -> Self {
        Self::Storage {
            message,
            source,
            diagnostics: false,
        }
    }

    pub fn storage_with_diagnostics(message: &'static str, source: RepositoryError) -> Self {
        Self::Storage {
            message,
            source,
            diagnostics: true,
        }
    }
}

impl From<HandlerError> for ApiResponse {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Validation(message) => {
                ApiResponse::new(Status::BadRequest, json!({ "errorMessage": message }))
            }
            HandlerError::NotFound(_) => {
                ApiResponse::new(Status::NotFound, json!({ "message": POST_NOT_FOUND }))
            }
            HandlerError::Storage {
                message,
                source,
                diagnostics,
            } => {
                let body = if diagnostics {
                    json!({ "error": message, "err": source.to_string() })
                } else {
                    json!({ "error": message })
                };
                ApiResponse::new(Status::InternalServerError, body)
            }
        }
    }
}

/// Map a handler outcome to exactly one response, logging failures.
pub fn respond(operation: &str, outcome: Result<ApiResponse, HandlerError>) -> ApiResponse {
    match outcome {
        Ok(response) => response,
        Err(err) => {
            match &err {
                HandlerError::Storage { .. } => error!("{} failed: {}", operation, err),
                _ => warn!("{} rejected: {}", operation, err),
            }
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let response: ApiResponse = HandlerError::Validation("Please provide text.").into();
        assert_eq!(response.status, Status::BadRequest);
        assert_eq!(response.body_str("errorMessage"), Some("Please provide text."));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response: ApiResponse = HandlerError::NotFound("7".to_string()).into();
        assert_eq!(response.status, Status::NotFound);
        assert_eq!(response.body_str("message"), Some(POST_NOT_FOUND));
    }

    #[test]
    fn test_storage_maps_to_500_without_diagnostics() {
        let err = HandlerError::storage("nope", RepositoryError::query("bad"));
        let response: ApiResponse = err.into();
        assert_eq!(response.status, Status::InternalServerError);
        assert_eq!(response.body_str("error"), Some("nope"));
        assert!(response.body.unwrap().get("err").is_none());
    }

    #[test]
    fn test_storage_diagnostics_attach_source() {
        let err = HandlerError::storage_with_diagnostics("nope", RepositoryError::query("bad"));
        let response: ApiResponse = err.into();
        let err_text = response.body_str("err").unwrap();
        assert!(err_text.contains("bad"));
    }

    #[test]
    fn test_respond_passes_success_through() {
        let ok = ApiResponse::no_content();
        assert_eq!(respond("noop", Ok(ok.clone())), ok);
    }
}
