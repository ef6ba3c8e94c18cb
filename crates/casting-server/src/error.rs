//! API errors and the JSON error envelope.
//!
//! Every failure is rendered as
//! `{"success": false, "error": <status>, "message": <string or object>}`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use casting_auth::AuthError;
use casting_core::ValidationError;
use casting_store::StoreError;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed request: unparsable JSON, bad query string.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Well-formed JSON of the wrong shape.
    #[error("unprocessable entity: {0}")]
    Unprocessable(String),

    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            ApiError::Store(StoreError::NotFound { .. }) | ApiError::NotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Store(StoreError::Validation(_))
            | ApiError::Validation(_)
            | ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Constraint(_)) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn body(&self, status: StatusCode) -> Value {
        let mut body = json!({ "success": false, "error": status.as_u16() });
        match self {
            ApiError::Auth(e) => {
                body["message"] = json!({ "code": e.code(), "description": e.description() });
            }
            ApiError::Store(StoreError::NotFound { .. }) | ApiError::NotFound => {
                body["message"] = json!("resource not found");
            }
            ApiError::Store(StoreError::Validation(e)) | ApiError::Validation(e) => {
                body["message"] = json!("unprocessable entity");
                body["detail"] = json!(e.to_string());
            }
            ApiError::Unprocessable(detail) => {
                body["message"] = json!("unprocessable entity");
                body["detail"] = json!(detail);
            }
            ApiError::Store(StoreError::Constraint(detail)) => {
                body["message"] = json!("resource conflict");
                body["detail"] = json!(detail);
            }
            ApiError::Store(_) => {
                body["message"] = json!("internal server error");
            }
            ApiError::BadRequest(detail) => {
                body["message"] = json!("bad request");
                body["detail"] = json!(detail);
            }
            ApiError::MethodNotAllowed => {
                body["message"] = json!("method not allowed");
            }
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Store(e) if status.is_server_error() => {
                tracing::error!(error = %e, "storage failure");
            }
            ApiError::Auth(e) => {
                tracing::debug!(code = e.code(), status = status.as_u16(), "request rejected");
            }
            _ => {}
        }
        (status, Json(self.body(status))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Unprocessable(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `/movies/abc` is not a route, same as an unknown path.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound
    }
}
