//! Response envelopes shared by the API and the balancer.
//!
//! Success payloads are wrapped as `{ "data": ... }`, failures as
//! `{ "error": message }`; DELETE is the one verb that answers with an
//! empty 204 instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Envelope for successful payloads.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T: Serialize> IntoResponse for Data<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Request-level failures, each rendered as the JSON error envelope with its
/// mapped status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("please provide a request body")]
    MissingBody,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("user id is not a valid uuid")]
    InvalidUserId,

    #[error("user not found")]
    UserNotFound,

    #[error("route not found")]
    RouteNotFound,

    #[error("method not supported")]
    MethodNotSupported,

    #[error("unexpected server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingBody | ApiError::InvalidBody(_) | ApiError::InvalidUserId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UserNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
