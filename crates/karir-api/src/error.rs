//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::Envelope;

/// An error returned by an API handler. Every variant renders as the failure
/// envelope `{"success": false, "message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// Missing, malformed, unknown or expired bearer token, or a failed login.
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  #[error("admin role required")]
  Forbidden,

  /// Also covers records the caller may not see.
  #[error("not found")]
  NotFound,

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("operation timed out")]
  Timeout,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<karir_core::Error> for ApiError {
  fn from(err: karir_core::Error) -> Self {
    use karir_core::Error as E;
    match err {
      E::InvalidInput(m) => Self::BadRequest(m),
      E::NotFoundOrForbidden => Self::NotFound,
      E::Conflict(m) => Self::Conflict(m),
      E::Timeout(_) => Self::Timeout,
      E::Store(e) => Self::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, (*m).to_owned()),
      ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::NotFound => (StatusCode::NOT_FOUND, "record not found".to_owned()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Timeout => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };

    let mut response = (status, Envelope::<()>::failure(message)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        header::HeaderValue::from_static("Bearer"),
      );
    }
    response
  }
}
