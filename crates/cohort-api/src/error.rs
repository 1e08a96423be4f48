//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cohort_query::{Error as QueryError, QueryResponse};
use thiserror::Error;

/// An error returned by an API handler.
///
/// Every variant renders as the failure envelope
/// `{"success": false, "error": ..., "details"?: ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Query(#[from] QueryError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Query(e) if e.is_translation() => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Query(QueryError::UpstreamError(_)) => StatusCode::BAD_GATEWAY,
      Self::Query(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = match &self {
      ApiError::Query(e) => QueryResponse::failure(e),
      ApiError::Store(e) => {
        QueryResponse::failure(&QueryError::ExecutionError(e.to_string()))
      }
    };
    (self.status(), Json(body)).into_response()
  }
}
