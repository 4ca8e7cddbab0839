//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use whatsorder_core::{gate::Denial, order::OrderError};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Also used for forms the caller may not see, so the two are
  /// indistinguishable.
  #[error("form not found")]
  NotFound,

  #[error("you do not have permission to edit this form")]
  Forbidden,

  #[error("sign-in required")]
  Unauthenticated,

  #[error("form has changed since it was fetched")]
  PreconditionFailed,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("storage unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<whatsorder_core::Error> for ApiError {
  fn from(e: whatsorder_core::Error) -> Self {
    use whatsorder_core::Error as E;
    match e {
      E::NotFound => Self::NotFound,
      E::PermissionDenied => Self::Forbidden,
      E::PreconditionFailed => Self::PreconditionFailed,
      E::Unauthenticated => Self::Unauthenticated,
      E::StorageUnavailable(inner) => Self::Unavailable(inner),
      e @ (E::InvalidProduct(_)
      | E::EmptyBusinessName
      | E::InvalidPhone(_)
      | E::NoProducts) => Self::BadRequest(e.to_string()),
    }
  }
}

impl From<Denial> for ApiError {
  fn from(d: Denial) -> Self { whatsorder_core::Error::from(d).into() }
}

impl From<OrderError> for ApiError {
  fn from(e: OrderError) -> Self { Self::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound => StatusCode::NOT_FOUND,
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
      ApiError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unavailable(e) => {
        tracing::error!(error = %e, "store call failed");
        StatusCode::SERVICE_UNAVAILABLE
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
