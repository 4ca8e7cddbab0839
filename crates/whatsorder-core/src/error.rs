//! Error types for `whatsorder-core`.

use thiserror::Error;

use crate::product::InvalidProduct;

#[derive(Debug, Error)]
pub enum Error {
  /// No storage tier holds the requested form.
  #[error("form not found")]
  NotFound,

  /// The form exists and is visible, but the caller may not modify it.
  #[error("permission denied")]
  PermissionDenied,

  /// The caller's `If-Match` tag no longer matches the stored form.
  #[error("precondition failed")]
  PreconditionFailed,

  /// The operation needs a signed-in caller.
  #[error("sign-in required")]
  Unauthenticated,

  /// The underlying document store failed. Retryable by the caller.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("invalid product: {0}")]
  InvalidProduct(#[from] InvalidProduct),

  #[error("business name must not be empty")]
  EmptyBusinessName,

  #[error("invalid phone number: {0:?}")]
  InvalidPhone(String),

  #[error("a form needs at least one product")]
  NoProducts,
}

impl Error {
  /// Wrap a backend error raised at the [`FormStore`](crate::store::FormStore)
  /// seam.
  pub fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
