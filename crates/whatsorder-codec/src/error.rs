//! Error types for the whatsorder product codec.

use thiserror::Error;
use whatsorder_core::product::InvalidProduct;

/// Why a single encoded entry was discarded.
///
/// Never fatal: the rest of the list still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEntry {
  #[error("entry has no price segment")]
  MissingPrice,

  #[error("percent-encoding does not decode to UTF-8")]
  InvalidEncoding,

  #[error("price {0:?} is not a number")]
  UnparseablePrice(String),

  #[error("entry is not a [name, price, image?] tuple")]
  InvalidTuple,

  #[error("compact payload is unreadable")]
  CorruptPayload,

  #[error(transparent)]
  Invalid(#[from] InvalidProduct),
}

/// A compact payload that could not be read at all.
#[derive(Debug, Error)]
pub enum Error {
  #[error("payload does not start with the compact prefix")]
  MissingPrefix,

  #[error("invalid base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
