//! Handlers for `/products` codec endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/products/encode` | Body: `{"products":[...],"format":"legacy\|compact"}` |
//! | `GET`  | `/products/decode` | `?products=<encoded>`; either format |

use axum::{Json, extract::RawQuery};
use serde::{Deserialize, Serialize};
use whatsorder_core::product::{Product, ProductList, validate};

use crate::{error::ApiError, raw_query_param};

// ─── Encode ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
  #[default]
  Legacy,
  Compact,
}

#[derive(Debug, Deserialize)]
pub struct EncodeBody {
  pub products: Vec<Product>,
  #[serde(default)]
  pub format:   Format,
}

#[derive(Debug, Serialize)]
pub struct Encoded {
  pub encoded: String,
}

/// `POST /products/encode`
pub async fn encode(Json(body): Json<EncodeBody>) -> Result<Json<Encoded>, ApiError> {
  for (i, p) in body.products.iter().enumerate() {
    validate(&p.name, p.price)
      .map_err(|e| ApiError::BadRequest(format!("product {i}: {e}")))?;
  }

  let encoded = match body.format {
    Format::Legacy => whatsorder_codec::encode(&body.products),
    Format::Compact => whatsorder_codec::encode_compact(&body.products),
  };
  Ok(Json(Encoded { encoded }))
}

// ─── Decode ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RejectedEntry {
  pub index:  usize,
  pub raw:    String,
  pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct DecodeView {
  pub products: ProductList,
  pub rejected: Vec<RejectedEntry>,
}

/// `GET /products/decode`
pub async fn decode(RawQuery(raw): RawQuery) -> Json<DecodeView> {
  let input = raw_query_param(raw.as_deref(), "products").unwrap_or_default();
  let decoded = whatsorder_codec::decode_any(&input);

  Json(DecodeView {
    products: decoded.products,
    rejected: decoded
      .rejected
      .into_iter()
      .map(|r| RejectedEntry { index: r.index, raw: r.raw, reason: r.reason.to_string() })
      .collect(),
  })
}
