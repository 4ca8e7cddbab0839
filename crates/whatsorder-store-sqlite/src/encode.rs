//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so they order
//! correctly as text. Documents are stored as their camelCase JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use whatsorder_core::form::{DocPath, FormDocument, StorageTier};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

// ─── StorageTier ─────────────────────────────────────────────────────────────

pub fn decode_tier(s: &str) -> Result<StorageTier> {
  match s {
    "user_scoped" => Ok(StorageTier::UserScoped),
    "public_scoped" => Ok(StorageTier::PublicScoped),
    "legacy_flat" => Ok(StorageTier::LegacyFlat),
    other => Err(Error::CorruptRow(format!("unknown tier: {other:?}"))),
  }
}

// ─── DocPath ─────────────────────────────────────────────────────────────────

/// The columns that locate one row of `documents`.
pub struct PathColumns {
  pub path:      String,
  pub tier:      &'static str,
  pub namespace: Option<String>,
  pub form_id:   String,
}

pub fn encode_path(path: &DocPath) -> PathColumns {
  PathColumns {
    path:      path.to_string(),
    tier:      path.tier().as_str(),
    namespace: path.namespace().map(str::to_owned),
    form_id:   path.id().to_owned(),
  }
}

pub fn decode_path(tier: &str, namespace: Option<String>, form_id: String) -> Result<DocPath> {
  match (decode_tier(tier)?, namespace) {
    (StorageTier::UserScoped, Some(owner)) => Ok(DocPath::user(owner, form_id)),
    (StorageTier::PublicScoped, None) => Ok(DocPath::public(form_id)),
    (StorageTier::LegacyFlat, None) => Ok(DocPath::legacy(form_id)),
    (tier, namespace) => Err(Error::CorruptRow(format!(
      "tier {} with namespace {namespace:?}",
      tier.as_str()
    ))),
  }
}

// ─── FormDocument ────────────────────────────────────────────────────────────

pub fn encode_document(doc: &FormDocument) -> Result<String> { Ok(serde_json::to_string(doc)?) }

pub fn decode_document(s: &str) -> Result<FormDocument> { Ok(serde_json::from_str(s)?) }

/// The timestamp a user-scoped document is ordered by in the slug index.
pub fn index_created_at(doc: &FormDocument) -> String {
  encode_dt(doc.created_at.or(doc.updated_at).unwrap_or_default())
}
