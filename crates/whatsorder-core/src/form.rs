//! Form records, storage tiers, and resolution results.
//!
//! One logical form entity lives in several physical locations: the current
//! per-owner collection, a denormalised public copy, and a flat ownerless
//! collection from the first schema generation. Every location yields the same
//! [`FormRecord`] type, tagged with the [`StorageTier`] it came from.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::product::{Product, ProductList};

// ─── Tiers ───────────────────────────────────────────────────────────────────

/// Which schema generation a tier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaGeneration {
  /// Flat `forms/{id}` collection, created before per-owner namespaces.
  Legacy,
  /// Per-owner `users/{uid}/forms/{id}` collection and its public mirror.
  Scoped,
}

/// A physical storage location consulted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
  UserScoped,
  PublicScoped,
  LegacyFlat,
}

impl StorageTier {
  pub fn generation(self) -> SchemaGeneration {
    match self {
      Self::UserScoped | Self::PublicScoped => SchemaGeneration::Scoped,
      Self::LegacyFlat => SchemaGeneration::Legacy,
    }
  }

  /// `true` for tiers that only hold best-effort copies of another tier.
  pub fn is_denormalized(self) -> bool { matches!(self, Self::PublicScoped) }

  /// The discriminant stored in the `tier` column of a backing table.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::UserScoped => "user_scoped",
      Self::PublicScoped => "public_scoped",
      Self::LegacyFlat => "legacy_flat",
    }
  }
}

/// The address of one document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocPath {
  /// `users/{owner}/forms/{id}`
  User { owner: String, id: String },
  /// `publicForms/{id}`
  Public { id: String },
  /// `forms/{id}`
  Legacy { id: String },
}

impl DocPath {
  pub fn user(owner: impl Into<String>, id: impl Into<String>) -> Self {
    Self::User { owner: owner.into(), id: id.into() }
  }

  pub fn public(id: impl Into<String>) -> Self { Self::Public { id: id.into() } }

  pub fn legacy(id: impl Into<String>) -> Self { Self::Legacy { id: id.into() } }

  pub fn tier(&self) -> StorageTier {
    match self {
      Self::User { .. } => StorageTier::UserScoped,
      Self::Public { .. } => StorageTier::PublicScoped,
      Self::Legacy { .. } => StorageTier::LegacyFlat,
    }
  }

  pub fn id(&self) -> &str {
    match self {
      Self::User { id, .. } | Self::Public { id } | Self::Legacy { id } => id,
    }
  }

  /// The owning namespace; only `UserScoped` paths have one.
  pub fn namespace(&self) -> Option<&str> {
    match self {
      Self::User { owner, .. } => Some(owner),
      Self::Public { .. } | Self::Legacy { .. } => None,
    }
  }
}

impl fmt::Display for DocPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::User { owner, id } => write!(f, "users/{owner}/forms/{id}"),
      Self::Public { id } => write!(f, "publicForms/{id}"),
      Self::Legacy { id } => write!(f, "forms/{id}"),
    }
  }
}

// ─── Stored document ─────────────────────────────────────────────────────────

/// A form document exactly as the store holds it.
///
/// Products are kept as loose JSON because older writers added extra keys
/// and empty image strings. Validation happens on the way out in
/// [`FormRecord::from_document`], which drops any entry that fails it
/// (a string price included).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
  #[serde(default)]
  pub business_name: String,
  /// First-generation documents used `phone`.
  #[serde(default, alias = "phone")]
  pub phone_number:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub slug:          Option<String>,
  #[serde(default)]
  pub products:      Vec<serde_json::Value>,
  /// Owner uid recorded on public copies (and some legacy documents).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:    Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at:    Option<DateTime<Utc>>,
}

// ─── FormRecord ──────────────────────────────────────────────────────────────

/// The canonical, validated view of a stored form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
  /// The only unique key.
  pub id:            String,
  /// `None` only for ownerless legacy records.
  pub owner_id:      Option<String>,
  pub business_name: String,
  pub phone_number:  String,
  /// Derived, lossy, non-unique.
  pub slug:          String,
  pub products:      ProductList,
  pub storage_tier:  StorageTier,
  pub created_at:    DateTime<Utc>,
}

impl FormRecord {
  /// Validate a stored document read from `path`.
  ///
  /// Product entries that fail the validity predicate are dropped, so the
  /// resulting list may be shorter than the stored one. A missing slug is
  /// derived from the business name; a missing creation time falls back to
  /// the update time, then to the Unix epoch.
  pub fn from_document(path: &DocPath, doc: FormDocument) -> Self {
    let owner_id = match path {
      DocPath::User { owner, .. } => Some(owner.clone()),
      DocPath::Public { .. } | DocPath::Legacy { .. } => {
        doc.user_id.filter(|u| !u.is_empty())
      }
    };

    let products: ProductList =
      doc.products.iter().filter_map(Product::from_stored).collect();
    let dropped = doc.products.len() - products.len();
    if dropped > 0 {
      tracing::warn!(%path, dropped, "stored form has invalid products");
    }

    let slug = doc
      .slug
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| crate::slug::generate_slug(&doc.business_name));

    Self {
      id: path.id().to_owned(),
      owner_id,
      business_name: doc.business_name,
      phone_number: doc.phone_number,
      slug,
      products,
      storage_tier: path.tier(),
      created_at: doc.created_at.or(doc.updated_at).unwrap_or_default(),
    }
  }

  /// Render this record as a document for `tier`.
  ///
  /// Public copies carry the owner uid so the owner survives denormalisation.
  pub fn to_document(&self, tier: StorageTier, updated_at: DateTime<Utc>) -> FormDocument {
    FormDocument {
      business_name: self.business_name.clone(),
      phone_number:  self.phone_number.clone(),
      slug:          Some(self.slug.clone()),
      products:      self.products.iter().map(Product::to_stored).collect(),
      user_id:       match tier {
        StorageTier::UserScoped => None,
        StorageTier::PublicScoped | StorageTier::LegacyFlat => self.owner_id.clone(),
      },
      created_at:    Some(self.created_at),
      updated_at:    Some(updated_at),
    }
  }

  /// The path this record was read from.
  pub fn path(&self) -> DocPath {
    match (self.storage_tier, &self.owner_id) {
      (StorageTier::UserScoped, Some(owner)) => DocPath::user(owner, &self.id),
      (StorageTier::LegacyFlat, _) | (StorageTier::UserScoped, None) => {
        DocPath::legacy(&self.id)
      }
      (StorageTier::PublicScoped, _) => DocPath::public(&self.id),
    }
  }

  /// A strong ETag over the mutable content of the record.
  ///
  /// Stable across tiers: a public copy that is in sync with its user-scoped
  /// source yields the same tag.
  pub fn etag(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.id.as_bytes());
    hasher.update([0]);
    hasher.update(self.business_name.as_bytes());
    hasher.update([0]);
    hasher.update(self.phone_number.as_bytes());
    hasher.update([0]);
    for p in &self.products {
      hasher.update(p.name.as_bytes());
      hasher.update([0]);
      hasher.update(p.price.to_le_bytes());
      hasher.update(p.image.as_deref().unwrap_or_default().as_bytes());
      hasher.update([0]);
    }
    format!("\"{}\"", hex::encode(hasher.finalize()))
  }
}

// ─── Caller ──────────────────────────────────────────────────────────────────

/// Who is asking. Threaded explicitly through every locator and gate call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
  /// `None` means an anonymous public viewer.
  pub uid: Option<String>,
}

impl CallerIdentity {
  pub fn anonymous() -> Self { Self { uid: None } }

  pub fn user(uid: impl Into<String>) -> Self { Self { uid: Some(uid.into()) } }

  pub fn is_anonymous(&self) -> bool { self.uid.is_none() }
}

// ─── Resolution result ───────────────────────────────────────────────────────

/// A form reconstructed entirely from URL parameters. Read-only, ownerless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemeralForm {
  pub business_name: String,
  pub phone_number:  String,
  pub products:      ProductList,
}

/// The form a page renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "form", rename_all = "snake_case")]
pub enum ResolvedForm {
  /// Backed by a stored record.
  Stored(FormRecord),
  /// Decoded from the share link itself.
  Ephemeral(EphemeralForm),
}

impl ResolvedForm {
  pub fn business_name(&self) -> &str {
    match self {
      Self::Stored(r) => &r.business_name,
      Self::Ephemeral(e) => &e.business_name,
    }
  }

  pub fn phone_number(&self) -> &str {
    match self {
      Self::Stored(r) => &r.phone_number,
      Self::Ephemeral(e) => &e.phone_number,
    }
  }

  pub fn products(&self) -> &[Product] {
    match self {
      Self::Stored(r) => &r.products,
      Self::Ephemeral(e) => &e.products,
    }
  }

  pub fn is_ephemeral(&self) -> bool { matches!(self, Self::Ephemeral(_)) }
}
