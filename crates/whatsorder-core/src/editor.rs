//! Creating and editing forms on behalf of their owners.
//!
//! New forms are always written to the owner's namespace. Each write is
//! followed by a best-effort refresh of the denormalised public copy; a
//! failure there is logged and otherwise ignored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  form::{CallerIdentity, DocPath, FormRecord, StorageTier},
  gate::{Access, AuthorizationGate},
  locator::FormLocator,
  phone::normalize_phone,
  product::{Product, validate},
  slug::generate_slug,
  store::FormStore,
};

/// The editable part of a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDraft {
  pub business_name: String,
  pub phone_number:  String,
  pub products:      Vec<Product>,
}

impl FormDraft {
  /// Trim, normalise, and validate every field.
  fn validated(self) -> Result<Self> {
    let business_name = self.business_name.trim().to_owned();
    if business_name.is_empty() {
      return Err(Error::EmptyBusinessName);
    }

    let phone_number = normalize_phone(&self.phone_number)
      .ok_or_else(|| Error::InvalidPhone(self.phone_number.clone()))?;

    let products = self
      .products
      .into_iter()
      .map(|Product { name, price, image }| {
        let name = name.trim().to_owned();
        validate(&name, price)?;
        Ok(Product { name, price, image: None }.with_image(image.unwrap_or_default()))
      })
      .collect::<Result<Vec<_>>>()?;
    if products.is_empty() {
      return Err(Error::NoProducts);
    }

    Ok(Self { business_name, phone_number, products })
  }
}

pub struct FormEditor<S> {
  store:   Arc<S>,
  locator: FormLocator<S>,
  gate:    AuthorizationGate,
}

impl<S: FormStore> FormEditor<S> {
  pub fn new(store: Arc<S>, gate: AuthorizationGate) -> Self {
    Self { locator: FormLocator::new(Arc::clone(&store)), store, gate }
  }

  /// Save a new form in the caller's namespace.
  pub async fn create(&self, caller: &CallerIdentity, draft: FormDraft) -> Result<FormRecord> {
    let owner = caller.uid.as_deref().ok_or(Error::Unauthenticated)?;
    let draft = draft.validated()?;
    let now = Utc::now();

    let record = FormRecord {
      id:            Uuid::new_v4().simple().to_string(),
      owner_id:      Some(owner.to_owned()),
      slug:          generate_slug(&draft.business_name),
      business_name: draft.business_name,
      phone_number:  draft.phone_number,
      products:      draft.products,
      storage_tier:  StorageTier::UserScoped,
      created_at:    now,
    };

    self
      .store
      .put(&record.path(), &record.to_document(StorageTier::UserScoped, now))
      .await
      .map_err(Error::storage)?;
    self.refresh_public_copy(&record, now).await;

    info!(form_id = %record.id, owner, "form created");
    Ok(record)
  }

  /// Replace the business fields and products of an existing form.
  ///
  /// `id`, owner, tier, and creation time never change. When `if_match` is
  /// given it must equal the current [`FormRecord::etag`] (surrounding quotes
  /// are optional).
  pub async fn update(
    &self,
    id: &str,
    caller: &CallerIdentity,
    draft: FormDraft,
    if_match: Option<&str>,
  ) -> Result<FormRecord> {
    if caller.is_anonymous() {
      return Err(Error::Unauthenticated);
    }

    let current = self
      .locator
      .resolve_by_id(id, caller)
      .await?
      .ok_or(Error::NotFound)?;
    self.gate.check(&current, caller, Access::Edit)?;

    if let Some(tag) = if_match
      && strip_etag_quotes(tag) != strip_etag_quotes(&current.etag())
    {
      return Err(Error::PreconditionFailed);
    }

    let draft = draft.validated()?;
    let now = Utc::now();
    let record = FormRecord {
      slug: generate_slug(&draft.business_name),
      business_name: draft.business_name,
      phone_number: draft.phone_number,
      products: draft.products,
      ..current
    };

    self
      .store
      .put(&record.path(), &record.to_document(record.storage_tier, now))
      .await
      .map_err(Error::storage)?;
    if record.storage_tier == StorageTier::UserScoped {
      self.refresh_public_copy(&record, now).await;
    }

    info!(form_id = %record.id, tier = ?record.storage_tier, "form updated");
    Ok(record)
  }

  /// The caller's own forms, newest first.
  pub async fn list_owned(&self, caller: &CallerIdentity) -> Result<Vec<FormRecord>> {
    let owner = caller.uid.as_deref().ok_or(Error::Unauthenticated)?;
    let docs = self
      .store
      .list_namespace(owner)
      .await
      .map_err(Error::storage)?;

    let mut records: Vec<FormRecord> = docs
      .into_iter()
      .map(|(path, doc)| FormRecord::from_document(&path, doc))
      .collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(records)
  }

  async fn refresh_public_copy(&self, record: &FormRecord, now: DateTime<Utc>) {
    let path = DocPath::public(&record.id);
    let doc = record.to_document(StorageTier::PublicScoped, now);
    if let Err(e) = self.store.put(&path, &doc).await {
      warn!(form_id = %record.id, error = %e, "could not update public copy");
    }
  }
}

/// `If-Match` may carry the tag with or without the surrounding `"`.
fn strip_etag_quotes(s: &str) -> &str { s.trim().trim_matches('"') }
