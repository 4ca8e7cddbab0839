//! Form locator: find a form's canonical record across storage tiers.
//!
//! Probes run strictly one after another in the order of [`PROBE_ORDER`] and
//! stop at the first hit, so earlier (more specific) tiers always win over
//! later (broader or possibly stale) ones. A miss at every tier is `Ok(None)`;
//! only a failing store call is an error.

use std::sync::Arc;

use tracing::debug;

use crate::{
  Error, Result,
  form::{CallerIdentity, DocPath, FormRecord, StorageTier},
  store::FormStore,
};

// ─── Probe table ─────────────────────────────────────────────────────────────

/// One step of an id lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
  /// `users/{caller}/forms/{id}`; skipped for anonymous callers.
  CallerNamespace,
  /// `users/{owner}/forms/{id}` with the owner taken from the id index.
  OwnerIndex,
  /// `forms/{id}`
  LegacyFlat,
  /// `publicForms/{id}`
  PublicCopy,
}

impl Probe {
  pub fn tier(self) -> StorageTier {
    match self {
      Self::CallerNamespace | Self::OwnerIndex => StorageTier::UserScoped,
      Self::LegacyFlat => StorageTier::LegacyFlat,
      Self::PublicCopy => StorageTier::PublicScoped,
    }
  }
}

/// The fixed probe order for [`FormLocator::resolve_by_id`].
pub const PROBE_ORDER: [Probe; 4] = [
  Probe::CallerNamespace,
  Probe::OwnerIndex,
  Probe::LegacyFlat,
  Probe::PublicCopy,
];

// ─── Locator ─────────────────────────────────────────────────────────────────

/// Stateless apart from the shared store handle; safe to use from any number
/// of concurrent resolutions.
pub struct FormLocator<S> {
  store: Arc<S>,
}

impl<S> Clone for FormLocator<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: FormStore> FormLocator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Resolve a form by its unique id.
  pub async fn resolve_by_id(
    &self,
    id: &str,
    caller: &CallerIdentity,
  ) -> Result<Option<FormRecord>> {
    if id.is_empty() {
      return Ok(None);
    }

    let mut tried_caller_path: Option<String> = None;

    for probe in PROBE_ORDER {
      let path = match probe {
        Probe::CallerNamespace => match caller.uid.as_deref() {
          Some(uid) => DocPath::user(uid, id),
          None => continue,
        },
        Probe::OwnerIndex => {
          let owner = self.store.owner_of(id).await.map_err(Error::storage)?;
          match owner {
            Some(owner) if tried_caller_path.as_deref() != Some(owner.as_str()) => {
              DocPath::user(owner, id)
            }
            _ => continue,
          }
        }
        Probe::LegacyFlat => DocPath::legacy(id),
        Probe::PublicCopy => DocPath::public(id),
      };

      if let Some(record) = self.probe(&path).await? {
        debug!(form_id = id, ?probe, "form located");
        return Ok(Some(record));
      }

      if probe == Probe::CallerNamespace {
        tried_caller_path = caller.uid.clone();
      }
    }

    debug!(form_id = id, "form not found in any tier");
    Ok(None)
  }

  /// Resolve a form by slug.
  ///
  /// Slugs are not unique; when several owners share one, the oldest record
  /// wins. Index entries whose document has since vanished are skipped.
  pub async fn resolve_by_slug(&self, slug: &str) -> Result<Option<FormRecord>> {
    if slug.is_empty() {
      return Ok(None);
    }

    let candidates = self
      .store
      .slug_candidates(slug)
      .await
      .map_err(Error::storage)?;

    if candidates.len() > 1 {
      debug!(slug, count = candidates.len(), "slug shared by several forms");
    }

    for path in candidates {
      if let Some(record) = self.probe(&path).await? {
        return Ok(Some(record));
      }
    }

    Ok(None)
  }

  async fn probe(&self, path: &DocPath) -> Result<Option<FormRecord>> {
    let doc = self.store.get(path).await.map_err(Error::storage)?;
    debug!(%path, hit = doc.is_some(), "probe");
    Ok(doc.map(|d| FormRecord::from_document(path, d)))
  }
}
