//! The `FormStore` trait, the seam between form logic and a document store.
//!
//! The trait is implemented by storage backends (e.g.
//! `whatsorder-store-sqlite`). The locator, gate, and editor depend on this
//! abstraction, never on a concrete backend.

use std::future::Future;

use crate::form::{DocPath, FormDocument};

/// Abstraction over a document store holding form documents in all tiers.
///
/// Writes to `UserScoped` paths must maintain two secondary indexes in the
/// same transaction as the document itself:
///
/// - form id → owning namespace ([`FormStore::owner_of`])
/// - slug → user-scoped paths ([`FormStore::slug_candidates`])
///
/// Timeouts and retries belong to the backend; the subsystem never retries.
pub trait FormStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Point lookup of one document. Returns `None` if nothing is stored at
  /// `path`.
  fn get<'a>(
    &'a self,
    path: &'a DocPath,
  ) -> impl Future<Output = Result<Option<FormDocument>, Self::Error>> + Send + 'a;

  /// The namespace that holds the user-scoped form `form_id`, if any.
  fn owner_of<'a>(
    &'a self,
    form_id: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// User-scoped paths whose `slug` equals `slug`, oldest record first.
  fn slug_candidates<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Vec<DocPath>, Self::Error>> + Send + 'a;

  /// Create or overwrite the document at `path`.
  fn put<'a>(
    &'a self,
    path: &'a DocPath,
    doc: &'a FormDocument,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Every form document in the namespace `owner`.
  fn list_namespace<'a>(
    &'a self,
    owner: &'a str,
  ) -> impl Future<Output = Result<Vec<(DocPath, FormDocument)>, Self::Error>> + Send + 'a;
}
