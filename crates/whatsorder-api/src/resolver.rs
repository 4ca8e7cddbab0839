//! Form resolver: turn share-link parameters into the form a page renders.
//!
//! Decision tree:
//!
//! 1. `id` present: locate by id and apply the gate.
//! 2. otherwise `slug` present: locate by slug and apply the gate.
//! 3. nothing found, nothing tried, or the match is hidden from the caller;
//!    `biz`, `phone` and `products` all
//!    present, and the mode is [`Access::View`]: build an ephemeral form from
//!    the parameters alone, with no authorisation.
//! 4. otherwise: not found.
//!
//! A stored match always wins over link parameters. Edit resolutions never
//! produce ephemeral forms.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use whatsorder_core::{
  Result,
  form::{CallerIdentity, EphemeralForm, ResolvedForm},
  gate::{Access, AuthorizationGate, Denial},
  locator::FormLocator,
  store::FormStore,
};

/// Query parameters understood by the resolver. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveParams {
  pub id:       Option<String>,
  pub slug:     Option<String>,
  pub biz:      Option<String>,
  pub phone:    Option<String>,
  /// Encoded product list, in either codec format.
  pub products: Option<String>,
  #[serde(default)]
  pub mode:     Access,
}

impl ResolveParams {
  fn id(&self) -> Option<&str> { non_empty(&self.id) }

  fn slug(&self) -> Option<&str> { non_empty(&self.slug) }

  /// `biz`, `phone` and `products`, if all three are present.
  fn link_fields(&self) -> Option<(&str, &str, &str)> {
    Some((non_empty(&self.biz)?, non_empty(&self.phone)?, non_empty(&self.products)?))
  }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
  v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The outcome of a resolution.
///
/// A hidden form never surfaces as [`Denial::Hidden`]: it is reported as a
/// miss, so `Denied` only ever carries [`Denial::ReadOnly`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
  Found(ResolvedForm),
  Denied(Denial),
  NotFound,
}

pub struct FormResolver<S> {
  locator: FormLocator<S>,
  gate:    AuthorizationGate,
}

impl<S: FormStore> FormResolver<S> {
  pub fn new(store: Arc<S>, gate: AuthorizationGate) -> Self {
    Self { locator: FormLocator::new(store), gate }
  }

  pub fn gate(&self) -> &AuthorizationGate { &self.gate }

  /// Resolve `params` for `caller`. Only a store failure is an error.
  pub async fn resolve(
    &self,
    params: &ResolveParams,
    caller: &CallerIdentity,
  ) -> Result<Resolution> {
    let record = match (params.id(), params.slug()) {
      (Some(id), _) => self.locator.resolve_by_id(id, caller).await?,
      (None, Some(slug)) => self.locator.resolve_by_slug(slug).await?,
      (None, None) => None,
    };

    if let Some(record) = record {
      match self.gate.check(&record, caller, params.mode) {
        Ok(()) => return Ok(Resolution::Found(ResolvedForm::Stored(record))),
        Err(Denial::ReadOnly) => {
          debug!(form_id = %record.id, mode = ?params.mode, "form is read-only for caller");
          return Ok(Resolution::Denied(Denial::ReadOnly));
        }
        // A form the caller may not see resolves exactly as if it were absent.
        Err(Denial::Hidden) => debug!(form_id = %record.id, "form hidden from caller"),
      }
    }

    match (params.mode, params.link_fields()) {
      (Access::View, Some((biz, phone, products))) => {
        let decoded = whatsorder_codec::decode_any(products);
        if !decoded.rejected.is_empty() {
          debug!(rejected = decoded.rejected.len(), "dropped malformed link products");
        }
        Ok(Resolution::Found(ResolvedForm::Ephemeral(EphemeralForm {
          business_name: biz.to_owned(),
          phone_number:  phone.to_owned(),
          products:      decoded.products,
        })))
      }
      _ => Ok(Resolution::NotFound),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use whatsorder_core::{
    Error,
    form::{DocPath, FormDocument, StorageTier},
    product::Product,
  };
  use whatsorder_store_sqlite::SqliteStore;

  use super::*;

  async fn resolver(gate: AuthorizationGate) -> (FormResolver<SqliteStore>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    (FormResolver::new(Arc::clone(&store), gate), store)
  }

  fn document(business_name: &str) -> FormDocument {
    FormDocument {
      business_name: business_name.into(),
      phone_number: "+919876543210".into(),
      products: vec![json!({ "name": "Tea", "price": 20 })],
      ..Default::default()
    }
  }

  fn params(pairs: &[(&str, &str)]) -> ResolveParams {
    let mut p = ResolveParams::default();
    for (k, v) in pairs {
      let v = Some((*v).to_owned());
      match *k {
        "id" => p.id = v,
        "slug" => p.slug = v,
        "biz" => p.biz = v,
        "phone" => p.phone = v,
        "products" => p.products = v,
        "mode" if v.as_deref() == Some("edit") => p.mode = Access::Edit,
        _ => {}
      }
    }
    p
  }

  fn stored(resolution: Resolution) -> whatsorder_core::form::FormRecord {
    match resolution {
      Resolution::Found(ResolvedForm::Stored(r)) => r,
      other => panic!("expected stored form, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn link_parameters_build_an_ephemeral_form() {
    let (r, _) = resolver(AuthorizationGate::default()).await;
    let p = params(&[
      ("biz", "Cafe"),
      ("phone", "911234567890"),
      ("products", "Tea-20,Coffee-30-https%3A%2F%2Fx.com%2Fc.jpg"),
    ]);

    let resolution = r.resolve(&p, &CallerIdentity::anonymous()).await.unwrap();
    assert_eq!(
      resolution,
      Resolution::Found(ResolvedForm::Ephemeral(EphemeralForm {
        business_name: "Cafe".into(),
        phone_number:  "911234567890".into(),
        products:      vec![
          Product::new("Tea", 20.0).unwrap(),
          Product::new("Coffee", 30.0).unwrap().with_image("https://x.com/c.jpg"),
        ],
      }))
    );
  }

  #[tokio::test]
  async fn stored_form_wins_over_link_parameters() {
    let (r, store) = resolver(AuthorizationGate::default()).await;
    store.put(&DocPath::user("u1", "f1"), &document("Stored Cafe")).await.unwrap();

    let p = params(&[("id", "f1"), ("biz", "Link Cafe"), ("phone", "1"), ("products", "Tea-1")]);
    let record = stored(r.resolve(&p, &CallerIdentity::anonymous()).await.unwrap());
    assert_eq!(record.business_name, "Stored Cafe");
  }

  #[tokio::test]
  async fn unknown_id_falls_back_to_link_parameters() {
    let (r, _) = resolver(AuthorizationGate::default()).await;
    let p = params(&[("id", "gone"), ("biz", "Cafe"), ("phone", "1"), ("products", "Tea-1")]);
    let resolution = r.resolve(&p, &CallerIdentity::anonymous()).await.unwrap();
    assert!(matches!(resolution, Resolution::Found(ResolvedForm::Ephemeral(_))));
  }

  #[tokio::test]
  async fn incomplete_link_is_not_found() {
    let (r, _) = resolver(AuthorizationGate::default()).await;
    let p = params(&[("biz", "Cafe"), ("products", "Tea-1")]);
    assert_eq!(r.resolve(&p, &CallerIdentity::anonymous()).await.unwrap(), Resolution::NotFound);
    assert_eq!(
      r.resolve(&ResolveParams::default(), &CallerIdentity::anonymous()).await.unwrap(),
      Resolution::NotFound
    );
  }

  #[tokio::test]
  async fn edit_never_yields_an_ephemeral_form() {
    let (r, _) = resolver(AuthorizationGate::default()).await;
    let p = params(&[("biz", "Cafe"), ("phone", "1"), ("products", "Tea-1"), ("mode", "edit")]);
    assert_eq!(r.resolve(&p, &CallerIdentity::user("u1")).await.unwrap(), Resolution::NotFound);
  }

  #[tokio::test]
  async fn non_owner_may_view_but_not_edit() {
    let (r, store) = resolver(AuthorizationGate::default()).await;
    store.put(&DocPath::user("owner", "f1"), &document("Cafe")).await.unwrap();
    let visitor = CallerIdentity::user("visitor");

    let view = r.resolve(&params(&[("id", "f1")]), &visitor).await.unwrap();
    assert!(matches!(view, Resolution::Found(_)));

    let edit = r.resolve(&params(&[("id", "f1"), ("mode", "edit")]), &visitor).await.unwrap();
    assert_eq!(edit, Resolution::Denied(Denial::ReadOnly));

    let owner = CallerIdentity::user("owner");
    let edit = r.resolve(&params(&[("id", "f1"), ("mode", "edit")]), &owner).await.unwrap();
    assert_eq!(stored(edit).storage_tier, StorageTier::UserScoped);
  }

  #[tokio::test]
  async fn hidden_legacy_record_is_a_miss_in_both_modes() {
    let (r, store) = resolver(AuthorizationGate::new(false)).await;
    store.put(&DocPath::legacy("old"), &document("Old Cafe")).await.unwrap();
    let caller = CallerIdentity::user("someone");

    let view = r.resolve(&params(&[("id", "old")]), &caller).await.unwrap();
    let edit = r.resolve(&params(&[("id", "old"), ("mode", "edit")]), &caller).await.unwrap();
    assert_eq!(view, Resolution::NotFound);
    assert_eq!(view, edit);
  }

  #[tokio::test]
  async fn hidden_record_with_link_parameters_matches_missing_record() {
    let (r, store) = resolver(AuthorizationGate::new(false)).await;
    store.put(&DocPath::legacy("old"), &document("Old Cafe")).await.unwrap();
    let caller = CallerIdentity::user("someone");
    let link = [("biz", "Cafe"), ("phone", "1"), ("products", "Tea-1")];

    let with_id = |id: &'static str| {
      let mut pairs = vec![("id", id)];
      pairs.extend(link);
      params(&pairs)
    };
    let hidden = r.resolve(&with_id("old"), &caller).await.unwrap();
    let missing = r.resolve(&with_id("nope"), &caller).await.unwrap();
    assert!(matches!(hidden, Resolution::Found(ResolvedForm::Ephemeral(_))));
    assert_eq!(hidden, missing);
  }

  #[tokio::test]
  async fn slug_resolves_when_no_id_is_given() {
    let (r, store) = resolver(AuthorizationGate::default()).await;
    store.put(&DocPath::user("u1", "f1"), &document("Cafe Blue")).await.unwrap();

    let record = stored(
      r.resolve(&params(&[("slug", "cafe-blue")]), &CallerIdentity::anonymous())
        .await
        .unwrap(),
    );
    assert_eq!(record.id, "f1");
  }

  #[tokio::test]
  async fn empty_id_is_ignored_in_favour_of_slug() {
    let (r, store) = resolver(AuthorizationGate::default()).await;
    store.put(&DocPath::user("u1", "f1"), &document("Cafe Blue")).await.unwrap();

    let p = params(&[("id", ""), ("slug", "cafe-blue")]);
    assert_eq!(stored(r.resolve(&p, &CallerIdentity::anonymous()).await.unwrap()).id, "f1");
  }

  #[tokio::test]
  async fn storage_failure_is_an_error_not_a_miss() {
    #[derive(Debug)]
    struct Offline;
    impl std::fmt::Display for Offline {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("offline") }
    }
    impl std::error::Error for Offline {}

    struct DownStore;
    impl FormStore for DownStore {
      type Error = Offline;
      async fn get(&self, _: &DocPath) -> Result<Option<FormDocument>, Offline> { Err(Offline) }
      async fn owner_of(&self, _: &str) -> Result<Option<String>, Offline> { Err(Offline) }
      async fn slug_candidates(&self, _: &str) -> Result<Vec<DocPath>, Offline> { Err(Offline) }
      async fn put(&self, _: &DocPath, _: &FormDocument) -> Result<(), Offline> { Err(Offline) }
      async fn list_namespace(
        &self,
        _: &str,
      ) -> Result<Vec<(DocPath, FormDocument)>, Offline> {
        Err(Offline)
      }
    }

    let r = FormResolver::new(Arc::new(DownStore), AuthorizationGate::default());
    let p = params(&[("id", "f1"), ("biz", "Cafe"), ("phone", "1"), ("products", "Tea-1")]);
    let err = r.resolve(&p, &CallerIdentity::anonymous()).await.unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
  }
}
