//! In-memory [`FormStore`] that records every call, for locator and editor
//! tests.

use std::{
  collections::BTreeMap,
  io,
  sync::Mutex,
};

use chrono::{DateTime, TimeZone, Utc};

use crate::{
  form::{DocPath, FormDocument, StorageTier},
  store::FormStore,
};

#[derive(Default)]
pub(crate) struct RecordingStore {
  docs:        Mutex<BTreeMap<String, (DocPath, FormDocument)>>,
  calls:       Mutex<Vec<String>>,
  /// Writes to this tier fail with an I/O error.
  fail_writes: Option<StorageTier>,
  /// Every read fails with an I/O error.
  fail_reads:  bool,
}

impl RecordingStore {
  pub(crate) fn failing_reads() -> Self { Self { fail_reads: true, ..Self::default() } }

  pub(crate) fn failing_writes(tier: StorageTier) -> Self {
    Self { fail_writes: Some(tier), ..Self::default() }
  }

  pub(crate) fn insert(&self, path: DocPath, doc: FormDocument) {
    self.docs.lock().unwrap().insert(path.to_string(), (path, doc));
  }

  pub(crate) fn doc(&self, path: &DocPath) -> Option<FormDocument> {
    self.docs.lock().unwrap().get(&path.to_string()).map(|(_, d)| d.clone())
  }

  /// Calls issued so far, e.g. `"get users/u1/forms/f1"`.
  pub(crate) fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

  fn record(&self, call: String) -> io::Result<()> {
    self.calls.lock().unwrap().push(call);
    if self.fail_reads {
      return Err(io::Error::other("store offline"));
    }
    Ok(())
  }
}

impl FormStore for RecordingStore {
  type Error = io::Error;

  async fn get(&self, path: &DocPath) -> io::Result<Option<FormDocument>> {
    self.record(format!("get {path}"))?;
    Ok(self.doc(path))
  }

  async fn owner_of(&self, form_id: &str) -> io::Result<Option<String>> {
    self.record(format!("owner_of {form_id}"))?;
    Ok(self.docs.lock().unwrap().values().find_map(|(p, _)| match p {
      DocPath::User { owner, id } if id == form_id => Some(owner.clone()),
      _ => None,
    }))
  }

  async fn slug_candidates(&self, slug: &str) -> io::Result<Vec<DocPath>> {
    self.record(format!("slug {slug}"))?;
    let docs = self.docs.lock().unwrap();
    let mut hits: Vec<(Option<DateTime<Utc>>, DocPath)> = docs
      .values()
      .filter(|(p, d)| p.tier() == StorageTier::UserScoped && d.slug.as_deref() == Some(slug))
      .map(|(p, d)| (d.created_at, p.clone()))
      .collect();
    hits.sort_by_key(|(at, _)| *at);
    Ok(hits.into_iter().map(|(_, p)| p).collect())
  }

  async fn put(&self, path: &DocPath, doc: &FormDocument) -> io::Result<()> {
    self.calls.lock().unwrap().push(format!("put {path}"));
    if self.fail_writes == Some(path.tier()) {
      return Err(io::Error::other("write rejected"));
    }
    self.insert(path.clone(), doc.clone());
    Ok(())
  }

  async fn list_namespace(&self, owner: &str) -> io::Result<Vec<(DocPath, FormDocument)>> {
    self.record(format!("list {owner}"))?;
    Ok(
      self
        .docs
        .lock()
        .unwrap()
        .values()
        .filter(|(p, _)| p.namespace() == Some(owner))
        .cloned()
        .collect(),
    )
  }
}

/// A stored document with one valid product, created at `day` of June 2024.
pub(crate) fn document(business_name: &str, day: u32) -> FormDocument {
  FormDocument {
    business_name: business_name.to_owned(),
    phone_number:  "+919876543210".into(),
    slug:          Some(crate::slug::generate_slug(business_name)),
    products:      vec![serde_json::json!({ "name": "Tea", "price": 20 })],
    user_id:       None,
    created_at:    Some(Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()),
    updated_at:    None,
  }
}
