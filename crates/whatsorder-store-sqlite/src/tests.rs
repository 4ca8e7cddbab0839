//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use whatsorder_core::{
  editor::{FormDraft, FormEditor},
  form::{CallerIdentity, DocPath, FormDocument, StorageTier},
  gate::AuthorizationGate,
  locator::FormLocator,
  product::Product,
  store::FormStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn document(business_name: &str, slug: Option<&str>, day: u32) -> FormDocument {
  FormDocument {
    business_name: business_name.into(),
    phone_number: "+919876543210".into(),
    slug: slug.map(str::to_owned),
    products: vec![json!({ "name": "Tea", "price": 20 })],
    created_at: Some(Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()),
    ..Default::default()
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_each_tier() {
  let s = store().await;

  for path in [DocPath::user("u1", "f1"), DocPath::public("f1"), DocPath::legacy("f2")] {
    let doc = document(&format!("Cafe {path}"), None, 1);
    s.put(&path, &doc).await.unwrap();
    assert_eq!(s.get(&path).await.unwrap(), Some(doc));
  }
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(&DocPath::user("u1", "nope")).await.unwrap().is_none());
  assert!(s.get(&DocPath::legacy("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn put_overwrites_in_place() {
  let s = store().await;
  let path = DocPath::user("u1", "f1");

  s.put(&path, &document("Old Name", None, 1)).await.unwrap();
  s.put(&path, &document("New Name", None, 1)).await.unwrap();

  let doc = s.get(&path).await.unwrap().unwrap();
  assert_eq!(doc.business_name, "New Name");
  assert_eq!(s.list_namespace("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn loosely_typed_products_are_kept_verbatim() {
  let s = store().await;
  let path = DocPath::legacy("f1");
  let mut doc = document("Old Cafe", None, 1);
  doc.products = vec![json!({ "name": "Tea", "price": "20", "available": true })];

  s.put(&path, &doc).await.unwrap();
  assert_eq!(s.get(&path).await.unwrap().unwrap().products, doc.products);
}

// ─── Indexes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_index_tracks_user_scoped_writes_only() {
  let s = store().await;

  s.put(&DocPath::user("u1", "f1"), &document("Cafe", None, 1)).await.unwrap();
  s.put(&DocPath::public("f2"), &document("Cafe", None, 1)).await.unwrap();
  s.put(&DocPath::legacy("f3"), &document("Cafe", None, 1)).await.unwrap();

  assert_eq!(s.owner_of("f1").await.unwrap().as_deref(), Some("u1"));
  assert_eq!(s.owner_of("f2").await.unwrap(), None);
  assert_eq!(s.owner_of("f3").await.unwrap(), None);
}

#[tokio::test]
async fn slug_candidates_are_oldest_first() {
  let s = store().await;

  s.put(&DocPath::user("b", "late"), &document("Cafe", Some("cafe"), 20)).await.unwrap();
  s.put(&DocPath::user("a", "early"), &document("Cafe", Some("cafe"), 3)).await.unwrap();
  s.put(&DocPath::user("c", "other"), &document("Bakery", Some("bakery"), 1)).await.unwrap();
  s.put(&DocPath::public("mirror"), &document("Cafe", Some("cafe"), 1)).await.unwrap();

  assert_eq!(s.slug_candidates("cafe").await.unwrap(), vec![
    DocPath::user("a", "early"),
    DocPath::user("b", "late"),
  ]);
}

#[tokio::test]
async fn missing_slug_is_indexed_under_derived_slug() {
  let s = store().await;
  s.put(&DocPath::user("u1", "f1"), &document("Cafe Blue!", None, 1)).await.unwrap();
  assert_eq!(s.slug_candidates("cafe-blue").await.unwrap(), vec![DocPath::user("u1", "f1")]);
}

#[tokio::test]
async fn renaming_moves_the_slug_entry() {
  let s = store().await;
  let path = DocPath::user("u1", "f1");

  s.put(&path, &document("Cafe", Some("cafe"), 1)).await.unwrap();
  s.put(&path, &document("Bistro", Some("bistro"), 1)).await.unwrap();

  assert!(s.slug_candidates("cafe").await.unwrap().is_empty());
  assert_eq!(s.slug_candidates("bistro").await.unwrap(), vec![path]);
}

#[tokio::test]
async fn list_namespace_is_scoped_to_owner() {
  let s = store().await;
  s.put(&DocPath::user("u1", "a"), &document("A", None, 1)).await.unwrap();
  s.put(&DocPath::user("u1", "b"), &document("B", None, 2)).await.unwrap();
  s.put(&DocPath::user("u2", "c"), &document("C", None, 3)).await.unwrap();
  s.put(&DocPath::public("a"), &document("A", None, 1)).await.unwrap();

  let paths: Vec<DocPath> = s
    .list_namespace("u1")
    .await
    .unwrap()
    .into_iter()
    .map(|(p, _)| p)
    .collect();
  assert_eq!(paths, vec![DocPath::user("u1", "a"), DocPath::user("u1", "b")]);
}

// ─── Locator and editor over SQLite ──────────────────────────────────────────

#[tokio::test]
async fn locator_finds_forms_through_the_owner_index() {
  let s = Arc::new(store().await);
  s.put(&DocPath::user("owner", "f1"), &document("Cafe", None, 1)).await.unwrap();
  s.put(&DocPath::legacy("f1"), &document("Legacy Cafe", None, 1)).await.unwrap();

  let record = FormLocator::new(Arc::clone(&s))
    .resolve_by_id("f1", &CallerIdentity::anonymous())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(record.storage_tier, StorageTier::UserScoped);
  assert_eq!(record.owner_id.as_deref(), Some("owner"));
  assert_eq!(record.business_name, "Cafe");
}

#[tokio::test]
async fn editor_writes_are_visible_by_slug_and_public_copy() {
  let s = Arc::new(store().await);
  let editor = FormEditor::new(Arc::clone(&s), AuthorizationGate::default());
  let owner = CallerIdentity::user("u1");

  let record = editor
    .create(&owner, FormDraft {
      business_name: "Cafe Blue".into(),
      phone_number:  "9876543210".into(),
      products:      vec![Product::new("Tea", 20.0).unwrap()],
    })
    .await
    .unwrap();

  let locator = FormLocator::new(Arc::clone(&s));
  let by_slug = locator.resolve_by_slug("cafe-blue").await.unwrap().unwrap();
  assert_eq!(by_slug, record);

  let public = s.get(&DocPath::public(&record.id)).await.unwrap().unwrap();
  assert_eq!(public.user_id.as_deref(), Some("u1"));
  assert_eq!(editor.list_owned(&owner).await.unwrap(), vec![record]);
}
