//! [`SqliteStore`], the SQLite implementation of [`FormStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;
use whatsorder_core::{
  form::{DocPath, FormDocument, StorageTier},
  slug::generate_slug,
  store::FormStore,
};

use crate::{
  Result,
  encode::{decode_document, decode_path, encode_document, encode_path, index_created_at},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A form document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// A `documents` row before its columns are validated.
struct RawDocument {
  tier:      String,
  namespace: Option<String>,
  form_id:   String,
  body_json: String,
}

impl RawDocument {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tier:      row.get(0)?,
      namespace: row.get(1)?,
      form_id:   row.get(2)?,
      body_json: row.get(3)?,
    })
  }

  fn into_entry(self) -> Result<(DocPath, FormDocument)> {
    let path = decode_path(&self.tier, self.namespace, self.form_id)?;
    let doc = decode_document(&self.body_json)?;
    Ok((path, doc))
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── FormStore impl ──────────────────────────────────────────────────────────

impl FormStore for SqliteStore {
  type Error = crate::Error;

  async fn get(&self, path: &DocPath) -> Result<Option<FormDocument>> {
    let key = path.to_string();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body_json FROM documents WHERE path = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body.as_deref().map(decode_document).transpose()
  }

  async fn owner_of(&self, form_id: &str) -> Result<Option<String>> {
    let form_id = form_id.to_owned();

    let owner = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT owner FROM form_owners WHERE form_id = ?1",
              rusqlite::params![form_id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(owner)
  }

  async fn slug_candidates(&self, slug: &str) -> Result<Vec<DocPath>> {
    let slug = slug.to_owned();

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT owner, form_id FROM form_slugs
           WHERE slug = ?1
           ORDER BY created_at, owner, form_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![slug], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.into_iter().map(|(owner, id)| DocPath::user(owner, id)).collect())
  }

  async fn put(&self, path: &DocPath, doc: &FormDocument) -> Result<()> {
    let cols = encode_path(path);
    let body_json = encode_document(doc)?;
    let slug = doc
      .slug
      .clone()
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| generate_slug(&doc.business_name));
    let created_at = index_created_at(doc);
    let indexed = path.tier() == StorageTier::UserScoped;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO documents (path, tier, namespace, form_id, body_json)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(path) DO UPDATE SET body_json = excluded.body_json",
          rusqlite::params![cols.path, cols.tier, cols.namespace, cols.form_id, body_json],
        )?;

        if indexed {
          tx.execute(
            "INSERT INTO form_owners (form_id, owner) VALUES (?1, ?2)
             ON CONFLICT(form_id) DO UPDATE SET owner = excluded.owner",
            rusqlite::params![cols.form_id, cols.namespace],
          )?;
          tx.execute(
            "INSERT INTO form_slugs (owner, form_id, slug, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(owner, form_id)
             DO UPDATE SET slug = excluded.slug, created_at = excluded.created_at",
            rusqlite::params![cols.namespace, cols.form_id, slug, created_at],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(%path, "document stored");
    Ok(())
  }

  async fn list_namespace(&self, owner: &str) -> Result<Vec<(DocPath, FormDocument)>> {
    let owner = owner.to_owned();

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT tier, namespace, form_id, body_json FROM documents
           WHERE tier = 'user_scoped' AND namespace = ?1
           ORDER BY form_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner], RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_entry).collect()
  }
}
