//! JSON HTTP API for WhatsOrder forms.
//!
//! Exposes an axum [`Router`] backed by any [`FormStore`]. Authentication,
//! TLS, and request tracing are the caller's responsibility; the caller's uid
//! arrives in a trusted header (see [`identity`]).

pub mod error;
pub mod forms;
pub mod identity;
pub mod products;
pub mod resolver;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use serde::Deserialize;
use whatsorder_core::{editor::FormEditor, gate::AuthorizationGate, store::FormStore};

pub use error::ApiError;
pub use resolver::{FormResolver, Resolution, ResolveParams};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WHATSORDER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// Public origin used to build absolute share links.
  pub base_url:        String,
  pub store_path:      PathBuf,
  /// Request header carrying the signed-in caller's uid.
  #[serde(default = "default_identity_header")]
  pub identity_header: String,
  /// Whether first-generation forms are visible to everyone.
  #[serde(default = "default_legacy_visible")]
  pub legacy_visible:  bool,
}

fn default_identity_header() -> String { "x-caller-uid".to_owned() }

fn default_legacy_visible() -> bool { true }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub resolver: Arc<FormResolver<S>>,
  pub editor:   Arc<FormEditor<S>>,
  pub config:   Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      resolver: Arc::clone(&self.resolver),
      editor:   Arc::clone(&self.editor),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S: FormStore> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let gate = AuthorizationGate::new(config.legacy_visible);
    Self {
      resolver: Arc::new(FormResolver::new(Arc::clone(&store), gate)),
      editor: Arc::new(FormEditor::new(Arc::clone(&store), gate)),
      store,
      config: Arc::new(config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FormStore + 'static,
{
  Router::new()
    // Forms
    .route("/forms", get(forms::list::<S>).post(forms::create::<S>))
    .route("/forms/resolve", get(forms::resolve::<S>))
    .route("/forms/order", post(forms::order::<S>))
    .route("/forms/{id}", put(forms::update::<S>))
    .route("/preview/{slug}", get(forms::preview::<S>))
    // Product codec
    .route("/products/encode", post(products::encode))
    .route("/products/decode", get(products::decode))
    .with_state(state)
}

/// The still percent-encoded value of `key` in a raw query string.
///
/// Product lists carry their own percent-encoding, so they are read before
/// the query-string layer decodes them; otherwise an encoded `,` inside a
/// name would split the entry.
pub(crate) fn raw_query_param(query: Option<&str>, key: &str) -> Option<String> {
  query?.split('&').find_map(|pair| {
    let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
    (k == key).then(|| v.to_owned())
  })
}
