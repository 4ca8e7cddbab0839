//! Handlers for form endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/forms/resolve` | `?id=`, `?slug=` or `?biz=&phone=&products=`; `mode=view\|edit` |
//! | `GET`  | `/preview/{slug}` | As above, slug taken from the path |
//! | `POST` | `/forms` | Signed-in; body: a form draft |
//! | `GET`  | `/forms` | The caller's own forms, newest first |
//! | `PUT`  | `/forms/{id}` | Owner only; honours `If-Match` |
//! | `POST` | `/forms/order` | Query locates the form; body: quantities, name, address |

use axum::{
  Json,
  extract::{Path, Query, RawQuery, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use whatsorder_codec::link;
use whatsorder_core::{
  editor::FormDraft,
  form::{CallerIdentity, FormRecord, ResolvedForm},
  gate::Access,
  order::{OrderMessage, OrderRequest, compose},
  store::FormStore,
};

use crate::{
  AppState,
  error::ApiError,
  identity::Caller,
  raw_query_param,
  resolver::{Resolution, ResolveParams},
};

// ─── Views ───────────────────────────────────────────────────────────────────

/// A resolved form as returned to the page.
#[derive(Debug, Serialize)]
pub struct FormView {
  pub form:      ResolvedForm,
  /// Whether the caller may edit the form.
  pub editable:  bool,
  pub share_url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub etag:      Option<String>,
}

/// A stored form as returned to its owner after a write.
#[derive(Debug, Serialize)]
pub struct RecordView {
  pub record:    FormRecord,
  pub etag:      String,
  pub share_url: String,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
  pub message:      OrderMessage,
  pub whatsapp_url: String,
}

fn share_url<S>(state: &AppState<S>, form: &ResolvedForm) -> String {
  link::absolute(&state.config.base_url, &link::share_path(form))
}

fn etag_headers(etag: &str) -> HeaderMap {
  let mut headers = HeaderMap::new();
  if let Ok(value) = HeaderValue::from_str(etag) {
    headers.insert(header::ETAG, value);
  }
  headers
}

/// Product lists are read from the raw query so their own percent-encoding
/// is decoded exactly once, by the codec.
fn with_raw_products(mut params: ResolveParams, raw: Option<&str>) -> ResolveParams {
  if let Some(products) = raw_query_param(raw, "products") {
    params.products = Some(products);
  }
  params
}

async fn resolve_found<S>(
  state: &AppState<S>,
  params: &ResolveParams,
  caller: &CallerIdentity,
) -> Result<ResolvedForm, ApiError>
where
  S: FormStore + 'static,
{
  match state.resolver.resolve(params, caller).await? {
    Resolution::Found(form) => Ok(form),
    Resolution::Denied(denial) => Err(denial.into()),
    Resolution::NotFound => Err(ApiError::NotFound),
  }
}

async fn respond<S>(
  state: &AppState<S>,
  params: ResolveParams,
  caller: &CallerIdentity,
) -> Result<Response, ApiError>
where
  S: FormStore + 'static,
{
  let form = resolve_found(state, &params, caller).await?;

  let (editable, etag) = match &form {
    ResolvedForm::Stored(record) => {
      (state.resolver.gate().can_edit(record, caller), Some(record.etag()))
    }
    ResolvedForm::Ephemeral(_) => (false, None),
  };
  let headers = etag.as_deref().map(etag_headers).unwrap_or_default();

  let view = FormView { share_url: share_url(state, &form), form, editable, etag };
  Ok((headers, Json(view)).into_response())
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

/// `GET /forms/resolve`
pub async fn resolve<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  RawQuery(raw): RawQuery,
  Query(params): Query<ResolveParams>,
) -> Result<Response, ApiError>
where
  S: FormStore + 'static,
{
  let params = with_raw_products(params, raw.as_deref());
  respond(&state, params, &caller).await
}

/// `GET /preview/{slug}`
pub async fn preview<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(slug): Path<String>,
  RawQuery(raw): RawQuery,
  Query(params): Query<ResolveParams>,
) -> Result<Response, ApiError>
where
  S: FormStore + 'static,
{
  let mut params = with_raw_products(params, raw.as_deref());
  params.slug = Some(slug);
  respond(&state, params, &caller).await
}

// ─── Create / list / update ──────────────────────────────────────────────────

/// `POST /forms`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Json(draft): Json<FormDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FormStore + 'static,
{
  let record = state.editor.create(&caller, draft).await?;
  let etag = record.etag();
  let path = link::stored_share_path(&record);

  let mut headers = etag_headers(&etag);
  if let Ok(location) = HeaderValue::from_str(&path) {
    headers.insert(header::LOCATION, location);
  }

  let view = RecordView {
    share_url: link::absolute(&state.config.base_url, &path),
    record,
    etag,
  };
  Ok((StatusCode::CREATED, headers, Json(view)))
}

/// `GET /forms`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<FormRecord>>, ApiError>
where
  S: FormStore + 'static,
{
  Ok(Json(state.editor.list_owned(&caller).await?))
}

/// `PUT /forms/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(draft): Json<FormDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FormStore + 'static,
{
  let if_match = headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok());

  let record = state.editor.update(&id, &caller, draft, if_match).await?;
  let etag = record.etag();

  let view = RecordView {
    share_url: link::absolute(&state.config.base_url, &link::stored_share_path(&record)),
    record,
    etag,
  };
  Ok((etag_headers(&view.etag), Json(view)))
}

// ─── Order ───────────────────────────────────────────────────────────────────

/// `POST /forms/order`
pub async fn order<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  RawQuery(raw): RawQuery,
  Query(params): Query<ResolveParams>,
  Json(request): Json<OrderRequest>,
) -> Result<Json<OrderView>, ApiError>
where
  S: FormStore + 'static,
{
  let mut params = with_raw_products(params, raw.as_deref());
  params.mode = Access::View;

  let form = resolve_found(&state, &params, &caller).await?;
  let message = compose(&form, &request)?;
  let whatsapp_url = link::whatsapp_order_link(form.phone_number(), &message.text);

  Ok(Json(OrderView { message, whatsapp_url }))
}
