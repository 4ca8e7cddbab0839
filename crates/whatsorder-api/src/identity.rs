//! Caller identity extractor.
//!
//! Authentication happens upstream. The identity provider (or the proxy in
//! front of this server) forwards the signed-in user's uid in a configurable
//! header; a missing or blank header means an anonymous caller.

use axum::{extract::FromRequestParts, http::request::Parts};
use whatsorder_core::{form::CallerIdentity, store::FormStore};

use crate::{AppState, error::ApiError};

/// The caller of the current request.
pub struct Caller(pub CallerIdentity);

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: FormStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(state.config.identity_header.as_str()) else {
      return Ok(Caller(CallerIdentity::anonymous()));
    };

    let uid = value
      .to_str()
      .map_err(|_| ApiError::BadRequest("identity header is not valid text".into()))?
      .trim();

    Ok(Caller(if uid.is_empty() {
      CallerIdentity::anonymous()
    } else {
      CallerIdentity::user(uid)
    }))
  }
}
