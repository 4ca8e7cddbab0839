//! Authorization gate: who may view and who may edit a resolved form.
//!
//! Forms exist to be shared, so every authoritative scoped record is
//! viewable by anyone. Editing needs the caller to own the record, and only
//! authoritative tiers are editable; public copies are mirrors.

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  form::{CallerIdentity, FormRecord, StorageTier},
};

/// What the caller wants to do with the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
  #[default]
  View,
  Edit,
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
  /// The caller may not even see the form. Must be reported exactly like a
  /// missing form.
  Hidden,
  /// The caller may see the form but not change it.
  ReadOnly,
}

impl From<Denial> for Error {
  fn from(d: Denial) -> Self {
    match d {
      Denial::Hidden => Error::NotFound,
      Denial::ReadOnly => Error::PermissionDenied,
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate {
  /// Whether first-generation flat records are publicly viewable. Owners can
  /// always see their own legacy records.
  pub legacy_visible: bool,
}

impl Default for AuthorizationGate {
  fn default() -> Self { Self { legacy_visible: true } }
}

impl AuthorizationGate {
  pub fn new(legacy_visible: bool) -> Self { Self { legacy_visible } }

  pub fn can_view(&self, record: &FormRecord, caller: &CallerIdentity) -> bool {
    match record.storage_tier {
      StorageTier::UserScoped | StorageTier::PublicScoped => true,
      StorageTier::LegacyFlat => self.legacy_visible || is_owner(record, caller),
    }
  }

  pub fn can_edit(&self, record: &FormRecord, caller: &CallerIdentity) -> bool {
    self.can_view(record, caller)
      && !record.storage_tier.is_denormalized()
      && is_owner(record, caller)
  }

  /// Apply the gate for `access`, reporting the strongest applicable denial.
  pub fn check(
    &self,
    record: &FormRecord,
    caller: &CallerIdentity,
    access: Access,
  ) -> Result<(), Denial> {
    if !self.can_view(record, caller) {
      return Err(Denial::Hidden);
    }
    if access == Access::Edit && !self.can_edit(record, caller) {
      return Err(Denial::ReadOnly);
    }
    Ok(())
  }
}

fn is_owner(record: &FormRecord, caller: &CallerIdentity) -> bool {
  match (&record.owner_id, &caller.uid) {
    (Some(owner), Some(uid)) => owner == uid,
    _ => false,
  }
}
