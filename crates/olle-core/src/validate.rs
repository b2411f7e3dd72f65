//! Field-level validation results and the nickname uniqueness validator.
//!
//! Structural checks live next to the forms in [`crate::form`]; this module
//! owns the shared error shape and the one check that needs the store.

use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::{Error, Result, form::check_nickname_format, store::AccountStore};

// ─── Error codes ─────────────────────────────────────────────────────────────

/// Machine-readable reason a field was rejected.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
  /// Another account already holds this value.
  DuplicateValue,
  TooLong,
  TooShort,
  InvalidFormat,
  /// Two fields that must agree (e.g. password and confirmation) differ.
  Mismatch,
  Blank,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub code:    ErrorCode,
  pub message: String,
}

// ─── Collected errors ────────────────────────────────────────────────────────

/// Every field failure found while validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  /// A collection holding exactly one failure.
  pub fn single(
    field: &'static str,
    code: ErrorCode,
    message: impl Into<String>,
  ) -> Self {
    let mut errors = Self::new();
    errors.push(field, code, message);
    errors
  }

  pub fn push(
    &mut self,
    field: &'static str,
    code: ErrorCode,
    message: impl Into<String>,
  ) {
    self.0.push(FieldError { field, code, message: message.into() });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }

  /// The first failure recorded against `field`, if any.
  pub fn field(&self, field: &str) -> Option<&FieldError> {
    self.0.iter().find(|e| e.field == field)
  }

  /// `Ok(())` when nothing was recorded, otherwise a validation error.
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(self))
    }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {} ({})", e.field, e.message, e.code)?;
    }
    Ok(())
  }
}

impl IntoIterator for ValidationErrors {
  type Item = FieldError;
  type IntoIter = std::vec::IntoIter<FieldError>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

// ─── Nickname uniqueness ─────────────────────────────────────────────────────

/// Reject `candidate` if it is malformed or held by another account.
///
/// `exclude` names the account being edited; a collision with that account
/// is not a duplicate, so resubmitting one's own nickname passes. The store
/// is only read, never written.
pub async fn validate_nickname<S>(
  store: &S,
  candidate: &str,
  exclude: Option<Uuid>,
) -> Result<()>
where
  S: AccountStore,
{
  check_nickname_format(candidate).into_result()?;

  let holder = store
    .find_account_by_nickname(candidate)
    .await
    .map_err(Error::store)?;

  match holder {
    Some(account) if Some(account.account_id) != exclude => {
      Err(Error::Validation(ValidationErrors::single(
        "nickname",
        ErrorCode::DuplicateValue,
        "that nickname is already taken",
      )))
    }
    _ => Ok(()),
  }
}
