//! Error types for `olle-core`.

use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more submitted fields were rejected. Recoverable; the caller
  /// shows the per-field messages and the account is left untouched.
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("account not found: {0}")]
  AccountNotFound(String),

  #[error("tag not found: {0:?}")]
  TagNotFound(String),

  #[error("zone not found: {0:?}")]
  ZoneNotFound(String),

  #[error("password encoding failed: {0}")]
  PasswordEncoding(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Storage faults are never handled in this crate.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// The field-level failures, if this is a validation error.
  pub fn validation_errors(&self) -> Option<&ValidationErrors> {
    match self {
      Self::Validation(errors) => Some(errors),
      _ => None,
    }
  }
}

impl From<ValidationErrors> for Error {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
