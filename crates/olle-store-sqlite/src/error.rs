//! Error type for `olle-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A UNIQUE, FOREIGN KEY or CHECK constraint rejected the write.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An association referenced a tag that has not been saved.
  #[error("unknown tag: {0:?}")]
  UnknownTag(String),

  /// An association referenced a zone that has not been saved.
  #[error("unknown zone: {0}")]
  UnknownZone(String),
}

impl Error {
  /// Classify a driver error, pulling constraint violations out of the
  /// generic database bucket.
  pub(crate) fn from_db(err: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      failure,
      message,
    )) = &err
      && failure.code == rusqlite::ErrorCode::ConstraintViolation
    {
      return Self::Constraint(
        message.clone().unwrap_or_else(|| failure.to_string()),
      );
    }
    Self::Database(err)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
