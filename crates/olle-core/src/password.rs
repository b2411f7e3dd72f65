//! The credential-encoding collaborator.
//!
//! Hashing policy is not decided here. Front ends plug in an implementation
//! (the `olle` binary uses argon2) and the settings service only calls it.

/// Turns a raw password into the opaque credential stored on an account.
pub trait PasswordEncoder: Send + Sync {
  fn encode(&self, raw: &str) -> Result<String, PasswordEncoderError>;

  /// Whether `raw` is the password that produced `encoded`.
  fn matches(&self, raw: &str, encoded: &str) -> bool;
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PasswordEncoderError(pub String);

impl From<PasswordEncoderError> for crate::Error {
  fn from(e: PasswordEncoderError) -> Self { Self::PasswordEncoding(e.0) }
}
