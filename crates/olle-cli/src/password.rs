//! Argon2 implementation of [`PasswordEncoder`].

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use olle_core::password::{PasswordEncoder, PasswordEncoderError};
use rand_core::OsRng;

/// Produces argon2id PHC strings, e.g. `$argon2id$v=19$…`.
#[derive(Default)]
pub struct Argon2Encoder {
  argon2: Argon2<'static>,
}

impl PasswordEncoder for Argon2Encoder {
  fn encode(&self, raw: &str) -> Result<String, PasswordEncoderError> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .argon2
      .hash_password(raw.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| PasswordEncoderError(format!("argon2 error: {e}")))
  }

  fn matches(&self, raw: &str, encoded: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(encoded) else {
      return false;
    };
    self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok()
  }
}
