//! Input forms and their structural checks.
//!
//! Forms are what a front end binds user input to. Each form validates its
//! own shape (lengths, character classes, matching pairs) without touching
//! the store; checks that need the store live in [`crate::validate`].
//! Lengths are counted in characters, not bytes.

use serde::{Deserialize, Serialize};

use crate::{
  account::Account,
  validate::{ErrorCode, ValidationErrors},
  zone::ZoneName,
};

pub const BIO_MAX_LEN: usize = 35;
pub const URL_MAX_LEN: usize = 50;
pub const OCCUPATION_MAX_LEN: usize = 50;
pub const LOCATION_MAX_LEN: usize = 50;

pub const NICKNAME_MIN_LEN: usize = 3;
pub const NICKNAME_MAX_LEN: usize = 20;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 50;

pub const TAG_TITLE_MAX_LEN: usize = 20;

fn char_len(s: &str) -> usize { s.chars().count() }

fn check_max_len(
  errors: &mut ValidationErrors,
  field: &'static str,
  value: Option<&str>,
  max: usize,
) {
  if let Some(v) = value
    && char_len(v) > max
  {
    errors.push(
      field,
      ErrorCode::TooLong,
      format!("must be at most {max} characters"),
    );
  }
}

/// Treat blank submissions as "unset".
fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
  pub bio:           Option<String>,
  pub url:           Option<String>,
  pub occupation:    Option<String>,
  pub location:      Option<String>,
  pub profile_image: Option<String>,
}

impl ProfileForm {
  pub fn validate(&self) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_max_len(&mut errors, "bio", self.bio.as_deref(), BIO_MAX_LEN);
    check_max_len(&mut errors, "url", self.url.as_deref(), URL_MAX_LEN);
    check_max_len(
      &mut errors,
      "occupation",
      self.occupation.as_deref(),
      OCCUPATION_MAX_LEN,
    );
    check_max_len(
      &mut errors,
      "location",
      self.location.as_deref(),
      LOCATION_MAX_LEN,
    );
    errors
  }

  /// Copy every field onto `account`. Call only after [`Self::validate`]
  /// came back empty.
  pub(crate) fn apply_to(self, account: &mut Account) {
    account.bio = non_blank(self.bio);
    account.url = non_blank(self.url);
    account.occupation = non_blank(self.occupation);
    account.location = non_blank(self.location);
    account.profile_image = non_blank(self.profile_image);
  }
}

impl From<&Account> for ProfileForm {
  fn from(a: &Account) -> Self {
    Self {
      bio:           a.bio.clone(),
      url:           a.url.clone(),
      occupation:    a.occupation.clone(),
      location:      a.location.clone(),
      profile_image: a.profile_image.clone(),
    }
  }
}

// ─── Nickname ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicknameForm {
  pub nickname: String,
}

impl NicknameForm {
  pub fn new(nickname: impl Into<String>) -> Self {
    Self { nickname: nickname.into() }
  }

  pub fn validate_format(&self) -> ValidationErrors {
    check_nickname_format(&self.nickname)
  }
}

fn is_nickname_char(c: char) -> bool {
  matches!(c, 'ㄱ'..='ㅎ' | '가'..='힣' | 'a'..='z' | '0'..='9' | '_' | '-')
}

/// Shape check for a nickname: 3–20 characters of Hangul, lowercase ASCII
/// letters, digits, `_` or `-`.
pub fn check_nickname_format(nickname: &str) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  let len = char_len(nickname);

  if nickname.trim().is_empty() {
    errors.push("nickname", ErrorCode::Blank, "nickname is required");
  } else if len < NICKNAME_MIN_LEN {
    errors.push(
      "nickname",
      ErrorCode::TooShort,
      format!("must be at least {NICKNAME_MIN_LEN} characters"),
    );
  } else if len > NICKNAME_MAX_LEN {
    errors.push(
      "nickname",
      ErrorCode::TooLong,
      format!("must be at most {NICKNAME_MAX_LEN} characters"),
    );
  } else if !nickname.chars().all(is_nickname_char) {
    errors.push(
      "nickname",
      ErrorCode::InvalidFormat,
      "only Hangul, lowercase letters, digits, '_' and '-' are allowed",
    );
  }
  errors
}

// ─── Password ────────────────────────────────────────────────────────────────

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForm {
  pub new_password:         String,
  pub new_password_confirm: String,
}

impl std::fmt::Debug for PasswordForm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PasswordForm").finish_non_exhaustive()
  }
}

impl PasswordForm {
  pub fn new(
    new_password: impl Into<String>,
    new_password_confirm: impl Into<String>,
  ) -> Self {
    Self {
      new_password:         new_password.into(),
      new_password_confirm: new_password_confirm.into(),
    }
  }

  pub fn validate(&self) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let len = char_len(&self.new_password);

    if len < PASSWORD_MIN_LEN {
      errors.push(
        "new_password",
        ErrorCode::TooShort,
        format!("must be at least {PASSWORD_MIN_LEN} characters"),
      );
    } else if len > PASSWORD_MAX_LEN {
      errors.push(
        "new_password",
        ErrorCode::TooLong,
        format!("must be at most {PASSWORD_MAX_LEN} characters"),
      );
    }

    if self.new_password != self.new_password_confirm {
      errors.push(
        "new_password",
        ErrorCode::Mismatch,
        "the new passwords do not match",
      );
    }
    errors
  }
}

// ─── Tag / Zone ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagForm {
  pub tag_title: String,
}

impl TagForm {
  pub fn new(tag_title: impl Into<String>) -> Self {
    Self { tag_title: tag_title.into() }
  }

  /// The trimmed title, or the reason it cannot be used.
  pub fn title(&self) -> Result<&str, ValidationErrors> {
    check_tag_title(&self.tag_title)
  }
}

/// Trim a raw tag title and check it is non-blank and within
/// [`TAG_TITLE_MAX_LEN`].
pub fn check_tag_title(raw: &str) -> Result<&str, ValidationErrors> {
  let title = raw.trim();
  if title.is_empty() {
    return Err(ValidationErrors::single(
      "tag_title",
      ErrorCode::Blank,
      "tag title is required",
    ));
  }
  if char_len(title) > TAG_TITLE_MAX_LEN {
    return Err(ValidationErrors::single(
      "tag_title",
      ErrorCode::TooLong,
      format!("must be at most {TAG_TITLE_MAX_LEN} characters"),
    ));
  }
  Ok(title)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneForm {
  pub zone_name: String,
}

impl ZoneForm {
  pub fn new(zone_name: impl Into<String>) -> Self {
    Self { zone_name: zone_name.into() }
  }

  pub fn parse(&self) -> Result<ZoneName, ValidationErrors> {
    self.zone_name.parse()
  }
}
