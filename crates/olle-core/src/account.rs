//! Account: a member's profile and preference aggregate.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{tag::Tag, zone::Zone};

// ─── Account ─────────────────────────────────────────────────────────────────

/// A registered member.
///
/// `nickname` and `email` are unique across all accounts; the store enforces
/// that with constraints and [`crate::validate::validate_nickname`] checks it
/// before a nickname change is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id: Uuid,
  pub nickname:   String,
  pub email:      String,
  /// Encoded credential; opaque to this crate.
  #[serde(skip_serializing, default)]
  pub password:   String,
  pub joined_at:  DateTime<Utc>,

  // ── Profile ─────────────────────────────────────────────────────────────
  pub bio:           Option<String>,
  pub url:           Option<String>,
  pub occupation:    Option<String>,
  pub location:      Option<String>,
  pub profile_image: Option<String>,

  // ── Notification preferences ────────────────────────────────────────────
  pub study_create_by_email:            bool,
  pub study_create_by_web:              bool,
  pub study_enrollment_result_by_email: bool,
  pub study_enrollment_result_by_web:   bool,
  pub study_update_by_email:            bool,
  pub study_update_by_web:              bool,

  // ── Associations ────────────────────────────────────────────────────────
  pub tags:  BTreeSet<Tag>,
  pub zones: BTreeSet<Zone>,
}

impl Account {
  /// A freshly registered account: empty profile, web notifications on,
  /// email notifications off, no tags or zones.
  pub fn new(
    nickname: impl Into<String>,
    email: impl Into<String>,
    password: impl Into<String>,
  ) -> Self {
    Self {
      account_id:                       Uuid::new_v4(),
      nickname:                         nickname.into(),
      email:                            email.into(),
      password:                         password.into(),
      joined_at:                        Utc::now(),
      bio:                              None,
      url:                              None,
      occupation:                       None,
      location:                         None,
      profile_image:                    None,
      study_create_by_email:            false,
      study_create_by_web:              true,
      study_enrollment_result_by_email: false,
      study_enrollment_result_by_web:   true,
      study_update_by_email:            false,
      study_update_by_web:              true,
      tags:                             BTreeSet::new(),
      zones:                            BTreeSet::new(),
    }
  }

  /// Overwrite all six notification flags from `n`.
  pub fn apply_notifications(&mut self, n: &Notifications) {
    self.study_create_by_email = n.study_create_by_email;
    self.study_create_by_web = n.study_create_by_web;
    self.study_enrollment_result_by_email = n.study_enrollment_result_by_email;
    self.study_enrollment_result_by_web = n.study_enrollment_result_by_web;
    self.study_update_by_email = n.study_update_by_email;
    self.study_update_by_web = n.study_update_by_web;
  }

  /// Titles of the account's tags, in order.
  pub fn tag_titles(&self) -> Vec<String> {
    self.tags.iter().map(|t| t.title.clone()).collect()
  }

  /// Display names of the account's zones, in order.
  pub fn zone_names(&self) -> Vec<String> {
    self.zones.iter().map(Zone::to_string).collect()
  }
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// A snapshot of an account's notification preferences.
///
/// Pure projection with no identity of its own: built from an account for
/// display, applied back with [`Account::apply_notifications`] on submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
  pub study_create_by_email:            bool,
  pub study_create_by_web:              bool,
  pub study_enrollment_result_by_email: bool,
  pub study_enrollment_result_by_web:   bool,
  pub study_update_by_email:            bool,
  pub study_update_by_web:              bool,
}

impl From<&Account> for Notifications {
  fn from(a: &Account) -> Self {
    Self {
      study_create_by_email:            a.study_create_by_email,
      study_create_by_web:              a.study_create_by_web,
      study_enrollment_result_by_email: a.study_enrollment_result_by_email,
      study_enrollment_result_by_web:   a.study_enrollment_result_by_web,
      study_update_by_email:            a.study_update_by_email,
      study_update_by_web:              a.study_update_by_web,
    }
  }
}
