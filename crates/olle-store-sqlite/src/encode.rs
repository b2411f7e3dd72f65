//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Booleans use SQLite's native 0/1 integers.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use olle_core::{account::Account, tag::Tag, zone::Zone};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Column list matching [`RawAccount::from_row`].
pub const ACCOUNT_COLUMNS: &str = "
  account_id, nickname, email, password, joined_at,
  bio, url, occupation, location, profile_image,
  study_create_by_email, study_create_by_web,
  study_enrollment_result_by_email, study_enrollment_result_by_web,
  study_update_by_email, study_update_by_web";

/// An `accounts` row plus its association rows, before decoding.
pub struct RawAccount {
  pub account_id:                       String,
  pub nickname:                         String,
  pub email:                            String,
  pub password:                         String,
  pub joined_at:                        String,
  pub bio:                              Option<String>,
  pub url:                              Option<String>,
  pub occupation:                       Option<String>,
  pub location:                         Option<String>,
  pub profile_image:                    Option<String>,
  pub study_create_by_email:            bool,
  pub study_create_by_web:              bool,
  pub study_enrollment_result_by_email: bool,
  pub study_enrollment_result_by_web:   bool,
  pub study_update_by_email:            bool,
  pub study_update_by_web:              bool,
  pub tags:                             Vec<RawTag>,
  pub zones:                            Vec<RawZone>,
}

impl RawAccount {
  /// Read the scalar columns; association vectors start empty.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:                       row.get(0)?,
      nickname:                         row.get(1)?,
      email:                            row.get(2)?,
      password:                         row.get(3)?,
      joined_at:                        row.get(4)?,
      bio:                              row.get(5)?,
      url:                              row.get(6)?,
      occupation:                       row.get(7)?,
      location:                         row.get(8)?,
      profile_image:                    row.get(9)?,
      study_create_by_email:            row.get(10)?,
      study_create_by_web:              row.get(11)?,
      study_enrollment_result_by_email: row.get(12)?,
      study_enrollment_result_by_web:   row.get(13)?,
      study_update_by_email:            row.get(14)?,
      study_update_by_web:              row.get(15)?,
      tags:                             Vec::new(),
      zones:                            Vec::new(),
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:                       decode_uuid(&self.account_id)?,
      nickname:                         self.nickname,
      email:                            self.email,
      password:                         self.password,
      joined_at:                        decode_dt(&self.joined_at)?,
      bio:                              self.bio,
      url:                              self.url,
      occupation:                       self.occupation,
      location:                         self.location,
      profile_image:                    self.profile_image,
      study_create_by_email:            self.study_create_by_email,
      study_create_by_web:              self.study_create_by_web,
      study_enrollment_result_by_email: self.study_enrollment_result_by_email,
      study_enrollment_result_by_web:   self.study_enrollment_result_by_web,
      study_update_by_email:            self.study_update_by_email,
      study_update_by_web:              self.study_update_by_web,
      tags:                             self
        .tags
        .into_iter()
        .map(RawTag::into_tag)
        .collect::<Result<BTreeSet<_>>>()?,
      zones:                            self
        .zones
        .into_iter()
        .map(RawZone::into_zone)
        .collect::<Result<BTreeSet<_>>>()?,
    })
  }
}

pub struct RawTag {
  pub tag_id: String,
  pub title:  String,
}

impl RawTag {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { tag_id: row.get(0)?, title: row.get(1)? })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag { tag_id: decode_uuid(&self.tag_id)?, title: self.title })
  }
}

pub struct RawZone {
  pub zone_id:            String,
  pub city:               String,
  pub local_name_of_city: String,
  pub province:           String,
}

impl RawZone {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      zone_id:            row.get(0)?,
      city:               row.get(1)?,
      local_name_of_city: row.get(2)?,
      province:           row.get(3)?,
    })
  }

  pub fn into_zone(self) -> Result<Zone> {
    Ok(Zone {
      zone_id:            decode_uuid(&self.zone_id)?,
      city:               self.city,
      local_name_of_city: self.local_name_of_city,
      province:           self.province,
    })
  }
}
