//! Zone: a geographic region, identified by city and province.
//!
//! Zones are reference data: they are seeded up front and never created by
//! the association flow. Clients refer to a zone by its display name,
//! `city(localNameOfCity)/province`, which [`ZoneName`] parses back into the
//! natural key.

use std::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
  str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validate::{ErrorCode, ValidationErrors};

// ─── Zone ────────────────────────────────────────────────────────────────────

/// A region an account studies in.
///
/// Equality, ordering and hashing use `(city, province)` only;
/// `local_name_of_city` is display text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
  pub zone_id:            Uuid,
  pub city:               String,
  pub local_name_of_city: String,
  pub province:           String,
}

impl Zone {
  pub fn new(
    city: impl Into<String>,
    local_name_of_city: impl Into<String>,
    province: impl Into<String>,
  ) -> Self {
    Self {
      zone_id:            Uuid::new_v4(),
      city:               city.into(),
      local_name_of_city: local_name_of_city.into(),
      province:           province.into(),
    }
  }

  /// Parse one `city,localNameOfCity,province` seed line.
  ///
  /// Returns `None` for blank lines and lines without exactly three
  /// non-empty columns.
  pub fn from_csv_line(line: &str) -> Option<Self> {
    let mut cols = line.trim().split(',').map(str::trim);
    let city = cols.next().filter(|c| !c.is_empty())?;
    let local = cols.next().filter(|c| !c.is_empty())?;
    let province = cols.next().filter(|c| !c.is_empty())?;
    if cols.next().is_some() {
      return None;
    }
    Some(Self::new(city, local, province))
  }

  /// The natural key of this zone.
  pub fn key(&self) -> (&str, &str) { (&self.city, &self.province) }
}

impl fmt::Display for Zone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({})/{}", self.city, self.local_name_of_city, self.province)
  }
}

impl PartialEq for Zone {
  fn eq(&self, other: &Self) -> bool { self.key() == other.key() }
}

impl Eq for Zone {}

impl Hash for Zone {
  fn hash<H: Hasher>(&self, state: &mut H) { self.key().hash(state); }
}

impl PartialOrd for Zone {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Zone {
  fn cmp(&self, other: &Self) -> Ordering { self.key().cmp(&other.key()) }
}

// ─── ZoneName ────────────────────────────────────────────────────────────────

/// A parsed `city(localNameOfCity)/province` display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneName {
  pub city:               String,
  pub local_name_of_city: String,
  pub province:           String,
}

impl FromStr for ZoneName {
  type Err = ValidationErrors;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || {
      ValidationErrors::single(
        "zone_name",
        ErrorCode::InvalidFormat,
        "zone name must look like city(localName)/province",
      )
    };

    let s = s.trim();
    let (city, rest) = s.split_once('(').ok_or_else(invalid)?;
    let (local, rest) = rest.split_once(')').ok_or_else(invalid)?;
    let province = rest.strip_prefix('/').ok_or_else(invalid)?;

    if city.is_empty() || province.is_empty() {
      return Err(invalid());
    }

    Ok(Self {
      city:               city.to_owned(),
      local_name_of_city: local.to_owned(),
      province:           province.to_owned(),
    })
  }
}

impl fmt::Display for ZoneName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({})/{}", self.city, self.local_name_of_city, self.province)
  }
}
