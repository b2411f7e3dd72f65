//! Tag: a topic of interest, identified by its title.

use std::{
  cmp::Ordering,
  hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A topic an account is interested in.
///
/// Tags are created lazily the first time a title is referenced and are never
/// updated afterwards. Two tags are the same tag when their titles match; the
/// surrogate id plays no part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id: Uuid,
  pub title:  String,
}

impl Tag {
  /// A new, not-yet-persisted tag with a fresh id.
  pub fn new(title: impl Into<String>) -> Self {
    Self { tag_id: Uuid::new_v4(), title: title.into() }
  }
}

impl PartialEq for Tag {
  fn eq(&self, other: &Self) -> bool { self.title == other.title }
}

impl Eq for Tag {}

impl Hash for Tag {
  fn hash<H: Hasher>(&self, state: &mut H) { self.title.hash(state); }
}

impl PartialOrd for Tag {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Tag {
  fn cmp(&self, other: &Self) -> Ordering { self.title.cmp(&other.title) }
}
