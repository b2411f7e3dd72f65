//! The `AccountStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `olle-store-sqlite`).
//! The settings and association services depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{account::Account, tag::Tag, zone::Zone};

/// Abstraction over the relational store holding accounts and reference data.
///
/// Association sets are persisted explicitly: mutating `account.tags` in
/// memory changes nothing until [`AccountStore::save_account_tags`] is called.
/// Every load returns a fresh snapshot; there is no session cache.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Insert or update the account's scalar fields (identity, profile,
  /// credential, notification flags). Association sets are ignored.
  ///
  /// Fails if the nickname or email collides with another account.
  fn save_account<'a>(
    &'a self,
    account: &'a Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load an account, tags and zones included. `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn find_account_by_nickname<'a>(
    &'a self,
    nickname: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Replace the stored tag set of `account` with `account.tags`. Every tag
  /// must already be saved.
  fn save_account_tags<'a>(
    &'a self,
    account: &'a Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace the stored zone set of `account` with `account.zones`. Every
  /// zone must already be saved.
  fn save_account_zones<'a>(
    &'a self,
    account: &'a Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// Persist a new tag. Fails if the title is already taken.
  fn save_tag<'a>(
    &'a self,
    tag: &'a Tag,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn find_tag_by_title<'a>(
    &'a self,
    title: &'a str,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + 'a;

  /// All tags, ordered by title.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  fn delete_tag(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Zones ─────────────────────────────────────────────────────────────

  /// Persist a new zone. Fails if `(city, province)` is already taken.
  fn save_zone<'a>(
    &'a self,
    zone: &'a Zone,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn find_zone_by_city_and_province<'a>(
    &'a self,
    city: &'a str,
    province: &'a str,
  ) -> impl Future<Output = Result<Option<Zone>, Self::Error>> + Send + 'a;

  /// All zones, ordered by city then province.
  fn list_zones(
    &self,
  ) -> impl Future<Output = Result<Vec<Zone>, Self::Error>> + Send + '_;

  fn delete_zone(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
