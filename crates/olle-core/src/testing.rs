//! Test doubles: an in-memory [`AccountStore`] and a plain-text encoder.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use uuid::Uuid;

use crate::{
  account::Account,
  password::{PasswordEncoder, PasswordEncoderError},
  store::AccountStore,
  tag::Tag,
  zone::Zone,
};

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
  #[error("unique constraint violated: {0}")]
  Unique(&'static str),
  #[error("injected write failure")]
  Injected,
}

#[derive(Default)]
struct Inner {
  accounts: HashMap<Uuid, Account>,
  tags:     Vec<Tag>,
  zones:    Vec<Zone>,
}

/// Keeps everything in a mutex-guarded map and counts the calls tests care
/// about.
#[derive(Default)]
pub struct MemoryStore {
  inner:              Mutex<Inner>,
  fail_writes:        AtomicBool,
  nickname_lookups:   AtomicUsize,
  account_writes:     AtomicUsize,
  association_writes: AtomicUsize,
}

impl MemoryStore {
  /// Make every subsequent write fail with [`MemoryError::Injected`].
  pub fn fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  pub fn nickname_lookups(&self) -> usize {
    self.nickname_lookups.load(Ordering::SeqCst)
  }

  pub fn account_writes(&self) -> usize {
    self.account_writes.load(Ordering::SeqCst)
  }

  pub fn association_writes(&self) -> usize {
    self.association_writes.load(Ordering::SeqCst)
  }

  fn check_writable(&self) -> Result<(), MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      Err(MemoryError::Injected)
    } else {
      Ok(())
    }
  }

  fn find_account(&self, pred: impl Fn(&Account) -> bool) -> Option<Account> {
    let inner = self.inner.lock().unwrap();
    inner.accounts.values().find(|a| pred(a)).cloned()
  }
}

impl AccountStore for MemoryStore {
  type Error = MemoryError;

  async fn save_account(&self, account: &Account) -> Result<(), MemoryError> {
    self.check_writable()?;
    let mut inner = self.inner.lock().unwrap();

    for other in inner.accounts.values() {
      if other.account_id == account.account_id {
        continue;
      }
      if other.nickname == account.nickname {
        return Err(MemoryError::Unique("accounts.nickname"));
      }
      if other.email == account.email {
        return Err(MemoryError::Unique("accounts.email"));
      }
    }

    let mut stored = account.clone();
    if let Some(existing) = inner.accounts.get(&account.account_id) {
      stored.tags = existing.tags.clone();
      stored.zones = existing.zones.clone();
    } else {
      stored.tags.clear();
      stored.zones.clear();
    }
    inner.accounts.insert(account.account_id, stored);
    self.account_writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>, MemoryError> {
    Ok(self.find_account(|a| a.account_id == id))
  }

  async fn find_account_by_nickname(
    &self,
    nickname: &str,
  ) -> Result<Option<Account>, MemoryError> {
    self.nickname_lookups.fetch_add(1, Ordering::SeqCst);
    Ok(self.find_account(|a| a.nickname == nickname))
  }

  async fn find_account_by_email(
    &self,
    email: &str,
  ) -> Result<Option<Account>, MemoryError> {
    Ok(self.find_account(|a| a.email == email))
  }

  async fn save_account_tags(&self, account: &Account) -> Result<(), MemoryError> {
    self.check_writable()?;
    let mut inner = self.inner.lock().unwrap();
    if let Some(stored) = inner.accounts.get_mut(&account.account_id) {
      stored.tags = account.tags.clone();
    }
    self.association_writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  async fn save_account_zones(&self, account: &Account) -> Result<(), MemoryError> {
    self.check_writable()?;
    let mut inner = self.inner.lock().unwrap();
    if let Some(stored) = inner.accounts.get_mut(&account.account_id) {
      stored.zones = account.zones.clone();
    }
    self.association_writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  async fn delete_account(&self, id: Uuid) -> Result<(), MemoryError> {
    self.check_writable()?;
    self.inner.lock().unwrap().accounts.remove(&id);
    Ok(())
  }

  async fn save_tag(&self, tag: &Tag) -> Result<(), MemoryError> {
    self.check_writable()?;
    let mut inner = self.inner.lock().unwrap();
    if inner.tags.contains(tag) {
      return Err(MemoryError::Unique("tags.title"));
    }
    inner.tags.push(tag.clone());
    Ok(())
  }

  async fn find_tag_by_title(&self, title: &str) -> Result<Option<Tag>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.tags.iter().find(|t| t.title == title).cloned())
  }

  async fn list_tags(&self) -> Result<Vec<Tag>, MemoryError> {
    let mut tags = self.inner.lock().unwrap().tags.clone();
    tags.sort();
    Ok(tags)
  }

  async fn delete_tag(&self, id: Uuid) -> Result<(), MemoryError> {
    self.check_writable()?;
    self.inner.lock().unwrap().tags.retain(|t| t.tag_id != id);
    Ok(())
  }

  async fn save_zone(&self, zone: &Zone) -> Result<(), MemoryError> {
    self.check_writable()?;
    let mut inner = self.inner.lock().unwrap();
    if inner.zones.contains(zone) {
      return Err(MemoryError::Unique("zones.city_province"));
    }
    inner.zones.push(zone.clone());
    Ok(())
  }

  async fn find_zone_by_city_and_province(
    &self,
    city: &str,
    province: &str,
  ) -> Result<Option<Zone>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.zones.iter().find(|z| z.key() == (city, province)).cloned())
  }

  async fn list_zones(&self) -> Result<Vec<Zone>, MemoryError> {
    let mut zones = self.inner.lock().unwrap().zones.clone();
    zones.sort();
    Ok(zones)
  }

  async fn delete_zone(&self, id: Uuid) -> Result<(), MemoryError> {
    self.check_writable()?;
    self.inner.lock().unwrap().zones.retain(|z| z.zone_id != id);
    Ok(())
  }
}

/// Stores passwords as `{noop}<raw>`.
pub struct PlainEncoder;

impl PasswordEncoder for PlainEncoder {
  fn encode(&self, raw: &str) -> Result<String, PasswordEncoderError> {
    Ok(format!("{{noop}}{raw}"))
  }

  fn matches(&self, raw: &str, encoded: &str) -> bool {
    encoded.strip_prefix("{noop}") == Some(raw)
  }
}
