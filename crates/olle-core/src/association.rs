//! Association Manager: adding and removing an account's tags and zones.
//!
//! Add and remove are idempotent: adding a member twice or removing a
//! non-member succeeds and leaves the set as it was, without a store write.
//!
//! Reference entities are resolved before they reach the manager. A tag is
//! created on first mention ([`AssociationManager::resolve_or_create_tag`]);
//! a zone must already exist ([`AssociationManager::find_zone`]).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  account::Account,
  form::{TagForm, ZoneForm, check_tag_title},
  store::AccountStore,
  tag::Tag,
  zone::{Zone, ZoneName},
};

pub struct AssociationManager<S> {
  store: Arc<S>,
}

impl<S> Clone for AssociationManager<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S> AssociationManager<S>
where
  S: AccountStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  // ─── Tags ─────────────────────────────────────────────────────────────────

  /// Insert `tag` into `account.tags` and persist the set.
  pub async fn add_tag(&self, account: &mut Account, tag: Tag) -> Result<()> {
    if account.tags.contains(&tag) {
      debug!(account_id = %account.account_id, tag = %tag.title, "tag already present");
      return Ok(());
    }

    let mut updated = account.clone();
    let title = tag.title.clone();
    updated.tags.insert(tag);
    self.store.save_account_tags(&updated).await.map_err(Error::store)?;
    account.tags = updated.tags;

    info!(account_id = %account.account_id, tag = %title, "tag added");
    Ok(())
  }

  /// Remove `tag` from `account.tags` and persist the set.
  pub async fn remove_tag(&self, account: &mut Account, tag: &Tag) -> Result<()> {
    if !account.tags.contains(tag) {
      debug!(account_id = %account.account_id, tag = %tag.title, "tag not present");
      return Ok(());
    }

    let mut updated = account.clone();
    updated.tags.remove(tag);
    self.store.save_account_tags(&updated).await.map_err(Error::store)?;
    account.tags = updated.tags;

    info!(account_id = %account.account_id, tag = %tag.title, "tag removed");
    Ok(())
  }

  /// Look up a tag by its trimmed title, creating it if it does not exist
  /// yet. Blank or overlong titles are rejected before the store is touched.
  pub async fn resolve_or_create_tag(&self, title: &str) -> Result<Tag> {
    let title = check_tag_title(title)?;
    if let Some(tag) =
      self.store.find_tag_by_title(title).await.map_err(Error::store)?
    {
      return Ok(tag);
    }

    let tag = Tag::new(title);
    self.store.save_tag(&tag).await.map_err(Error::store)?;
    info!(tag = %tag.title, "tag created");
    Ok(tag)
  }

  /// Resolve-or-create the submitted tag, then add it.
  pub async fn add_tag_by_title(
    &self,
    account: &mut Account,
    form: &TagForm,
  ) -> Result<Tag> {
    let title = form.title()?;
    let tag = self.resolve_or_create_tag(title).await?;
    self.add_tag(account, tag.clone()).await?;
    Ok(tag)
  }

  /// Remove the submitted tag. An unknown title is a client error.
  pub async fn remove_tag_by_title(
    &self,
    account: &mut Account,
    form: &TagForm,
  ) -> Result<()> {
    let title = form.title()?;
    let tag = self
      .store
      .find_tag_by_title(title)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::TagNotFound(title.to_owned()))?;
    self.remove_tag(account, &tag).await
  }

  /// Every known tag title, for autocomplete.
  pub async fn tag_whitelist(&self) -> Result<Vec<String>> {
    let mut titles: Vec<String> = self
      .store
      .list_tags()
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|t| t.title)
      .collect();
    titles.sort();
    Ok(titles)
  }

  // ─── Zones ────────────────────────────────────────────────────────────────

  /// Insert `zone` into `account.zones` and persist the set.
  pub async fn add_zone(&self, account: &mut Account, zone: Zone) -> Result<()> {
    if account.zones.contains(&zone) {
      debug!(account_id = %account.account_id, %zone, "zone already present");
      return Ok(());
    }

    let mut updated = account.clone();
    let name = zone.to_string();
    updated.zones.insert(zone);
    self.store.save_account_zones(&updated).await.map_err(Error::store)?;
    account.zones = updated.zones;

    info!(account_id = %account.account_id, zone = %name, "zone added");
    Ok(())
  }

  /// Remove `zone` from `account.zones` and persist the set.
  pub async fn remove_zone(&self, account: &mut Account, zone: &Zone) -> Result<()> {
    if !account.zones.contains(zone) {
      debug!(account_id = %account.account_id, %zone, "zone not present");
      return Ok(());
    }

    let mut updated = account.clone();
    updated.zones.remove(zone);
    self.store.save_account_zones(&updated).await.map_err(Error::store)?;
    account.zones = updated.zones;

    info!(account_id = %account.account_id, %zone, "zone removed");
    Ok(())
  }

  /// Look up a pre-seeded zone by its natural key.
  pub async fn find_zone(&self, name: &ZoneName) -> Result<Zone> {
    self
      .store
      .find_zone_by_city_and_province(&name.city, &name.province)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::ZoneNotFound(name.to_string()))
  }

  pub async fn add_zone_by_name(
    &self,
    account: &mut Account,
    form: &ZoneForm,
  ) -> Result<Zone> {
    let zone = self.find_zone(&form.parse()?).await?;
    self.add_zone(account, zone.clone()).await?;
    Ok(zone)
  }

  pub async fn remove_zone_by_name(
    &self,
    account: &mut Account,
    form: &ZoneForm,
  ) -> Result<()> {
    let zone = self.find_zone(&form.parse()?).await?;
    self.remove_zone(account, &zone).await
  }

  /// Every known zone's display name, for autocomplete.
  pub async fn zone_whitelist(&self) -> Result<Vec<String>> {
    let mut names: Vec<String> = self
      .store
      .list_zones()
      .await
      .map_err(Error::store)?
      .iter()
      .map(Zone::to_string)
      .collect();
    names.sort();
    Ok(names)
  }

  /// Load zone reference data from `city,localName,province` lines.
  ///
  /// Only runs against an empty zone table; returns how many zones were
  /// inserted. Unparseable lines are skipped.
  pub async fn seed_zones<'a, I>(&self, lines: I) -> Result<usize>
  where
    I: IntoIterator<Item = &'a str>,
  {
    if !self.store.list_zones().await.map_err(Error::store)?.is_empty() {
      debug!("zones already seeded");
      return Ok(0);
    }

    let mut inserted = 0;
    for line in lines {
      let Some(zone) = Zone::from_csv_line(line) else {
        if !line.trim().is_empty() {
          warn!(line, "skipping malformed zone line");
        }
        continue;
      };
      self.store.save_zone(&zone).await.map_err(Error::store)?;
      inserted += 1;
    }

    info!(inserted, "zones seeded");
    Ok(inserted)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{form::TAG_TITLE_MAX_LEN, testing::MemoryStore, validate::ErrorCode};

  async fn setup() -> (Arc<MemoryStore>, AssociationManager<MemoryStore>, Account, Zone)
  {
    let store = Arc::new(MemoryStore::default());
    let keesun = Account::new("keesun", "keesun@example.com", "pw");
    store.save_account(&keesun).await.unwrap();
    let zone = Zone::new("test", "테스트시", "테스트주");
    store.save_zone(&zone).await.unwrap();
    (store.clone(), AssociationManager::new(store), keesun, zone)
  }

  #[tokio::test]
  async fn add_then_remove_tag() {
    let (store, manager, mut keesun, _) = setup().await;

    manager
      .add_tag_by_title(&mut keesun, &TagForm::new("newTag"))
      .await
      .unwrap();
    assert_eq!(keesun.tag_titles(), vec!["newTag".to_owned()]);

    let stored = store.find_account_by_nickname("keesun").await.unwrap().unwrap();
    let new_tag = store.find_tag_by_title("newTag").await.unwrap().unwrap();
    assert!(stored.tags.contains(&new_tag));

    manager
      .remove_tag_by_title(&mut keesun, &TagForm::new("newTag"))
      .await
      .unwrap();
    assert!(keesun.tags.is_empty());
    let stored = store.find_account_by_nickname("keesun").await.unwrap().unwrap();
    assert!(stored.tags.is_empty());
  }

  #[tokio::test]
  async fn add_tag_twice_keeps_one() {
    let (store, manager, mut keesun, _) = setup().await;
    let tag = manager.resolve_or_create_tag("rust").await.unwrap();

    manager.add_tag(&mut keesun, tag.clone()).await.unwrap();
    let writes = store.association_writes();
    manager.add_tag(&mut keesun, tag.clone()).await.unwrap();

    assert_eq!(keesun.tags.len(), 1);
    assert_eq!(store.association_writes(), writes);
  }

  #[tokio::test]
  async fn remove_absent_tag_is_noop() {
    let (store, manager, mut keesun, _) = setup().await;
    let kept = manager.resolve_or_create_tag("kept").await.unwrap();
    manager.add_tag(&mut keesun, kept).await.unwrap();
    let before = keesun.tags.clone();
    let writes = store.association_writes();

    manager.remove_tag(&mut keesun, &Tag::new("absent")).await.unwrap();

    assert_eq!(keesun.tags, before);
    assert_eq!(store.association_writes(), writes);
  }

  #[tokio::test]
  async fn resolve_or_create_reuses_existing() {
    let (_, manager, _, _) = setup().await;
    let first = manager.resolve_or_create_tag("spring").await.unwrap();
    let second = manager.resolve_or_create_tag("spring").await.unwrap();
    assert_eq!(first.tag_id, second.tag_id);
    assert_eq!(manager.tag_whitelist().await.unwrap(), vec!["spring".to_owned()]);
  }

  #[tokio::test]
  async fn created_tags_are_trimmed_and_checked() {
    let (_, manager, _, _) = setup().await;

    let tag = manager.resolve_or_create_tag("  spring ").await.unwrap();
    assert_eq!(tag.title, "spring");
    let again = manager.resolve_or_create_tag("spring").await.unwrap();
    assert_eq!(again.tag_id, tag.tag_id);

    let too_long = "x".repeat(TAG_TITLE_MAX_LEN + 1);
    for bad in ["", "   ", too_long.as_str()] {
      let err = manager.resolve_or_create_tag(bad).await.unwrap_err();
      assert!(err.validation_errors().unwrap().field("tag_title").is_some(), "{bad:?}");
    }
    assert_eq!(manager.tag_whitelist().await.unwrap(), vec!["spring".to_owned()]);
  }

  #[tokio::test]
  async fn removing_unknown_title_is_not_found() {
    let (_, manager, mut keesun, _) = setup().await;
    let err = manager
      .remove_tag_by_title(&mut keesun, &TagForm::new("ghost"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::TagNotFound(t) if t == "ghost"));
  }

  #[tokio::test]
  async fn blank_tag_title_is_rejected() {
    let (_, manager, mut keesun, _) = setup().await;
    let err = manager
      .add_tag_by_title(&mut keesun, &TagForm::new("  "))
      .await
      .unwrap_err();
    assert_eq!(
      err.validation_errors().unwrap().field("tag_title").unwrap().code,
      ErrorCode::Blank
    );
    assert!(keesun.tags.is_empty());
  }

  #[tokio::test]
  async fn add_then_remove_zone() {
    let (store, manager, mut keesun, zone) = setup().await;
    let form = ZoneForm::new(zone.to_string());

    manager.add_zone_by_name(&mut keesun, &form).await.unwrap();
    assert!(keesun.zones.contains(&zone));
    let stored = store.find_account_by_nickname("keesun").await.unwrap().unwrap();
    assert!(stored.zones.contains(&zone));

    manager.remove_zone_by_name(&mut keesun, &form).await.unwrap();
    assert!(!keesun.zones.contains(&zone));
  }

  #[tokio::test]
  async fn add_zone_twice_keeps_one() {
    let (_, manager, mut keesun, zone) = setup().await;
    manager.add_zone(&mut keesun, zone.clone()).await.unwrap();
    manager.add_zone(&mut keesun, zone).await.unwrap();
    assert_eq!(keesun.zones.len(), 1);
  }

  #[tokio::test]
  async fn unknown_zone_is_not_found() {
    let (_, manager, mut keesun, _) = setup().await;
    let err = manager
      .add_zone_by_name(&mut keesun, &ZoneForm::new("Nowhere(없음)/Void"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::ZoneNotFound(_)));
    assert!(keesun.zones.is_empty());
  }

  #[tokio::test]
  async fn malformed_zone_name_is_validation_error() {
    let (_, manager, mut keesun, _) = setup().await;
    let err = manager
      .add_zone_by_name(&mut keesun, &ZoneForm::new("not a zone"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[tokio::test]
  async fn failed_association_write_leaves_set_untouched() {
    let (store, manager, mut keesun, zone) = setup().await;
    store.fail_writes(true);
    let err = manager.add_zone(&mut keesun, zone).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(keesun.zones.is_empty());
  }

  #[tokio::test]
  async fn seeding_only_fills_an_empty_table() {
    let store = Arc::new(MemoryStore::default());
    let manager = AssociationManager::new(store);
    let csv = "Andong,안동시,Gyeongsangbuk-do\nbroken line\n\nAnsan,안산시,Gyeonggi-do\n";

    assert_eq!(manager.seed_zones(csv.lines()).await.unwrap(), 2);
    assert_eq!(manager.seed_zones(csv.lines()).await.unwrap(), 0);
    assert_eq!(
      manager.zone_whitelist().await.unwrap(),
      vec![
        "Andong(안동시)/Gyeongsangbuk-do".to_owned(),
        "Ansan(안산시)/Gyeonggi-do".to_owned(),
      ]
    );
  }
}
