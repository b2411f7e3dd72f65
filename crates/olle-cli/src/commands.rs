//! Command handlers. Each one loads a fresh account snapshot, runs one core
//! operation and returns what the caller should print.

use std::sync::Arc;

use anyhow::Context as _;
use olle_core::{
  Error,
  account::{Account, Notifications},
  association::AssociationManager,
  form::{NicknameForm, PasswordForm, ProfileForm, TagForm, ZoneForm},
  password::PasswordEncoder,
  settings::SettingsService,
  store::AccountStore,
  validate::{ErrorCode, ValidationErrors, validate_nickname},
};
use tracing::info;

/// Optional overrides for the six notification flags; `None` keeps the
/// account's current value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotificationFlags {
  pub study_create_by_email:            Option<bool>,
  pub study_create_by_web:              Option<bool>,
  pub study_enrollment_result_by_email: Option<bool>,
  pub study_enrollment_result_by_web:   Option<bool>,
  pub study_update_by_email:            Option<bool>,
  pub study_update_by_web:              Option<bool>,
}

impl NotificationFlags {
  fn apply(self, mut n: Notifications) -> Notifications {
    let set = |slot: &mut bool, v: Option<bool>| {
      if let Some(v) = v {
        *slot = v;
      }
    };
    set(&mut n.study_create_by_email, self.study_create_by_email);
    set(&mut n.study_create_by_web, self.study_create_by_web);
    set(
      &mut n.study_enrollment_result_by_email,
      self.study_enrollment_result_by_email,
    );
    set(
      &mut n.study_enrollment_result_by_web,
      self.study_enrollment_result_by_web,
    );
    set(&mut n.study_update_by_email, self.study_update_by_email);
    set(&mut n.study_update_by_web, self.study_update_by_web);
    n
  }
}

/// Profile fields given on the command line; `None` keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct ProfileOverrides {
  pub bio:           Option<String>,
  pub url:           Option<String>,
  pub occupation:    Option<String>,
  pub location:      Option<String>,
  pub profile_image: Option<String>,
}

impl ProfileOverrides {
  fn apply(self, mut form: ProfileForm) -> ProfileForm {
    form.bio = self.bio.or(form.bio);
    form.url = self.url.or(form.url);
    form.occupation = self.occupation.or(form.occupation);
    form.location = self.location.or(form.location);
    form.profile_image = self.profile_image.or(form.profile_image);
    form
  }
}

pub struct App<S, E> {
  store:        Arc<S>,
  encoder:      Arc<E>,
  settings:     SettingsService<S, E>,
  associations: AssociationManager<S>,
}

impl<S, E> App<S, E>
where
  S: AccountStore,
  E: PasswordEncoder,
{
  pub fn new(store: Arc<S>, encoder: Arc<E>) -> Self {
    Self {
      settings: SettingsService::new(store.clone(), encoder.clone()),
      associations: AssociationManager::new(store.clone()),
      store,
      encoder,
    }
  }

  async fn load(&self, nickname: &str) -> anyhow::Result<Account> {
    self
      .store
      .find_account_by_nickname(nickname)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::AccountNotFound(nickname.to_owned()).into())
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// Register an account. Registration itself is not a settings operation;
  /// this exists so a fresh database can be populated.
  pub async fn create_account(
    &self,
    nickname: &str,
    email: &str,
    password: &str,
  ) -> anyhow::Result<Account> {
    validate_nickname(&*self.store, nickname, None).await?;
    PasswordForm::new(password, password).validate().into_result()?;

    if self
      .store
      .find_account_by_email(email)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(
        Error::from(ValidationErrors::single(
          "email",
          ErrorCode::DuplicateValue,
          "that email is already registered",
        ))
        .into(),
      );
    }

    let encoded = self.encoder.encode(password).map_err(Error::from)?;
    let account = Account::new(nickname, email, encoded);
    self.store.save_account(&account).await.map_err(Error::store)?;
    info!(account_id = %account.account_id, nickname, "account created");
    Ok(account)
  }

  pub async fn show_account(&self, nickname: &str) -> anyhow::Result<Account> {
    self.load(nickname).await
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  pub async fn update_profile(
    &self,
    nickname: &str,
    overrides: ProfileOverrides,
  ) -> anyhow::Result<Account> {
    let mut account = self.load(nickname).await?;
    let form = overrides.apply(ProfileForm::from(&account));
    self.settings.update_profile(&mut account, form).await?;
    Ok(account)
  }

  pub async fn update_nickname(
    &self,
    nickname: &str,
    new_nickname: &str,
  ) -> anyhow::Result<Account> {
    let mut account = self.load(nickname).await?;
    self
      .settings
      .update_nickname(&mut account, NicknameForm::new(new_nickname))
      .await?;
    Ok(account)
  }

  pub async fn update_password(
    &self,
    nickname: &str,
    new_password: &str,
    confirm: &str,
  ) -> anyhow::Result<()> {
    let mut account = self.load(nickname).await?;
    self
      .settings
      .update_password(&mut account, PasswordForm::new(new_password, confirm))
      .await?;
    Ok(())
  }

  pub async fn update_notifications(
    &self,
    nickname: &str,
    flags: NotificationFlags,
  ) -> anyhow::Result<Notifications> {
    let mut account = self.load(nickname).await?;
    let snapshot = flags.apply(Notifications::from(&account));
    self.settings.update_notifications(&mut account, snapshot).await?;
    Ok(Notifications::from(&account))
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  pub async fn add_tag(&self, nickname: &str, title: &str) -> anyhow::Result<Vec<String>> {
    let mut account = self.load(nickname).await?;
    self
      .associations
      .add_tag_by_title(&mut account, &TagForm::new(title))
      .await?;
    Ok(account.tag_titles())
  }

  pub async fn remove_tag(&self, nickname: &str, title: &str) -> anyhow::Result<Vec<String>> {
    let mut account = self.load(nickname).await?;
    self
      .associations
      .remove_tag_by_title(&mut account, &TagForm::new(title))
      .await?;
    Ok(account.tag_titles())
  }

  pub async fn tag_whitelist(&self) -> anyhow::Result<Vec<String>> {
    Ok(self.associations.tag_whitelist().await?)
  }

  // ── Zones ─────────────────────────────────────────────────────────────────

  pub async fn add_zone(&self, nickname: &str, zone_name: &str) -> anyhow::Result<Vec<String>> {
    let mut account = self.load(nickname).await?;
    self
      .associations
      .add_zone_by_name(&mut account, &ZoneForm::new(zone_name))
      .await?;
    Ok(account.zone_names())
  }

  pub async fn remove_zone(
    &self,
    nickname: &str,
    zone_name: &str,
  ) -> anyhow::Result<Vec<String>> {
    let mut account = self.load(nickname).await?;
    self
      .associations
      .remove_zone_by_name(&mut account, &ZoneForm::new(zone_name))
      .await?;
    Ok(account.zone_names())
  }

  pub async fn zone_whitelist(&self) -> anyhow::Result<Vec<String>> {
    Ok(self.associations.zone_whitelist().await?)
  }

  pub async fn seed_zones(&self, csv: &str) -> anyhow::Result<usize> {
    self
      .associations
      .seed_zones(csv.lines())
      .await
      .context("failed to seed zones")
  }
}
