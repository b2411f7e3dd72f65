//! Settings Update Service: profile, nickname, password and notification
//! changes.
//!
//! Every operation follows the same two phases: validate the submitted form,
//! then apply it to a copy of the account and persist that copy. The
//! caller's account is only replaced once the store has accepted the write,
//! so a rejected form or a failed write leaves it exactly as it was.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  account::{Account, Notifications},
  form::{NicknameForm, PasswordForm, ProfileForm},
  password::PasswordEncoder,
  store::AccountStore,
  validate::validate_nickname,
};

pub struct SettingsService<S, E> {
  store:   Arc<S>,
  encoder: Arc<E>,
}

impl<S, E> Clone for SettingsService<S, E> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), encoder: self.encoder.clone() }
  }
}

impl<S, E> SettingsService<S, E>
where
  S: AccountStore,
  E: PasswordEncoder,
{
  pub fn new(store: Arc<S>, encoder: Arc<E>) -> Self { Self { store, encoder } }

  /// Overwrite the profile fields. Blank values clear the field.
  pub async fn update_profile(
    &self,
    account: &mut Account,
    form: ProfileForm,
  ) -> Result<()> {
    let errors = form.validate();
    if !errors.is_empty() {
      warn!(account_id = %account.account_id, %errors, "profile update rejected");
      return Err(Error::Validation(errors));
    }

    let mut updated = account.clone();
    form.apply_to(&mut updated);
    self.commit(account, updated).await?;

    info!(account_id = %account.account_id, "profile updated");
    Ok(())
  }

  /// Change the nickname after checking it is well-formed and unused.
  ///
  /// Submitting the current nickname succeeds without a write.
  pub async fn update_nickname(
    &self,
    account: &mut Account,
    form: NicknameForm,
  ) -> Result<()> {
    if let Err(e) =
      validate_nickname(&*self.store, &form.nickname, Some(account.account_id))
        .await
    {
      warn!(account_id = %account.account_id, error = %e, "nickname update rejected");
      return Err(e);
    }

    if form.nickname == account.nickname {
      debug!(account_id = %account.account_id, "nickname unchanged");
      return Ok(());
    }

    let mut updated = account.clone();
    let previous = std::mem::replace(&mut updated.nickname, form.nickname);
    self.commit(account, updated).await?;

    info!(
      account_id = %account.account_id,
      from = %previous,
      to = %account.nickname,
      "nickname updated"
    );
    Ok(())
  }

  /// Replace the credential with the encoding of the new password.
  pub async fn update_password(
    &self,
    account: &mut Account,
    form: PasswordForm,
  ) -> Result<()> {
    let errors = form.validate();
    if !errors.is_empty() {
      warn!(account_id = %account.account_id, %errors, "password update rejected");
      return Err(Error::Validation(errors));
    }

    let mut updated = account.clone();
    updated.password = self.encoder.encode(&form.new_password)?;
    self.commit(account, updated).await?;

    info!(account_id = %account.account_id, "password updated");
    Ok(())
  }

  /// Copy all six notification flags. Booleans need no validation.
  pub async fn update_notifications(
    &self,
    account: &mut Account,
    notifications: Notifications,
  ) -> Result<()> {
    let mut updated = account.clone();
    updated.apply_notifications(&notifications);
    self.commit(account, updated).await?;

    info!(account_id = %account.account_id, "notifications updated");
    Ok(())
  }

  async fn commit(&self, account: &mut Account, updated: Account) -> Result<()> {
    self.store.save_account(&updated).await.map_err(Error::store)?;
    *account = updated;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    form::BIO_MAX_LEN,
    testing::{MemoryStore, PlainEncoder},
    validate::ErrorCode,
  };

  async fn setup() -> (Arc<MemoryStore>, SettingsService<MemoryStore, PlainEncoder>, Account)
  {
    let store = Arc::new(MemoryStore::default());
    let keesun = Account::new("keesun", "keesun@example.com", "{noop}12345678");
    store.save_account(&keesun).await.unwrap();
    let service = SettingsService::new(store.clone(), Arc::new(PlainEncoder));
    (store, service, keesun)
  }

  #[tokio::test]
  async fn profile_update_persists() {
    let (store, service, mut keesun) = setup().await;
    let bio = "짧은 소개를 수정하는 경우";

    let form = ProfileForm { bio: Some(bio.into()), ..Default::default() };
    service.update_profile(&mut keesun, form).await.unwrap();

    assert_eq!(keesun.bio.as_deref(), Some(bio));
    let stored = store.find_account_by_nickname("keesun").await.unwrap().unwrap();
    assert_eq!(stored.bio.as_deref(), Some(bio));
  }

  #[tokio::test]
  async fn overlong_bio_is_rejected_without_mutation() {
    let (store, service, mut keesun) = setup().await;

    let form = ProfileForm {
      bio: Some("x".repeat(BIO_MAX_LEN + 1)),
      ..Default::default()
    };
    let err = service.update_profile(&mut keesun, form).await.unwrap_err();

    assert_eq!(
      err.validation_errors().unwrap().field("bio").unwrap().code,
      ErrorCode::TooLong
    );
    assert!(keesun.bio.is_none());
    let stored = store.find_account_by_nickname("keesun").await.unwrap().unwrap();
    assert!(stored.bio.is_none());
  }

  #[tokio::test]
  async fn nickname_change_moves_lookup() {
    let (store, service, mut keesun) = setup().await;

    service
      .update_nickname(&mut keesun, NicknameForm::new("whiteship"))
      .await
      .unwrap();

    assert_eq!(keesun.nickname, "whiteship");
    let found = store.find_account_by_nickname("whiteship").await.unwrap();
    assert_eq!(found.unwrap().account_id, keesun.account_id);
    assert!(store.find_account_by_nickname("keesun").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn duplicate_nickname_is_rejected_without_mutation() {
    let (store, service, mut keesun) = setup().await;
    let other = Account::new("whiteship", "ws@example.com", "pw");
    store.save_account(&other).await.unwrap();

    let err = service
      .update_nickname(&mut keesun, NicknameForm::new("whiteship"))
      .await
      .unwrap_err();

    assert_eq!(
      err.validation_errors().unwrap().field("nickname").unwrap().code,
      ErrorCode::DuplicateValue
    );
    assert_eq!(keesun.nickname, "keesun");
  }

  #[tokio::test]
  async fn resubmitting_own_nickname_is_a_noop() {
    let (store, service, mut keesun) = setup().await;
    let writes = store.account_writes();

    service
      .update_nickname(&mut keesun, NicknameForm::new("keesun"))
      .await
      .unwrap();

    assert_eq!(store.account_writes(), writes);
  }

  #[tokio::test]
  async fn password_is_encoded() {
    let (store, service, mut keesun) = setup().await;

    service
      .update_password(&mut keesun, PasswordForm::new("new-password", "new-password"))
      .await
      .unwrap();

    assert_eq!(keesun.password, "{noop}new-password");
    let stored = store.get_account(keesun.account_id).await.unwrap().unwrap();
    assert!(PlainEncoder.matches("new-password", &stored.password));
  }

  #[tokio::test]
  async fn mismatched_password_is_rejected() {
    let (_, service, mut keesun) = setup().await;
    let before = keesun.password.clone();

    let err = service
      .update_password(&mut keesun, PasswordForm::new("new-password", "other-password"))
      .await
      .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(keesun.password, before);
  }

  #[tokio::test]
  async fn notifications_round_trip() {
    let (store, service, mut keesun) = setup().await;
    let before = keesun.clone();

    let snapshot = Notifications::from(&keesun);
    service.update_notifications(&mut keesun, snapshot).await.unwrap();
    assert_eq!(keesun, before);

    let flipped = Notifications {
      study_create_by_email: true,
      study_update_by_web: false,
      ..snapshot
    };
    service.update_notifications(&mut keesun, flipped).await.unwrap();
    let stored = store.get_account(keesun.account_id).await.unwrap().unwrap();
    assert_eq!(Notifications::from(&stored), flipped);
  }

  #[tokio::test]
  async fn failed_write_leaves_account_untouched() {
    let (store, service, mut keesun) = setup().await;
    store.fail_writes(true);

    let form = ProfileForm { bio: Some("hello".into()), ..Default::default() };
    let err = service.update_profile(&mut keesun, form).await.unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert!(keesun.bio.is_none());
  }
}
