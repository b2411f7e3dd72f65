//! [`SqliteStore`]: the SQLite implementation of [`AccountStore`].

use std::path::Path;

use olle_core::{account::Account, store::AccountStore, tag::Tag, zone::Zone};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    ACCOUNT_COLUMNS, RawAccount, RawTag, RawZone, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An account settings store backed by a single SQLite file.
///
/// Cloning shares the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load one account by an exact match on `column`.
  async fn load_account_by(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| Ok(load_account(conn, column, &value)?))
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

/// Read an account row and both of its association sets.
fn load_account(
  conn: &rusqlite::Connection,
  column: &'static str,
  value: &str,
) -> rusqlite::Result<Option<RawAccount>> {
  let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1");
  let Some(mut raw) = conn
    .query_row(&sql, rusqlite::params![value], RawAccount::from_row)
    .optional()?
  else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT t.tag_id, t.title
     FROM account_tags a
     JOIN tags t ON t.tag_id = a.tag_id
     WHERE a.account_id = ?1",
  )?;
  raw.tags = stmt
    .query_map(rusqlite::params![raw.account_id], RawTag::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT z.zone_id, z.city, z.local_name_of_city, z.province
     FROM account_zones a
     JOIN zones z ON z.zone_id = a.zone_id
     WHERE a.account_id = ?1",
  )?;
  raw.zones = stmt
    .query_map(rusqlite::params![raw.account_id], RawZone::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(raw))
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn save_account(&self, account: &Account) -> Result<()> {
    let id_str        = encode_uuid(account.account_id);
    let joined_at_str = encode_dt(account.joined_at);
    let a             = account.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             account_id, nickname, email, password, joined_at,
             bio, url, occupation, location, profile_image,
             study_create_by_email, study_create_by_web,
             study_enrollment_result_by_email, study_enrollment_result_by_web,
             study_update_by_email, study_update_by_web
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
           ON CONFLICT (account_id) DO UPDATE SET
             nickname                         = excluded.nickname,
             email                            = excluded.email,
             password                         = excluded.password,
             bio                              = excluded.bio,
             url                              = excluded.url,
             occupation                       = excluded.occupation,
             location                         = excluded.location,
             profile_image                    = excluded.profile_image,
             study_create_by_email            = excluded.study_create_by_email,
             study_create_by_web              = excluded.study_create_by_web,
             study_enrollment_result_by_email = excluded.study_enrollment_result_by_email,
             study_enrollment_result_by_web   = excluded.study_enrollment_result_by_web,
             study_update_by_email            = excluded.study_update_by_email,
             study_update_by_web              = excluded.study_update_by_web",
          rusqlite::params![
            id_str,
            a.nickname,
            a.email,
            a.password,
            joined_at_str,
            a.bio,
            a.url,
            a.occupation,
            a.location,
            a.profile_image,
            a.study_create_by_email,
            a.study_create_by_web,
            a.study_enrollment_result_by_email,
            a.study_enrollment_result_by_web,
            a.study_update_by_email,
            a.study_update_by_web,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_db)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    self.load_account_by("account_id", encode_uuid(id)).await
  }

  async fn find_account_by_nickname(&self, nickname: &str) -> Result<Option<Account>> {
    self.load_account_by("nickname", nickname.to_owned()).await
  }

  async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    self.load_account_by("email", email.to_owned()).await
  }

  async fn save_account_tags(&self, account: &Account) -> Result<()> {
    let id_str = encode_uuid(account.account_id);
    let titles: Vec<String> = account.tags.iter().map(|t| t.title.clone()).collect();

    // Rows are resolved by title so a tag value built elsewhere still maps
    // onto the stored row.
    let missing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM account_tags WHERE account_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO account_tags (account_id, tag_id)
             SELECT ?1, tag_id FROM tags WHERE title = ?2",
          )?;
          for title in titles {
            if stmt.execute(rusqlite::params![id_str, title])? == 0 {
              return Ok(Some(title));
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await
      .map_err(Error::from_db)?;

    match missing {
      Some(title) => Err(Error::UnknownTag(title)),
      None => Ok(()),
    }
  }

  async fn save_account_zones(&self, account: &Account) -> Result<()> {
    let id_str = encode_uuid(account.account_id);
    let keys: Vec<(String, String, String)> = account
      .zones
      .iter()
      .map(|z| (z.city.clone(), z.province.clone(), z.to_string()))
      .collect();

    let missing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM account_zones WHERE account_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO account_zones (account_id, zone_id)
             SELECT ?1, zone_id FROM zones WHERE city = ?2 AND province = ?3",
          )?;
          for (city, province, display) in keys {
            if stmt.execute(rusqlite::params![id_str, city, province])? == 0 {
              return Ok(Some(display));
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await
      .map_err(Error::from_db)?;

    match missing {
      Some(zone) => Err(Error::UnknownZone(zone)),
      None => Ok(()),
    }
  }

  async fn delete_account(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM accounts WHERE account_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_db)
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn save_tag(&self, tag: &Tag) -> Result<()> {
    let id_str = encode_uuid(tag.tag_id);
    let title  = tag.title.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tags (tag_id, title) VALUES (?1, ?2)",
          rusqlite::params![id_str, title],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_db)
  }

  async fn find_tag_by_title(&self, title: &str) -> Result<Option<Tag>> {
    let title = title.to_owned();

    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tag_id, title FROM tags WHERE title = ?1",
              rusqlite::params![title],
              RawTag::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTag::into_tag).transpose()
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    let raws: Vec<RawTag> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT tag_id, title FROM tags ORDER BY title")?;
        let rows = stmt
          .query_map([], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn delete_tag(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM tags WHERE tag_id = ?1", rusqlite::params![id_str])?;
        Ok(())
      })
      .await
      .map_err(Error::from_db)
  }

  // ── Zones ─────────────────────────────────────────────────────────────────

  async fn save_zone(&self, zone: &Zone) -> Result<()> {
    let id_str = encode_uuid(zone.zone_id);
    let z      = zone.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO zones (zone_id, city, local_name_of_city, province)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, z.city, z.local_name_of_city, z.province],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_db)
  }

  async fn find_zone_by_city_and_province(
    &self,
    city: &str,
    province: &str,
  ) -> Result<Option<Zone>> {
    let city     = city.to_owned();
    let province = province.to_owned();

    let raw: Option<RawZone> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT zone_id, city, local_name_of_city, province
               FROM zones WHERE city = ?1 AND province = ?2",
              rusqlite::params![city, province],
              RawZone::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawZone::into_zone).transpose()
  }

  async fn list_zones(&self) -> Result<Vec<Zone>> {
    let raws: Vec<RawZone> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT zone_id, city, local_name_of_city, province
           FROM zones ORDER BY city, province",
        )?;
        let rows = stmt
          .query_map([], RawZone::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawZone::into_zone).collect()
  }

  async fn delete_zone(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM zones WHERE zone_id = ?1", rusqlite::params![id_str])?;
        Ok(())
      })
      .await
      .map_err(Error::from_db)
  }
}
