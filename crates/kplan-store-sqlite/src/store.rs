//! [`SqliteStore`]: the SQLite implementation of [`ItemStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kplan_core::{
  EnrichmentUpdate, Item, ItemStatus, NewItem, UserTag,
  store::{EnrichmentSink, ItemQuery, ItemStore},
};

use crate::{
  Error, Result,
  encode::{ITEM_COLUMNS, RawItem, encode_dt, encode_enrichment, encode_uuid, like_pattern},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An item store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
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

  /// Open an in-memory store, for tests.
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

  /// Run an `UPDATE` scoped by `?1 = item_id` and `?2 = owner_id`, binding
  /// `values` from `?3` on. Returns the number of rows touched.
  async fn update_scoped(
    &self,
    sql: &'static str,
    item_id: Uuid,
    owner_id: Uuid,
    values: Vec<String>,
  ) -> Result<usize> {
    let mut params = vec![encode_uuid(item_id), encode_uuid(owner_id)];
    params.extend(values);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(sql, rusqlite::params_from_iter(params))?)
      })
      .await?;
    Ok(changed)
  }
}

// ─── EnrichmentSink impl ─────────────────────────────────────────────────────

impl EnrichmentSink for SqliteStore {
  type Error = Error;

  async fn write_enrichment(
    &self,
    item_id: Uuid,
    owner_id: Uuid,
    update: EnrichmentUpdate,
  ) -> Result<()> {
    let enrichment = encode_enrichment(&update.enrichment)?;
    let changed = self
      .update_scoped(
        "UPDATE items SET enrichment = ?3, status = ?4
         WHERE item_id = ?1 AND owner_id = ?2",
        item_id,
        owner_id,
        vec![enrichment, update.status.as_str().to_owned()],
      )
      .await?;

    if changed == 0 {
      return Err(Error::ItemNotFound(item_id));
    }
    Ok(())
  }
}

// ─── ItemStore impl ──────────────────────────────────────────────────────────

impl ItemStore for SqliteStore {
  async fn create_item(&self, input: NewItem) -> Result<Item> {
    let item = Item {
      item_id:      Uuid::new_v4(),
      owner_id:     input.owner_id,
      text:         input.text,
      url:          input.url,
      status:       ItemStatus::Pending,
      user_tag:     None,
      enrichment:   None,
      // Stored at microsecond precision.
      collected_at: Utc::now().trunc_subsecs(6),
    };

    let item_id_str  = encode_uuid(item.item_id);
    let owner_id_str = encode_uuid(item.owner_id);
    let text         = item.text.clone();
    let url          = item.url.clone();
    let status       = item.status.as_str();
    let at_str       = encode_dt(item.collected_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (item_id, owner_id, text, url, status, collected_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![item_id_str, owner_id_str, text, url, status, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn get_item(&self, item_id: Uuid, owner_id: Uuid) -> Result<Option<Item>> {
    let item_id_str  = encode_uuid(item_id);
    let owner_id_str = encode_uuid(owner_id);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1 AND owner_id = ?2"),
            rusqlite::params![item_id_str, owner_id_str],
            RawItem::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
    let owner_id_str = encode_uuid(query.owner_id);
    let status       = query.status.map(|s| s.as_str());
    let user_tag     = query.user_tag.map(|t| t.as_str());
    let pattern      = query.text.as_deref().map(like_pattern);

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE owner_id = ?1
             AND (?2 IS NULL OR status = ?2)
             AND (?3 IS NULL OR user_tag = ?3)
             AND (?4 IS NULL
                  OR text LIKE ?4 ESCAPE '\\'
                  OR json_extract(enrichment, '$.summary') LIKE ?4 ESCAPE '\\')
           ORDER BY collected_at DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_id_str, status, user_tag, pattern],
            RawItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn tag_item(
    &self,
    item_id: Uuid,
    owner_id: Uuid,
    tag: UserTag,
  ) -> Result<Option<Item>> {
    let changed = self
      .update_scoped(
        "UPDATE items SET user_tag = ?3, status = ?4
         WHERE item_id = ?1 AND owner_id = ?2",
        item_id,
        owner_id,
        vec![
          tag.as_str().to_owned(),
          ItemStatus::Tagged.as_str().to_owned(),
        ],
      )
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_item(item_id, owner_id).await
  }

  async fn mark_pending(&self, item_id: Uuid, owner_id: Uuid) -> Result<Option<Item>> {
    let changed = self
      .update_scoped(
        "UPDATE items SET status = ?3 WHERE item_id = ?1 AND owner_id = ?2",
        item_id,
        owner_id,
        vec![ItemStatus::Pending.as_str().to_owned()],
      )
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_item(item_id, owner_id).await
  }
}
