//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings so they sort lexically.
//! Enrichment records are stored as compact JSON. UUIDs are hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use kplan_core::{EnrichmentRecord, Item, ItemStatus, UserTag};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

pub fn encode_enrichment(record: &EnrichmentRecord) -> Result<String> {
  Ok(serde_json::to_string(record)?)
}

pub fn decode_enrichment(s: &str) -> Result<EnrichmentRecord> {
  Ok(serde_json::from_str(s)?)
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// A `LIKE` pattern matching `text` anywhere, with `%`, `_` and `\` in the
/// input taken literally (use with `ESCAPE '\'`).
pub fn like_pattern(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + 2);
  escaped.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ITEM_COLUMNS: &str =
  "item_id, owner_id, text, url, status, user_tag, enrichment, collected_at";

/// Raw strings read directly from an `items` row.
pub struct RawItem {
  pub item_id:      String,
  pub owner_id:     String,
  pub text:         String,
  pub url:          Option<String>,
  pub status:       String,
  pub user_tag:     Option<String>,
  pub enrichment:   Option<String>,
  pub collected_at: String,
}

impl RawItem {
  /// Read a row selected with [`ITEM_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:      row.get(0)?,
      owner_id:     row.get(1)?,
      text:         row.get(2)?,
      url:          row.get(3)?,
      status:       row.get(4)?,
      user_tag:     row.get(5)?,
      enrichment:   row.get(6)?,
      collected_at: row.get(7)?,
    })
  }

  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      item_id:      decode_uuid(&self.item_id)?,
      owner_id:     decode_uuid(&self.owner_id)?,
      text:         self.text,
      url:          self.url,
      status:       self.status.parse::<ItemStatus>()?,
      user_tag:     self
        .user_tag
        .as_deref()
        .map(str::parse::<UserTag>)
        .transpose()?,
      enrichment:   self
        .enrichment
        .as_deref()
        .map(decode_enrichment)
        .transpose()?,
      collected_at: decode_dt(&self.collected_at)?,
    })
  }
}
