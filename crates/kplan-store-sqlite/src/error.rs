//! Error type for `kplan-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] kplan_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A scoped write matched no row: the item is missing or belongs to
  /// another owner.
  #[error("item not found: {0}")]
  ItemNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
