//! Store traits for items.
//!
//! [`EnrichmentSink`] is the narrow write the enrichment queue needs;
//! [`ItemStore`] adds the reads and workflow writes the API needs. Backends
//! (e.g. `kplan-store-sqlite`) implement both.

use std::future::Future;

use uuid::Uuid;

use crate::item::{EnrichmentUpdate, Item, ItemStatus, NewItem, UserTag};

/// Parameters for [`ItemStore::list_items`].
#[derive(Debug, Clone)]
pub struct ItemQuery {
  /// Only this owner's items are ever returned.
  pub owner_id: Uuid,
  pub status:   Option<ItemStatus>,
  pub user_tag: Option<UserTag>,
  /// Case-insensitive substring match over item text and enrichment summary.
  pub text:     Option<String>,
}

impl ItemQuery {
  pub fn for_owner(owner_id: Uuid) -> Self {
    Self {
      owner_id,
      status: None,
      user_tag: None,
      text: None,
    }
  }
}

/// Destination for finished enrichment attempts.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tokio tasks.
pub trait EnrichmentSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Overwrite an item's enrichment and status.
  ///
  /// Scoped to `(item_id, owner_id)` and idempotent. Must fail if no item
  /// with that id belongs to that owner.
  fn write_enrichment(
    &self,
    item_id: Uuid,
    owner_id: Uuid,
    update: EnrichmentUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Full item storage used by the HTTP layer.
pub trait ItemStore: EnrichmentSink {
  /// Persist a new `pending` item. `item_id` and `collected_at` are assigned
  /// by the store.
  fn create_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Retrieve an item by id, scoped to its owner. `None` if not found.
  fn get_item(
    &self,
    item_id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// List an owner's items, newest first.
  fn list_items<'a>(
    &'a self,
    query: &'a ItemQuery,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  /// Record the owner's tag and move the item to `tagged`. `None` if not
  /// found.
  fn tag_item(
    &self,
    item_id: Uuid,
    owner_id: Uuid,
    tag: UserTag,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// Move an item back to `pending` ahead of re-analysis. `None` if not
  /// found.
  fn mark_pending(
    &self,
    item_id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;
}
