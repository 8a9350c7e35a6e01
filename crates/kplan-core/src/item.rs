//! Items: the short texts the pipeline enriches.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, enrichment::EnrichmentRecord};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where an item is in its review workflow.
///
/// The enrichment pipeline only ever moves an item from `Pending` to
/// `ReadyForReview`. Tagging and re-analysis are driven by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
  #[default]
  Pending,
  ReadyForReview,
  Tagged,
}

impl ItemStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::ReadyForReview => "ready_for_review",
      Self::Tagged => "tagged",
    }
  }
}

impl fmt::Display for ItemStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ItemStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "ready_for_review" => Ok(Self::ReadyForReview),
      "tagged" => Ok(Self::Tagged),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

/// What the owner intends to do with an item once reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTag {
  Learn,
  Repurpose,
}

impl UserTag {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Learn => "learn",
      Self::Repurpose => "repurpose",
    }
  }
}

impl FromStr for UserTag {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "learn" => Ok(Self::Learn),
      "repurpose" => Ok(Self::Repurpose),
      other => Err(Error::UnknownUserTag(other.to_owned())),
    }
  }
}

// ─── Item ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub item_id:      Uuid,
  pub owner_id:     Uuid,
  /// Source content; never changes after creation.
  pub text:         String,
  pub url:          Option<String>,
  pub status:       ItemStatus,
  pub user_tag:     Option<UserTag>,
  /// `None` until the first enrichment attempt completes.
  pub enrichment:   Option<EnrichmentRecord>,
  pub collected_at: DateTime<Utc>,
}

/// Input to [`crate::store::ItemStore::create_item`].
#[derive(Debug, Clone)]
pub struct NewItem {
  pub owner_id: Uuid,
  pub text:     String,
  pub url:      Option<String>,
}

/// The point update written when an enrichment attempt finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentUpdate {
  pub enrichment: EnrichmentRecord,
  pub status:     ItemStatus,
}

impl EnrichmentUpdate {
  /// The update every attempt writes, degraded or not.
  pub fn ready_for_review(enrichment: EnrichmentRecord) -> Self {
    Self {
      enrichment,
      status: ItemStatus::ReadyForReview,
    }
  }
}
