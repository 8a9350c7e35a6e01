//! Enrichment jobs: one-shot units of work handed to the queue.
//!
//! A job carries everything needed to perform and persist one enrichment. It
//! has no identifier and is discarded after its single execution attempt.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
  AnalyzeItem(AnalyzeItem),
  /// A tag this build does not recognise. The queue drops these unexecuted.
  #[serde(other)]
  Unknown,
}

impl Job {
  pub fn analyze_item(item_id: Uuid, owner_id: Uuid, text: impl Into<String>) -> Self {
    Self::AnalyzeItem(AnalyzeItem {
      item_id,
      owner_id,
      text: text.into(),
    })
  }

  /// The wire tag, for logging.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::AnalyzeItem(_) => "analyze_item",
      Self::Unknown => "unknown",
    }
  }

  /// The item this job targets, if any.
  pub fn item_id(&self) -> Option<Uuid> {
    match self {
      Self::AnalyzeItem(j) => Some(j.item_id),
      Self::Unknown => None,
    }
  }
}

/// Enrich one item's text and write the result back, scoped to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeItem {
  pub item_id:  Uuid,
  pub owner_id: Uuid,
  pub text:     String,
}
