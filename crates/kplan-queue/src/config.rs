//! Queue configuration, deserialised from the `[queue]` table of the server
//! config.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
  /// Maximum number of jobs executing at once.
  pub concurrency:        usize,
  /// Buffer limit for admitted-but-not-started jobs. `None` is unbounded.
  pub capacity:           Option<usize>,
  /// Run jobs for the same item one at a time instead of letting the later
  /// write win.
  pub serialize_per_item: bool,
}

impl Default for QueueConfig {
  fn default() -> Self {
    Self {
      concurrency:        5,
      capacity:           None,
      serialize_per_item: false,
    }
  }
}
