//! Error type for `kplan-llm`.
//!
//! These errors never leave the crate's fail-open tasks; they surface only
//! as the [`DegradeReason`](crate::DegradeReason) of a degraded outcome and
//! from direct [`CompletionClient`](crate::CompletionClient) calls.

use kplan_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("completion request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("completion service returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("completion service returned no content")]
  EmptyResponse,

  #[error("response is not the expected JSON document: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("response failed validation: {0}")]
  Validation(#[from] ValidationError),
}

impl Error {
  /// Whether the completion service itself failed, as opposed to answering
  /// with something unusable.
  pub fn is_external_service(&self) -> bool {
    matches!(
      self,
      Self::Transport(_) | Self::Status { .. } | Self::EmptyResponse
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
