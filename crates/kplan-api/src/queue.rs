//! Handler for `GET /queue`.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{ApiState, owner::Owner};

#[derive(Debug, Serialize)]
pub struct QueueSize {
  /// Jobs admitted and not yet finished.
  pub size: usize,
}

/// `GET /queue`
pub async fn size<S>(State(state): State<ApiState<S>>, Owner(_): Owner) -> Json<QueueSize> {
  Json(QueueSize {
    size: state.queue.size(),
  })
}
