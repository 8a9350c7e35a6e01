//! JSON REST API for kplan items.
//!
//! Exposes an axum [`Router`] backed by any [`ItemStore`] and a running
//! [`JobQueue`]. Authentication happens upstream; handlers trust the
//! `x-owner-id` header (see [`owner::Owner`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = kplan_api::api_router(ApiState::new(store, queue));
//! ```

pub mod error;
pub mod extract;
pub mod owner;
pub mod queue;
pub mod tweets;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use kplan_core::store::ItemStore;
use kplan_queue::JobQueue;

pub use error::ApiError;
pub use owner::Owner;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub queue: JobQueue,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, queue: JobQueue) -> Self { Self { store, queue } }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      queue: self.queue.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ItemStore + 'static,
{
  Router::new()
    // Items
    .route("/tweets", get(tweets::list::<S>).post(tweets::create::<S>))
    .route("/tweets/{id}", get(tweets::get_one::<S>))
    .route("/tweets/{id}/tag", post(tweets::tag::<S>))
    .route("/tweets/{id}/reanalyze", post(tweets::reanalyze::<S>))
    // Queue
    .route("/queue", get(queue::size::<S>))
    .with_state(state)
}
