//! In-process enrichment job queue.
//!
//! [`JobQueue::start`] spawns a fixed pool of workers that consume admitted
//! jobs in arrival order. Each job gets exactly one execution attempt; its
//! failure is logged and contained, never returned to whoever enqueued it.
//! Nothing is persisted: jobs still buffered when the process exits are lost.
//!
//! Two jobs for the same item may run concurrently and the later write wins,
//! unless [`QueueConfig::serialize_per_item`] is set.

mod item_slots;

pub mod config;
pub mod error;
pub mod handler;
pub mod queue;

pub use config::QueueConfig;
pub use error::EnqueueError;
pub use handler::{EnrichmentHandler, JobHandler};
pub use queue::JobQueue;
