//! Admission errors for [`JobQueue`](crate::JobQueue).
//!
//! These are the only errors the queue ever returns; execution failures stay
//! inside the worker that hit them.

use kplan_core::Job;
use thiserror::Error;

/// A job the queue refused. The job is handed back untouched.
#[derive(Debug, Error)]
pub enum EnqueueError {
  #[error("job queue is closed")]
  Closed(Job),

  #[error("job queue is full")]
  Full(Job),
}

impl EnqueueError {
  pub fn into_job(self) -> Job {
    match self {
      Self::Closed(job) | Self::Full(job) => job,
    }
  }
}
