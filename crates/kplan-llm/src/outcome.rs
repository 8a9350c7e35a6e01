//! The fail-open algorithm shared by every completion task.
//!
//! A task never returns an error to its caller. It returns an [`Outcome`]
//! that is either the parsed reply or the task's fallback value together with
//! the reason the reply could not be used.

use tracing::warn;

use crate::{CompletionClient, CompletionRequest, Error, Result};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Which layer failed when an outcome is degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// Unreachable, rejected the request, timed out, or replied with nothing.
  ExternalService,
  /// Replied, but not with the expected shape.
  Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradeReason {
  pub kind:    FailureKind,
  pub message: String,
}

impl From<&Error> for DegradeReason {
  fn from(e: &Error) -> Self {
    let kind = if e.is_external_service() {
      FailureKind::ExternalService
    } else {
      FailureKind::Validation
    };
    Self {
      kind,
      message: e.to_string(),
    }
  }
}

/// The result of a fail-open task.
///
/// `Degraded` still carries a usable value (the task's fallback), so callers
/// that only want the value can call [`Outcome::into_value`] and never branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
  Success(T),
  Degraded { value: T, reason: DegradeReason },
}

impl<T> Outcome<T> {
  pub fn value(&self) -> &T {
    match self {
      Self::Success(v) | Self::Degraded { value: v, .. } => v,
    }
  }

  pub fn into_value(self) -> T {
    match self {
      Self::Success(v) | Self::Degraded { value: v, .. } => v,
    }
  }

  pub fn is_degraded(&self) -> bool { matches!(self, Self::Degraded { .. }) }

  pub fn reason(&self) -> Option<&DegradeReason> {
    match self {
      Self::Success(_) => None,
      Self::Degraded { reason, .. } => Some(reason),
    }
  }
}

// ─── Task ────────────────────────────────────────────────────────────────────

/// One request shape sent to the completion service.
pub trait FailOpenTask: Sync {
  type Output;

  /// Short name used in log records.
  const NAME: &'static str;

  fn request(&self) -> CompletionRequest;

  /// Turn the raw reply into the output, or explain why it can't be.
  fn parse(&self, raw: &str) -> Result<Self::Output>;

  /// The defined empty value returned when anything fails.
  fn fallback(&self) -> Self::Output;
}

/// Run `task` against `client`, absorbing every failure into the task's
/// fallback.
pub async fn run<C, T>(client: &C, task: &T) -> Outcome<T::Output>
where
  C: CompletionClient,
  T: FailOpenTask,
{
  let request = task.request();
  let parsed = match client.complete(&request).await {
    Ok(raw) => task.parse(&raw),
    Err(e) => Err(e),
  };

  match parsed {
    Ok(value) => Outcome::Success(value),
    Err(e) => {
      warn!(task = T::NAME, error = %e, "completion unusable, using fallback");
      Outcome::Degraded {
        value:  task.fallback(),
        reason: DegradeReason::from(&e),
      }
    }
  }
}
