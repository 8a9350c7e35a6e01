//! Completion-service access for kplan.
//!
//! [`CompletionClient`] is the raw text-in/text-out boundary. On top of it,
//! every request shape the system sends (item analysis, explanation
//! evaluation, gap suggestion, simplification) is a [`FailOpenTask`]: build a
//! prompt, call the client, parse the reply, and fall back to a defined empty
//! value on any failure. [`Analyzer`] bundles those tasks behind one handle.

pub mod analyze;
pub mod analyzer;
pub mod client;
pub mod error;
pub mod evaluate;
pub mod gaps;
pub mod outcome;
pub mod simplify;

pub use analyze::EnrichmentOutcome;
pub use analyzer::Analyzer;
pub use client::{CompletionClient, CompletionConfig, CompletionRequest, OpenAiClient};
pub use error::{Error, Result};
pub use outcome::{DegradeReason, FailOpenTask, FailureKind, Outcome};

#[cfg(test)]
pub(crate) mod testing;
