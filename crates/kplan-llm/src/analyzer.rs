//! [`Analyzer`]: one handle for every completion task.

use std::sync::Arc;

use crate::{
  CompletionClient, Outcome,
  analyze::{AnalyzeText, EnrichmentOutcome},
  evaluate::{EvaluateExplanation, Evaluation},
  gaps::SuggestGaps,
  outcome::run,
  simplify::{Simplification, Simplify},
};

/// Runs the fail-open completion tasks against a shared client.
///
/// Cheap to clone. None of its methods return an error: each yields an
/// [`Outcome`] whose value is usable even when degraded.
pub struct Analyzer<C> {
  client: Arc<C>,
}

impl<C> Clone for Analyzer<C> {
  fn clone(&self) -> Self {
    Self {
      client: self.client.clone(),
    }
  }
}

impl<C: CompletionClient> Analyzer<C> {
  pub fn new(client: C) -> Self {
    Self {
      client: Arc::new(client),
    }
  }

  pub fn from_shared(client: Arc<C>) -> Self { Self { client } }

  /// Produce an item's enrichment record.
  pub async fn enrich(&self, text: &str) -> EnrichmentOutcome {
    run(self.client.as_ref(), &AnalyzeText { text }).await
  }

  pub async fn evaluate_explanation(
    &self,
    explanation: &str,
    audience: Option<&str>,
    context: &[String],
  ) -> Outcome<Option<Evaluation>> {
    let task = EvaluateExplanation {
      explanation,
      audience,
      context,
    };
    run(self.client.as_ref(), &task).await
  }

  pub async fn suggest_gaps(
    &self,
    explanation: &str,
    label_name: &str,
    summaries: &[String],
  ) -> Outcome<Vec<String>> {
    let task = SuggestGaps {
      explanation,
      label_name,
      summaries,
    };
    run(self.client.as_ref(), &task).await
  }

  pub async fn simplify(&self, explanation: &str, audience: &str) -> Outcome<Simplification> {
    run(self.client.as_ref(), &Simplify { explanation, audience }).await
  }
}
