//! What a worker does with a job.

use std::{future::Future, sync::Arc};

use kplan_core::{AnalyzeItem, EnrichmentUpdate, store::EnrichmentSink};
use kplan_llm::{Analyzer, CompletionClient};
use tracing::{info, warn};

/// Executes job payloads on behalf of the queue's workers.
///
/// An error (or a panic) fails that one job; the queue logs it and moves on.
pub trait JobHandler: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  fn analyze_item(
    &self,
    job: AnalyzeItem,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Enriches an item's text and writes the result through an
/// [`EnrichmentSink`].
///
/// The item moves to `ready_for_review` even when enrichment degraded to the
/// all-null record. Only a failed write leaves it `pending`.
pub struct EnrichmentHandler<C, S> {
  analyzer: Analyzer<C>,
  sink:     Arc<S>,
}

impl<C, S> EnrichmentHandler<C, S> {
  pub fn new(analyzer: Analyzer<C>, sink: Arc<S>) -> Self { Self { analyzer, sink } }
}

impl<C, S> JobHandler for EnrichmentHandler<C, S>
where
  C: CompletionClient + 'static,
  S: EnrichmentSink + 'static,
{
  type Error = S::Error;

  async fn analyze_item(&self, job: AnalyzeItem) -> Result<(), S::Error> {
    info!(item_id = %job.item_id, "analyzing item");

    let outcome = self.analyzer.enrich(&job.text).await;
    if let Some(reason) = outcome.reason() {
      warn!(
        item_id = %job.item_id,
        kind = ?reason.kind,
        "enrichment degraded, storing empty record",
      );
    }

    let update = EnrichmentUpdate::ready_for_review(outcome.into_value());
    self
      .sink
      .write_enrichment(job.item_id, job.owner_id, update)
      .await?;

    info!(item_id = %job.item_id, "item analyzed");
    Ok(())
  }
}
