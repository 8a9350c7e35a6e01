//! Item analysis: text in, [`EnrichmentRecord`] out.

use kplan_core::{
  Analysis, EnrichmentRecord,
  enrichment::SUMMARY_MAX_CHARS,
};

use crate::{CompletionRequest, FailOpenTask, Outcome, Result};

/// `Success` with the validated record, or `Degraded` with the all-null one.
pub type EnrichmentOutcome = Outcome<EnrichmentRecord>;

/// Summarise an item and propose topics and labels for it.
pub struct AnalyzeText<'a> {
  pub text: &'a str,
}

impl FailOpenTask for AnalyzeText<'_> {
  type Output = EnrichmentRecord;

  const NAME: &'static str = "analyze_item";

  fn request(&self) -> CompletionRequest {
    CompletionRequest {
      system:     "You classify short social-media posts for a personal learning \
                   planner. Summarise the post and propose one to three short \
                   labels that could organise it into a learning path."
        .to_string(),
      user:       format!(
        "Post: {}\n\nReply with a JSON object: {{\"summary\": string of at most \
         {SUMMARY_MAX_CHARS} characters, \"topics\": string[], \
         \"suggestedLabels\": string[] of short kebab-case or snake_case \
         labels, \"confidence\": number from 0 to 1}}",
        self.text
      ),
      structured: true,
    }
  }

  fn parse(&self, raw: &str) -> Result<EnrichmentRecord> {
    let analysis: Analysis = serde_json::from_str(raw)?;
    analysis.validate()?;
    Ok(analysis.into())
  }

  fn fallback(&self) -> EnrichmentRecord { EnrichmentRecord::empty() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    FailureKind,
    outcome::run,
    testing::{Reply, ScriptedClient},
  };

  async fn enrich(client: &ScriptedClient) -> EnrichmentOutcome {
    run(client, &AnalyzeText { text: "hello world" }).await
  }

  fn greeting() -> Analysis {
    Analysis {
      summary:          "greeting".into(),
      topics:           vec!["greeting".into()],
      suggested_labels: vec!["intro".into()],
      confidence:       0.9,
    }
  }

  #[tokio::test]
  async fn valid_reply_passes_through_unchanged() {
    let raw    = serde_json::to_string(&greeting()).unwrap();
    let client = ScriptedClient::text(raw);

    let outcome = enrich(&client).await;
    assert_eq!(outcome, Outcome::Success(EnrichmentRecord::from(greeting())));
  }

  #[tokio::test]
  async fn request_is_structured_and_carries_the_text() {
    let client = ScriptedClient::text(serde_json::to_string(&greeting()).unwrap());
    enrich(&client).await;

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].structured);
    assert!(requests[0].user.contains("hello world"));
  }

  #[tokio::test]
  async fn extra_keys_are_ignored() {
    let raw = json!({
      "summary": "greeting",
      "topics": ["greeting"],
      "suggestedLabels": ["intro"],
      "confidence": 0.9,
      "language": "en",
    });
    let client = ScriptedClient::text(raw.to_string());
    assert_eq!(
      enrich(&client).await.into_value(),
      EnrichmentRecord::from(greeting())
    );
  }

  #[tokio::test]
  async fn service_failures_degrade_to_empty_record() {
    for reply in [Reply::Status(500), Reply::Status(401), Reply::Empty] {
      let client  = ScriptedClient::new(reply);
      let outcome = enrich(&client).await;

      assert!(outcome.is_degraded());
      assert!(outcome.value().is_empty());
      assert_eq!(outcome.reason().unwrap().kind, FailureKind::ExternalService);
    }
  }

  #[tokio::test]
  async fn malformed_replies_degrade_to_empty_record() {
    let replies = [
      "not json at all".to_string(),
      json!({ "summary": "x", "topics": [] }).to_string(),
      json!({
        "summary": 3, "topics": [], "suggestedLabels": [], "confidence": 0.5
      })
      .to_string(),
      json!({
        "summary": "x", "topics": [], "suggestedLabels": [], "confidence": 1.5
      })
      .to_string(),
      json!({
        "summary": "x".repeat(SUMMARY_MAX_CHARS + 1),
        "topics": [], "suggestedLabels": [], "confidence": 0.5
      })
      .to_string(),
      json!({
        "summary": null, "topics": null, "suggestedLabels": null, "confidence": null
      })
      .to_string(),
    ];

    for raw in replies {
      let client  = ScriptedClient::text(raw.clone());
      let outcome = enrich(&client).await;

      assert!(outcome.is_degraded(), "accepted {raw}");
      assert!(outcome.value().is_empty());
      assert_eq!(outcome.reason().unwrap().kind, FailureKind::Validation);
    }
  }

  #[tokio::test]
  async fn record_is_never_partially_populated() {
    let replies = [
      json!({ "summary": "only a summary" }).to_string(),
      json!({ "confidence": 0.4 }).to_string(),
      serde_json::to_string(&greeting()).unwrap(),
      "[]".to_string(),
    ];

    for raw in replies {
      let record = enrich(&ScriptedClient::text(raw)).await.into_value();
      let value  = serde_json::to_value(&record).unwrap();
      let nulls  = ["summary", "topics", "suggestedLabels", "confidence"]
        .iter()
        .filter(|k| value[**k].is_null())
        .count();
      assert!(nulls == 0 || nulls == 4, "mixed record: {value}");
    }
  }
}
