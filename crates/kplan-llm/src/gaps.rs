//! Gap suggestion: list what an explanation leaves out.

use serde::Deserialize;

use crate::{CompletionRequest, FailOpenTask, Result, evaluate::bullet_block};

/// Suggest knowledge gaps and unstated assumptions in an explanation of
/// `label_name`, given the summaries of the items filed under that label.
///
/// The fallback is an empty list.
pub struct SuggestGaps<'a> {
  pub explanation: &'a str,
  pub label_name:  &'a str,
  pub summaries:   &'a [String],
}

#[derive(Deserialize)]
struct Suggestions {
  suggestions: Vec<String>,
}

impl FailOpenTask for SuggestGaps<'_> {
  type Output = Vec<String>;

  const NAME: &'static str = "suggest_gaps";

  fn request(&self) -> CompletionRequest {
    let context = bullet_block("Item summaries", self.summaries);
    CompletionRequest {
      system:     "You find missing knowledge and unstated assumptions in an \
                   explanation."
        .to_string(),
      user:       format!(
        "{context}Topic: {}\n\nExplanation: {}\n\nList the specific gaps and \
         assumptions the learner should research next. Reply with a JSON \
         object: {{\"suggestions\": string[]}}",
        self.label_name, self.explanation,
      ),
      structured: true,
    }
  }

  fn parse(&self, raw: &str) -> Result<Vec<String>> {
    let parsed: Suggestions = serde_json::from_str(raw)?;
    Ok(parsed.suggestions)
  }

  fn fallback(&self) -> Vec<String> { Vec::new() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    outcome::run,
    testing::{Reply, ScriptedClient},
  };

  fn task() -> SuggestGaps<'static> {
    SuggestGaps {
      explanation: "Rust moves values by default.",
      label_name:  "ownership",
      summaries:   &[],
    }
  }

  #[tokio::test]
  async fn suggestions_are_extracted() {
    let client  = ScriptedClient::text(r#"{"suggestions":["borrowing","Copy types"]}"#);
    let outcome = run(&client, &task()).await;
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.into_value(), vec!["borrowing", "Copy types"]);
  }

  #[tokio::test]
  async fn failures_yield_no_suggestions() {
    let outcome = run(&ScriptedClient::new(Reply::Status(503)), &task()).await;
    assert!(outcome.is_degraded());
    assert!(outcome.value().is_empty());

    let outcome = run(&ScriptedClient::text(r#"{"suggestions":"one"}"#), &task()).await;
    assert!(outcome.is_degraded());
    assert!(outcome.value().is_empty());
  }

  #[tokio::test]
  async fn prompt_names_the_topic() {
    let client = ScriptedClient::text(r#"{"suggestions":[]}"#);
    run(&client, &task()).await;
    assert!(client.requests()[0].user.contains("Topic: ownership"));
  }
}
