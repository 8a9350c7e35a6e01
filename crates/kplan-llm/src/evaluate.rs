//! Explanation evaluation: grade a learner's explanation against a rubric.

use kplan_core::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::{CompletionRequest, FailOpenTask, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
  #[serde(rename = "simple")]
  Simple,
  #[serde(rename = "ok")]
  Ok,
  #[serde(rename = "too complex")]
  TooComplex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
  /// In `[0, 1]`.
  pub clarity:        f64,
  /// Accepts `8` and `8.0`, rejects `8.5`.
  #[serde(deserialize_with = "whole_number")]
  pub grade_level:    i64,
  pub complexity:     Complexity,
  pub key_points:     Vec<String>,
  pub suggested_gaps: Vec<String>,
}

fn whole_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  let n = f64::deserialize(deserializer)?;
  if n.fract() != 0.0 || !(i64::MIN as f64..i64::MAX as f64).contains(&n) {
    return Err(D::Error::custom(format!("expected a whole number, got {n}")));
  }
  Ok(n as i64)
}

/// Evaluate `explanation`, optionally for a named audience and against the
/// texts of the items it is meant to cover.
///
/// The fallback is `None`: no rubric fields at all.
pub struct EvaluateExplanation<'a> {
  pub explanation: &'a str,
  pub audience:    Option<&'a str>,
  pub context:     &'a [String],
}

impl FailOpenTask for EvaluateExplanation<'_> {
  type Output = Option<Evaluation>;

  const NAME: &'static str = "evaluate_explanation";

  fn request(&self) -> CompletionRequest {
    let context = bullet_block("Context items", self.context);
    CompletionRequest {
      system:     "You evaluate explanations strictly and concisely. Be concrete."
        .to_string(),
      user:       format!(
        "{context}Explanation (audience: {}): {}\n\nReply with a JSON object: \
         {{\"clarity\": number from 0 to 1, \"gradeLevel\": integer, \
         \"complexity\": \"simple\" | \"ok\" | \"too complex\", \
         \"keyPoints\": string[], \"suggestedGaps\": string[]}}",
        self.audience.unwrap_or("general"),
        self.explanation,
      ),
      structured: true,
    }
  }

  fn parse(&self, raw: &str) -> Result<Option<Evaluation>> {
    let evaluation: Evaluation = serde_json::from_str(raw)?;
    ValidationError::check_range("clarity", evaluation.clarity, 0.0, 1.0)?;
    Ok(Some(evaluation))
  }

  fn fallback(&self) -> Option<Evaluation> { None }
}

/// `"{title}:\n- a\n- b\n\n"`, or nothing when `lines` is empty.
pub(crate) fn bullet_block(title: &str, lines: &[String]) -> String {
  if lines.is_empty() {
    return String::new();
  }
  let bullets: Vec<String> = lines.iter().map(|l| format!("- {l}")).collect();
  format!("{title}:\n{}\n\n", bullets.join("\n"))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{Outcome, outcome::run, testing::ScriptedClient};

  fn task<'a>(context: &'a [String]) -> EvaluateExplanation<'a> {
    EvaluateExplanation {
      explanation: "Plants turn light into sugar.",
      audience: Some("ten-year-olds"),
      context,
    }
  }

  #[tokio::test]
  async fn valid_evaluation_is_returned() {
    let raw = json!({
      "clarity": 0.8,
      "gradeLevel": 5,
      "complexity": "too complex",
      "keyPoints": ["photosynthesis"],
      "suggestedGaps": ["chlorophyll"],
    });
    let client  = ScriptedClient::text(raw.to_string());
    let outcome = run(&client, &task(&[])).await;

    let Outcome::Success(Some(evaluation)) = outcome else {
      panic!("expected success, got {outcome:?}");
    };
    assert_eq!(evaluation.complexity, Complexity::TooComplex);
    assert_eq!(evaluation.grade_level, 5);
  }

  #[tokio::test]
  async fn grade_level_written_as_float_is_accepted() {
    let raw = json!({
      "clarity": 0.5,
      "gradeLevel": 8.0,
      "complexity": "ok",
      "keyPoints": [],
      "suggestedGaps": [],
    });
    let outcome = run(&ScriptedClient::text(raw.to_string()), &task(&[])).await;
    assert!(!outcome.is_degraded(), "{outcome:?}");
    assert_eq!(outcome.into_value().map(|e| e.grade_level), Some(8));
  }

  #[tokio::test]
  async fn fractional_grade_level_degrades() {
    let raw = json!({
      "clarity": 0.8,
      "gradeLevel": 5.5,
      "complexity": "ok",
      "keyPoints": [],
      "suggestedGaps": [],
    });
    let outcome = run(&ScriptedClient::text(raw.to_string()), &task(&[])).await;
    assert!(outcome.is_degraded());
    assert_eq!(outcome.into_value(), None);
  }

  #[tokio::test]
  async fn clarity_out_of_range_degrades() {
    let raw = json!({
      "clarity": 2,
      "gradeLevel": 5,
      "complexity": "ok",
      "keyPoints": [],
      "suggestedGaps": [],
    });
    let outcome = run(&ScriptedClient::text(raw.to_string()), &task(&[])).await;
    assert!(outcome.is_degraded());
  }

  #[tokio::test]
  async fn context_items_are_listed_in_the_prompt() {
    let context = vec!["first item".to_string(), "second item".to_string()];
    let client  = ScriptedClient::text("{}");
    run(&client, &task(&context)).await;

    let user = &client.requests()[0].user;
    assert!(user.starts_with("Context items:\n- first item\n- second item\n\n"));
    assert!(user.contains("audience: ten-year-olds"));
  }
}
