//! The enrichment record attached to an item.
//!
//! A record is either fully populated or fully empty. The Rust shape makes a
//! half-populated record unrepresentable; the JSON shape (four nullable keys)
//! is checked on the way in.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest summary the completion service may return, in characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

// ─── Analysis ────────────────────────────────────────────────────────────────

/// The populated form of an enrichment: what the completion service is asked
/// to return for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
  pub summary:          String,
  pub topics:           Vec<String>,
  /// Short kebab- or snake-case label identifiers.
  pub suggested_labels: Vec<String>,
  /// In `[0, 1]`.
  pub confidence:       f64,
}

impl Analysis {
  /// Check the constraints serde cannot express: summary length and the
  /// confidence range.
  pub fn validate(&self) -> Result<(), ValidationError> {
    let len = self.summary.chars().count();
    if len > SUMMARY_MAX_CHARS {
      return Err(ValidationError::TooLong {
        field: "summary",
        len,
        max: SUMMARY_MAX_CHARS,
      });
    }
    ValidationError::check_range("confidence", self.confidence, 0.0, 1.0)
  }
}

// ─── EnrichmentRecord ────────────────────────────────────────────────────────

/// An item's enrichment: either a validated [`Analysis`] or all-null.
///
/// Serialises as `{summary, topics, suggestedLabels, confidence}` with every
/// key null in the empty case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields", into = "RecordFields")]
pub struct EnrichmentRecord(Option<Analysis>);

impl EnrichmentRecord {
  /// The all-null record produced when enrichment fails.
  pub fn empty() -> Self { Self(None) }

  pub fn is_empty(&self) -> bool { self.0.is_none() }

  pub fn analysis(&self) -> Option<&Analysis> { self.0.as_ref() }

  pub fn into_analysis(self) -> Option<Analysis> { self.0 }

  pub fn summary(&self) -> Option<&str> {
    self.0.as_ref().map(|a| a.summary.as_str())
  }
}

impl From<Analysis> for EnrichmentRecord {
  fn from(analysis: Analysis) -> Self { Self(Some(analysis)) }
}

/// The nullable wire form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RecordFields {
  summary:          Option<String>,
  topics:           Option<Vec<String>>,
  suggested_labels: Option<Vec<String>>,
  confidence:       Option<f64>,
}

impl TryFrom<RecordFields> for EnrichmentRecord {
  type Error = ValidationError;

  fn try_from(f: RecordFields) -> Result<Self, Self::Error> {
    match (f.summary, f.topics, f.suggested_labels, f.confidence) {
      (None, None, None, None) => Ok(Self::empty()),
      (Some(summary), Some(topics), Some(suggested_labels), Some(confidence)) => {
        let analysis = Analysis { summary, topics, suggested_labels, confidence };
        analysis.validate()?;
        Ok(Self(Some(analysis)))
      }
      _ => Err(ValidationError::PartiallyPopulated),
    }
  }
}

impl From<EnrichmentRecord> for RecordFields {
  fn from(record: EnrichmentRecord) -> Self {
    match record.0 {
      None => Self::default(),
      Some(a) => Self {
        summary:          Some(a.summary),
        topics:           Some(a.topics),
        suggested_labels: Some(a.suggested_labels),
        confidence:       Some(a.confidence),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn greeting() -> Analysis {
    Analysis {
      summary:          "greeting".into(),
      topics:           vec!["greeting".into()],
      suggested_labels: vec!["intro".into()],
      confidence:       0.9,
    }
  }

  #[test]
  fn empty_record_serialises_all_null() {
    let value = serde_json::to_value(EnrichmentRecord::empty()).unwrap();
    assert_eq!(
      value,
      json!({
        "summary": null,
        "topics": null,
        "suggestedLabels": null,
        "confidence": null,
      })
    );
  }

  #[test]
  fn populated_record_uses_camel_case_keys() {
    let value = serde_json::to_value(EnrichmentRecord::from(greeting())).unwrap();
    assert_eq!(value["suggestedLabels"], json!(["intro"]));
    assert_eq!(value["confidence"], json!(0.9));
  }

  #[test]
  fn partially_populated_json_is_rejected() {
    let err = serde_json::from_value::<EnrichmentRecord>(json!({
      "summary": "greeting",
      "topics": null,
      "suggestedLabels": null,
      "confidence": null,
    }))
    .unwrap_err();
    assert!(err.to_string().contains("partially populated"), "{err}");
  }

  #[test]
  fn missing_keys_read_as_empty() {
    let record: EnrichmentRecord = serde_json::from_value(json!({})).unwrap();
    assert!(record.is_empty());
  }

  #[test]
  fn summary_over_limit_fails_validation() {
    let mut analysis = greeting();
    analysis.summary = "x".repeat(SUMMARY_MAX_CHARS + 1);
    assert!(matches!(
      analysis.validate(),
      Err(ValidationError::TooLong { field: "summary", .. })
    ));
  }

  #[test]
  fn summary_limit_counts_characters_not_bytes() {
    let mut analysis = greeting();
    analysis.summary = "é".repeat(SUMMARY_MAX_CHARS);
    assert!(analysis.validate().is_ok());
  }

  #[test]
  fn confidence_outside_unit_interval_fails_validation() {
    for bad in [-0.1, 1.01, f64::NAN] {
      let mut analysis = greeting();
      analysis.confidence = bad;
      assert!(analysis.validate().is_err(), "{bad} accepted");
    }
  }
}
