//! Simplification: rewrite an explanation for a target audience.
//!
//! Unlike the other tasks the reply is free text: the first non-blank line is
//! the rewritten draft, every later non-blank line is a note.

use serde::Serialize;

use crate::{CompletionRequest, Error, FailOpenTask, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Simplification {
  pub draft_text: String,
  pub notes:      Vec<String>,
}

pub struct Simplify<'a> {
  pub explanation: &'a str,
  pub audience:    &'a str,
}

impl FailOpenTask for Simplify<'_> {
  type Output = Simplification;

  const NAME: &'static str = "simplify";

  fn request(&self) -> CompletionRequest {
    CompletionRequest {
      system:     "You rewrite content for a given audience, as simply as \
                   possible without losing accuracy."
        .to_string(),
      user:       format!(
        "Explanation: {}\n\nAudience: {}\n\nRewrite it in simpler terms on a \
         single line, then add three bullet lines: what changed, any nuance \
         lost, and a suggested analogy.",
        self.explanation, self.audience,
      ),
      structured: false,
    }
  }

  fn parse(&self, raw: &str) -> Result<Simplification> {
    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
    let draft_text = lines.next().ok_or(Error::EmptyResponse)?.to_string();
    let notes = lines.map(strip_bullet).map(str::to_string).collect();
    Ok(Simplification { draft_text, notes })
  }

  fn fallback(&self) -> Simplification {
    Simplification {
      draft_text: self.explanation.to_string(),
      notes:      vec!["Error during simplification".to_string()],
    }
  }
}

fn strip_bullet(line: &str) -> &str {
  line
    .strip_prefix(['-', '•', '*'])
    .map(str::trim_start)
    .unwrap_or(line)
}
