//! Error types for `kplan-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown item status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown user tag: {0:?}")]
  UnknownUserTag(String),
}

/// A structured document that parsed but does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
  #[error("`{field}` is {len} characters, the limit is {max}")]
  TooLong {
    field: &'static str,
    len:   usize,
    max:   usize,
  },

  #[error("`{field}` is {value}, expected a value in [{min}, {max}]")]
  OutOfRange {
    field: &'static str,
    value: f64,
    min:   f64,
    max:   f64,
  },

  #[error("enrichment record is partially populated")]
  PartiallyPopulated,
}

impl ValidationError {
  /// Check that `value` is finite and within `[min, max]`.
  pub fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
  ) -> Result<(), Self> {
    if value.is_finite() && (min..=max).contains(&value) {
      Ok(())
    } else {
      Err(Self::OutOfRange { field, value, min, max })
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
