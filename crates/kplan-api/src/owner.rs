//! The `x-owner-id` extractor.
//!
//! An authenticating proxy in front of the server resolves the caller and
//! forwards their id in this header. Every item operation is scoped to it.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use crate::error::ApiError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// The caller's owner id. Rejects with 401 when the header is missing or not
/// a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Uuid);

/// Read the owner id directly from headers.
pub fn owner_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
  headers
    .get(OWNER_HEADER)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| Uuid::parse_str(v.trim()).ok())
    .ok_or(ApiError::Unauthorized)
}

impl<St> FromRequestParts<St> for Owner
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    owner_from_headers(&parts.headers).map(Owner)
  }
}
