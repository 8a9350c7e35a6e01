//! Handlers for `/tweets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tweets` | Body: `{"text":"…","url":"…"}`, at least one required |
//! | `GET`  | `/tweets` | Optional `?status=…&userTag=…&q=…` |
//! | `GET`  | `/tweets/{id}` | 404 if not found for the owner |
//! | `POST` | `/tweets/{id}/tag` | Body: `{"userTag":"learn"}` |
//! | `POST` | `/tweets/{id}/reanalyze` | 202, item back to `pending` |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use kplan_core::{
  Item, ItemStatus, Job, NewItem, UserTag,
  store::{ItemQuery, ItemStore},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  owner::Owner,
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("tweet {id} not found")) }

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub text: Option<String>,
  pub url:  Option<String>,
}

/// `POST /tweets`
///
/// Stores the item as `pending` and queues it for enrichment. The response
/// does not wait for the analysis.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Owner(owner_id): Owner,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ItemStore,
{
  let text = body.text.filter(|t| !t.trim().is_empty());
  let url = body.url.filter(|u| !u.trim().is_empty());
  if text.is_none() && url.is_none() {
    return Err(ApiError::BadRequest("one of `text` or `url` is required".into()));
  }

  let item = state
    .store
    .create_item(NewItem {
      owner_id,
      text: text.unwrap_or_default(),
      url,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  info!(item_id = %item.item_id, "item created");

  // The item is already stored; a refused job leaves it `pending` for a
  // later re-analysis.
  if let Err(e) = state
    .queue
    .enqueue(Job::analyze_item(item.item_id, owner_id, item.text.clone()))
  {
    warn!(item_id = %item.item_id, error = %e, "analysis not queued");
  }

  Ok((StatusCode::CREATED, Json(item)))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub status:   Option<ItemStatus>,
  pub user_tag: Option<UserTag>,
  /// Substring match over text and enrichment summary.
  pub q:        Option<String>,
}

/// `GET /tweets[?status=…][&userTag=…][&q=…]`, newest first.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Owner(owner_id): Owner,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Item>>, ApiError>
where
  S: ItemStore,
{
  let query = ItemQuery {
    owner_id,
    status: params.status,
    user_tag: params.user_tag,
    text: params.q.filter(|q| !q.is_empty()),
  };

  let items = state
    .store
    .list_items(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(items))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /tweets/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Owner(owner_id): Owner,
  Path(id): Path<Uuid>,
) -> Result<Json<Item>, ApiError>
where
  S: ItemStore,
{
  let item = state
    .store
    .get_item(id, owner_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(item))
}

// ─── Tag ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagBody {
  pub user_tag: UserTag,
}

/// `POST /tweets/{id}/tag`: body: `{"userTag":"learn"}`
pub async fn tag<S>(
  State(state): State<ApiState<S>>,
  Owner(owner_id): Owner,
  Path(id): Path<Uuid>,
  Json(body): Json<TagBody>,
) -> Result<Json<Item>, ApiError>
where
  S: ItemStore,
{
  let item = state
    .store
    .tag_item(id, owner_id, body.user_tag)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(item))
}

// ─── Re-analyze ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Queued {
  pub message: String,
}

/// `POST /tweets/{id}/reanalyze`
pub async fn reanalyze<S>(
  State(state): State<ApiState<S>>,
  Owner(owner_id): Owner,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ItemStore,
{
  let item = state
    .store
    .mark_pending(id, owner_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_found(id))?;

  state
    .queue
    .enqueue(Job::analyze_item(item.item_id, owner_id, item.text))
    .map_err(|e| ApiError::Unavailable(e.to_string()))?;

  info!(item_id = %id, "item queued for re-analysis");
  Ok((
    StatusCode::ACCEPTED,
    Json(Queued {
      message: "tweet queued for re-analysis".into(),
    }),
  ))
}
