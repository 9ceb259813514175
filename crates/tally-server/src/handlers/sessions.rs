//! Handlers for `/sessions` endpoints, fed by the login service.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `PUT`    | `/sessions/{token}` | 201 when new, 204 when replacing |
//! | `DELETE` | `/sessions/{token}` | 404 if unknown |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use tally_core::{services::MapLookup, session::SessionContext, store::ScoreStore};
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::Error};

/// `PUT /sessions/{token}`
pub async fn open<S>(
  State(state): State<AppState<S>>,
  Path(token): Path<Uuid>,
  Json(session): Json<SessionContext>,
) -> StatusCode
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  let player_id = session.player_id;
  if state.sessions.insert(token, session).await {
    debug!(player_id, "session replaced");
    StatusCode::NO_CONTENT
  } else {
    debug!(player_id, "session opened");
    StatusCode::CREATED
  }
}

/// `DELETE /sessions/{token}`
pub async fn close<S>(
  State(state): State<AppState<S>>,
  Path(token): Path<Uuid>,
) -> Result<StatusCode, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  state
    .sessions
    .remove(&token)
    .await
    .map(|_| StatusCode::NO_CONTENT)
    .ok_or_else(|| Error::NotFound(format!("session {token}")))
}
