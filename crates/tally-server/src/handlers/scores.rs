//! Handlers for `/scores` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/scores` | Runs the submission pipeline |
//! | `GET`  | `/scores/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::Deserialize;
use tally_codec::EncryptedPayload;
use tally_core::{
  ScoreId,
  score::Score,
  services::MapLookup,
  store::ScoreStore,
};
use tally_submit::{Outcome, SubmissionRequest};

use crate::{AppState, auth::Session, error::Error};

// ─── Submit ──────────────────────────────────────────────────────────────────

/// The form a client uploads, with the replay file base64-encoded.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub score_data:     String,
  pub client_hash:    String,
  pub iv:             String,
  pub osu_version:    String,
  pub unique_ids:     String,
  #[serde(default)]
  pub storyboard_md5: Option<String>,
  pub beatmap_hash:   String,
  #[serde(default)]
  pub score_time_ms:  u32,
  #[serde(default)]
  pub fail_time_ms:   u32,
  #[serde(default)]
  pub replay:         Option<String>,
}

impl SubmitBody {
  fn into_request(self) -> Result<SubmissionRequest, Error> {
    let replay = self
      .replay
      .map(|r| B64.decode(r))
      .transpose()
      .map_err(|e| Error::BadRequest(format!("replay is not base64: {e}")))?;
    Ok(SubmissionRequest {
      payload: EncryptedPayload {
        score_data:  self.score_data,
        client_hash: self.client_hash,
        iv:          self.iv,
      },
      osu_version: self.osu_version,
      unique_ids: self.unique_ids,
      storyboard_md5: self.storyboard_md5,
      updated_beatmap_hash: self.beatmap_hash,
      score_time_ms: self.score_time_ms,
      fail_time_ms: self.fail_time_ms,
      replay,
    })
  }
}

/// `POST /scores`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Session(session): Session,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  let request = body.into_request()?;
  let outcome = state.submitter.submit(&request, &session).await?;
  let status = match &outcome {
    Outcome::Accepted(_) | Outcome::Duplicate => StatusCode::OK,
    Outcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    Outcome::Invalid { .. } => StatusCode::BAD_REQUEST,
  };
  Ok((status, Json(outcome)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /scores/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<ScoreId>,
) -> Result<Json<Score>, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  state
    .store
    .get_score(id)
    .await
    .map_err(Error::store)?
    .map(Json)
    .ok_or_else(|| Error::NotFound(format!("score {id}")))
}
