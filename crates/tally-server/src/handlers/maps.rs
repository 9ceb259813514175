//! Handlers for `/maps` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/maps/{md5}` | Registers or updates a beatmap |
//! | `GET`  | `/maps/{md5}/leaderboard` | `?ruleset=<id>&limit=<n>`, 404 on unknown map |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;
use tally_core::{
  MapId,
  map::{MapInfo, RankedStatus},
  ruleset::Ruleset,
  services::MapLookup,
  store::{LeaderboardEntry, ScoreStore},
};

use crate::{AppState, error::Error};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 100;

fn is_md5(s: &str) -> bool {
  s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MapBody {
  pub map_id: MapId,
  pub set_id: u32,
  pub status: RankedStatus,
}

/// `PUT /maps/{md5}`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Path(md5): Path<String>,
  Json(body): Json<MapBody>,
) -> Result<StatusCode, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  if !is_md5(&md5) {
    return Err(Error::BadRequest(format!("{md5:?} is not an md5 digest")));
  }
  MapLookup::register(&*state.store, MapInfo {
    map_id: body.map_id,
    set_id: body.set_id,
    md5,
    status: body.status,
    plays: 0,
    passes: 0,
  })
  .await
  .map_err(Error::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
  #[serde(default)]
  pub ruleset: u8,
  pub limit:   Option<u32>,
}

/// `GET /maps/{md5}/leaderboard[?ruleset=<id>&limit=<n>]`
pub async fn leaderboard<S>(
  State(state): State<AppState<S>>,
  Path(md5): Path<String>,
  Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<LeaderboardEntry>>, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  let ruleset = Ruleset::try_from(params.ruleset)
    .map_err(|e| Error::BadRequest(e.to_string()))?;
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

  MapLookup::lookup(&*state.store, &md5)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("map {md5}")))?;

  let entries = state
    .store
    .leaderboard(&md5, ruleset, limit)
    .await
    .map_err(Error::store)?;
  Ok(Json(entries))
}
