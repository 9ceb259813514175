//! Handlers for `/players` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/players/{id}` | Creates the player or renames it |
//! | `GET`  | `/players/{id}/stats/{ruleset}` | 400 on unknown ruleset id |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use tally_core::{
  PlayerId,
  player::{Player, PlayerStats},
  ruleset::Ruleset,
  services::MapLookup,
  store::ScoreStore,
};

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
pub struct PlayerBody {
  pub name:       String,
  #[serde(default)]
  pub restricted: bool,
}

/// `PUT /players/{id}`
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PlayerId>,
  Json(body): Json<PlayerBody>,
) -> Result<StatusCode, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  if body.name.trim().is_empty() {
    return Err(Error::BadRequest("player name must not be empty".into()));
  }
  state
    .store
    .upsert_player(Player {
      player_id:  id,
      name:       body.name,
      restricted: body.restricted,
    })
    .await
    .map_err(Error::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /players/{id}/stats/{ruleset}`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Path((id, ruleset)): Path<(PlayerId, u8)>,
) -> Result<Json<PlayerStats>, Error>
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  let ruleset =
    Ruleset::try_from(ruleset).map_err(|e| Error::BadRequest(e.to_string()))?;
  state
    .store
    .stats(id, ruleset)
    .await
    .map_err(Error::store)?
    .map(Json)
    .ok_or_else(|| Error::NotFound(format!("player {id}")))
}

#[cfg(test)]
mod tests {
  use axum::http::{Method, StatusCode};
  use serde_json::json;

  use crate::test_helpers::fixture;

  #[tokio::test]
  async fn registered_player_has_zeroed_stats() {
    let f = fixture().await;
    let (status, _) = f
      .send(Method::PUT, "/players/5", None, Some(json!({ "name": "mrekk" })))
      .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, stats) =
      f.send(Method::GET, "/players/5/stats/4", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["ruleset"], 4);
    assert_eq!(stats["plays"], 0);
    assert_eq!(stats["version"], 0);
  }

  #[tokio::test]
  async fn stats_reflect_submissions() {
    let f = fixture().await;
    let token = f.login(1).await;
    f.send(Method::POST, "/scores", Some(token), Some(f.score_body(1, 500_000)))
      .await;

    let (_, stats) = f.send(Method::GET, "/players/1/stats/0", None, None).await;
    assert_eq!(stats["plays"], 1);
    assert_eq!(stats["ranked_score"], 500_000);
  }

  #[tokio::test]
  async fn bad_ruleset_and_unknown_player() {
    let f = fixture().await;
    let (status, _) = f.send(Method::GET, "/players/1/stats/8", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 7 would be autopilot taiko, which does not exist.
    let (status, _) = f.send(Method::GET, "/players/1/stats/7", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn empty_name_is_rejected() {
    let f = fixture().await;
    let (status, body) = f
      .send(Method::PUT, "/players/5", None, Some(json!({ "name": "  " })))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad request: player name must not be empty");
  }
}
