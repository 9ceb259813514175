//! JSON HTTP surface for Tally.
//!
//! Exposes an axum [`Router`] over any store that implements both
//! [`ScoreStore`] and [`MapLookup`]. Login, TLS and the beatmap mirror live
//! elsewhere; they push sessions, players and maps in over the registration
//! routes.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/scores` | Bearer session token; body: [`handlers::scores::SubmitBody`] |
//! | `GET`    | `/scores/{id}` | 404 if not found |
//! | `PUT`    | `/players/{id}` | Body: `{"name":"..","restricted":false}` |
//! | `GET`    | `/players/{id}/stats/{ruleset}` | Ruleset by numeric id |
//! | `PUT`    | `/maps/{md5}` | Body: `{"map_id":1,"set_id":1,"status":"ranked"}` |
//! | `GET`    | `/maps/{md5}/leaderboard` | `?ruleset=0&limit=50` |
//! | `PUT`    | `/sessions/{token}` | Body: a `SessionContext` |
//! | `DELETE` | `/sessions/{token}` | |

pub mod auth;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod replays;
pub mod services;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use serde::Deserialize;
use tally_core::{services::MapLookup, store::ScoreStore};
use tally_submit::{SubmitConfig, Submitter};
use tower_http::trace::TraceLayer;

use handlers::{maps, players, scores, sessions};
use registry::SessionRegistry;
use replays::FsReplayStore;
use services::{NullOracle, TracingNotifier};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub replay_dir: PathBuf,
  #[serde(default)]
  pub submit:     SubmitConfig,
}

// ─── Application state ───────────────────────────────────────────────────────

pub type ServerSubmitter<S> =
  Submitter<S, NullOracle, FsReplayStore, TracingNotifier>;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub submitter: Arc<ServerSubmitter<S>>,
  pub sessions:  SessionRegistry,
  pub config:    Arc<ServerConfig>,
}

impl<S> AppState<S>
where
  S: ScoreStore + MapLookup,
{
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let submitter = Submitter::new(
      Arc::clone(&store),
      Arc::new(NullOracle),
      Arc::new(FsReplayStore::new(&config.replay_dir)),
      Arc::new(TracingNotifier),
      config.submit.clone(),
    );
    Self {
      store,
      submitter: Arc::new(submitter),
      sessions: SessionRegistry::default(),
      config: Arc::new(config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Tally server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  Router::new()
    .route("/scores",                        post(scores::submit::<S>))
    .route("/scores/{id}",                   get(scores::get_one::<S>))
    .route("/players/{id}",                  put(players::upsert::<S>))
    .route("/players/{id}/stats/{ruleset}",  get(players::stats::<S>))
    .route("/maps/{md5}",                    put(maps::register::<S>))
    .route("/maps/{md5}/leaderboard",        get(maps::leaderboard::<S>))
    .route(
      "/sessions/{token}",
      put(sessions::open::<S>).delete(sessions::close::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_helpers;
