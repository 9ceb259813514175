//! Error type for `tally-store-sqlite`.

use tally_core::PlayerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tally_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("player not found: {0}")]
  PlayerNotFound(PlayerId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
