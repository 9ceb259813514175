//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown grade: {0:?}")]
  UnknownGrade(String),

  #[error("unknown ruleset id: {0}")]
  UnknownRuleset(u8),

  #[error("invalid ruleset: vanilla mode {mode_vn} with mods {mods}")]
  InvalidRuleset { mode_vn: u8, mods: u32 },

  #[error("unknown submission status: {0}")]
  UnknownStatus(i64),

  #[error("unknown ranked status: {0}")]
  UnknownRankedStatus(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
