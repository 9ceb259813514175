//! Beatmap metadata as consumed by the pipeline.

use serde::{Deserialize, Serialize};

use crate::{Error, MapId, Result};

/// The ranking state of a beatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankedStatus {
  NotSubmitted,
  Pending,
  UpdateAvailable,
  Ranked,
  Approved,
  Qualified,
  Loved,
}

impl RankedStatus {
  pub fn as_i64(self) -> i64 {
    match self {
      Self::NotSubmitted => -1,
      Self::Pending => 0,
      Self::UpdateAvailable => 1,
      Self::Ranked => 2,
      Self::Approved => 3,
      Self::Qualified => 4,
      Self::Loved => 5,
    }
  }

  pub fn from_i64(v: i64) -> Result<Self> {
    match v {
      -1 => Ok(Self::NotSubmitted),
      0 => Ok(Self::Pending),
      1 => Ok(Self::UpdateAvailable),
      2 => Ok(Self::Ranked),
      3 => Ok(Self::Approved),
      4 => Ok(Self::Qualified),
      5 => Ok(Self::Loved),
      other => Err(Error::UnknownRankedStatus(other)),
    }
  }

  pub fn has_leaderboard(self) -> bool {
    matches!(
      self,
      Self::Ranked | Self::Approved | Self::Qualified | Self::Loved
    )
  }

  pub fn awards_ranked_pp(self) -> bool {
    matches!(self, Self::Ranked | Self::Approved)
  }
}

/// The subset of beatmap metadata the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
  pub map_id: MapId,
  pub set_id: u32,
  pub md5:    String,
  pub status: RankedStatus,
  pub plays:  u32,
  pub passes: u32,
}

impl MapInfo {
  pub fn has_leaderboard(&self) -> bool { self.status.has_leaderboard() }

  pub fn awards_ranked_pp(&self) -> bool { self.status.awards_ranked_pp() }
}
