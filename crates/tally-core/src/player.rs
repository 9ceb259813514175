//! Player identity and per-ruleset aggregate statistics.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, ruleset::Ruleset, score::Grade};

/// A player account as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub player_id:  PlayerId,
  pub name:       String,
  /// Restricted players' results are excluded from placement and they never
  /// receive achievements.
  pub restricted: bool,
}

/// Counters for the grades shown on a player's profile (A and above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GradeCounts {
  pub xh: u32,
  pub x:  u32,
  pub sh: u32,
  pub s:  u32,
  pub a:  u32,
}

impl GradeCounts {
  /// The counter for `grade`, or `None` for grades below A.
  pub fn slot_mut(&mut self, grade: Grade) -> Option<&mut u32> {
    match grade {
      Grade::Xh => Some(&mut self.xh),
      Grade::X => Some(&mut self.x),
      Grade::Sh => Some(&mut self.sh),
      Grade::S => Some(&mut self.s),
      Grade::A => Some(&mut self.a),
      _ => None,
    }
  }

  pub fn get(&self, grade: Grade) -> Option<u32> {
    match grade {
      Grade::Xh => Some(self.xh),
      Grade::X => Some(self.x),
      Grade::Sh => Some(self.sh),
      Grade::S => Some(self.s),
      Grade::A => Some(self.a),
      _ => None,
    }
  }
}

/// One row per (player, ruleset). Mutated only by the aggregate updater.
///
/// `version` increments on every committed change and is used for
/// optimistic concurrency control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
  pub player_id:     PlayerId,
  pub ruleset:       Ruleset,
  pub total_score:   u64,
  pub ranked_score:  u64,
  /// Weighted performance rating.
  pub pp:            f64,
  /// Weighted accuracy, 0–100.
  pub accuracy:      f64,
  pub plays:         u32,
  pub playtime_secs: u64,
  pub max_combo:     u32,
  pub total_hits:    u64,
  pub grades:        GradeCounts,
  pub version:       u64,
}

impl PlayerStats {
  /// A fresh, zeroed aggregate row.
  pub fn empty(player_id: PlayerId, ruleset: Ruleset) -> Self {
    Self {
      player_id,
      ruleset,
      total_score: 0,
      ranked_score: 0,
      pp: 0.0,
      accuracy: 0.0,
      plays: 0,
      playtime_secs: 0,
      max_combo: 0,
      total_hits: 0,
      grades: GradeCounts::default(),
      version: 0,
    }
  }
}
