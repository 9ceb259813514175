//! Score types: one play result and its submission status.
//!
//! A [`Play`] is everything known about an attempt before it is persisted.
//! Once the store assigns an id it becomes a [`Score`]. Scores are immutable
//! apart from their [`SubmissionStatus`], which is demoted from `Best` to
//! `Submitted` when a better result replaces it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, PlayerId, Result, ScoreId,
  judgement::Judgements,
  mods::Mods,
  ruleset::{RankingMetric, Ruleset},
};

// ─── Grade ───────────────────────────────────────────────────────────────────

/// Letter grade, ordered worst to best so that `>=` comparisons read
/// naturally (`grade >= Grade::A`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Grade {
  N,
  F,
  D,
  C,
  B,
  A,
  S,
  /// S with Hidden or Flashlight.
  Sh,
  /// SS.
  X,
  /// SS with Hidden or Flashlight.
  Xh,
}

impl Grade {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownGrade(s.to_owned()))
  }
}

// ─── SubmissionStatus ────────────────────────────────────────────────────────

/// Where a result stands relative to the player's other results on the same
/// map and ruleset. At most one `Best` exists per (player, map, ruleset).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Failed,
  Submitted,
  Best,
}

impl SubmissionStatus {
  pub fn as_i64(self) -> i64 {
    match self {
      Self::Failed => 0,
      Self::Submitted => 1,
      Self::Best => 2,
    }
  }

  pub fn from_i64(v: i64) -> Result<Self> {
    match v {
      0 => Ok(Self::Failed),
      1 => Ok(Self::Submitted),
      2 => Ok(Self::Best),
      other => Err(Error::UnknownStatus(other)),
    }
  }
}

// ─── ClientFlags ─────────────────────────────────────────────────────────────

/// Legacy client-side anti-cheat flags. Known to false-positive; stored for
/// review, never acted on automatically.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClientFlags(pub u32);

impl ClientFlags {
  pub const CLEAN: ClientFlags = ClientFlags(0);
  pub const SPEED_HACK_DETECTED: ClientFlags = ClientFlags(1 << 1);
  /// Ignored by servers; the client sets it spuriously.
  pub const INCORRECT_MOD_VALUE: ClientFlags = ClientFlags(1 << 2);
  pub const MULTIPLE_OSU_CLIENTS: ClientFlags = ClientFlags(1 << 3);
  pub const CHECKSUM_FAILURE: ClientFlags = ClientFlags(1 << 4);
  pub const FLASHLIGHT_CHECKSUM_INCORRECT: ClientFlags = ClientFlags(1 << 5);
  pub const FLASHLIGHT_IMAGE_HACK: ClientFlags = ClientFlags(1 << 8);
  pub const SPINNER_HACK: ClientFlags = ClientFlags(1 << 9);
  pub const TRANSPARENT_WINDOW: ClientFlags = ClientFlags(1 << 10);
  pub const FAST_PRESS: ClientFlags = ClientFlags(1 << 11);
  pub const RAW_MOUSE_DISCREPANCY: ClientFlags = ClientFlags(1 << 12);
  pub const RAW_KEYBOARD_DISCREPANCY: ClientFlags = ClientFlags(1 << 13);

  /// Decode flags from the number of padding spaces trailing the client
  /// build string, masking out `INCORRECT_MOD_VALUE`.
  pub fn from_padding(spaces: usize) -> Self {
    let raw = u32::try_from(spaces).unwrap_or(u32::MAX);
    ClientFlags(raw & !Self::INCORRECT_MOD_VALUE.0)
  }

  pub fn bits(self) -> u32 { self.0 }

  pub fn is_clean(self) -> bool { self.0 == 0 }
}

// ─── Play ────────────────────────────────────────────────────────────────────

/// A play result as submitted and scored, before (or independent of)
/// persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
  /// Fingerprint (content md5) of the beatmap difficulty.
  pub map_md5:         String,
  pub player_id:       PlayerId,
  pub player_name:     String,
  pub ruleset:         Ruleset,
  pub mods:            Mods,
  pub judgements:      Judgements,
  /// Raw in-game score.
  pub raw_score:       u64,
  pub max_combo:       u32,
  /// Full combo.
  pub perfect:         bool,
  pub grade:           Grade,
  pub passed:          bool,
  /// 0–100.
  pub accuracy:        f64,
  pub pp:              f64,
  pub star_rating:     f64,
  /// Client-local play timestamp.
  pub client_time:     NaiveDateTime,
  /// Server-assigned receipt timestamp.
  pub server_time:     DateTime<Utc>,
  pub time_elapsed_ms: u32,
  pub client_flags:    ClientFlags,
  /// Client-asserted checksum; unique across all persisted scores.
  pub online_checksum: String,
}

impl Play {
  /// The value this play is ranked by on its ruleset's leaderboards.
  pub fn metric_value(&self) -> f64 {
    match self.ruleset.ranking_metric() {
      RankingMetric::Score => self.raw_score as f64,
      RankingMetric::Performance => self.pp,
    }
  }
}

// ─── Score ───────────────────────────────────────────────────────────────────

/// A persisted play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
  pub score_id: ScoreId,
  pub status:   SubmissionStatus,
  #[serde(flatten)]
  pub play:     Play,
}

impl Score {
  pub fn metric_value(&self) -> f64 { self.play.metric_value() }
}
