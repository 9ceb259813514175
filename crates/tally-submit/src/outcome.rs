//! What a submission resolved to.

use serde::Serialize;
use tally_core::{
  ScoreId,
  player::PlayerStats,
  score::{Grade, Score, SubmissionStatus},
};

use crate::integrity::Anomaly;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  Accepted(Accepted),
  /// A result with the same online checksum was already persisted. Nothing
  /// changed.
  Duplicate,
  Rejected { reason: RejectReason },
  /// The payload could not be decoded.
  Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
  UnknownMap,
  /// The player name inside the payload is not the session's.
  PlayerMismatch,
  /// No aggregate row exists for the session's player.
  UnknownPlayer,
  Integrity { anomalies: Vec<Anomaly> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accepted {
  pub score_id:     ScoreId,
  pub status:       SubmissionStatus,
  /// Leaderboard position; `None` for failures and maps without a
  /// leaderboard.
  pub rank:         Option<u32>,
  pub prev_best:    Option<PrevBest>,
  pub stats_before: PlayerStats,
  pub stats_after:  PlayerStats,
  /// Display strings of achievements unlocked by this result.
  pub achievements: Vec<String>,
  pub anomalies:    Vec<Anomaly>,
}

/// The best the candidate was measured against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrevBest {
  pub score_id:  ScoreId,
  pub rank:      Option<u32>,
  pub raw_score: u64,
  pub pp:        f64,
  pub accuracy:  f64,
  pub max_combo: u32,
  pub grade:     Grade,
}

impl PrevBest {
  pub(crate) fn new(score: &Score, rank: Option<u32>) -> Self {
    Self {
      score_id: score.score_id,
      rank,
      raw_score: score.play.raw_score,
      pp: score.play.pp,
      accuracy: score.play.accuracy,
      max_combo: score.play.max_combo,
      grade: score.play.grade,
    }
  }
}

impl Outcome {
  pub fn accepted(&self) -> Option<&Accepted> {
    match self {
      Self::Accepted(a) => Some(a),
      _ => None,
    }
  }
}
