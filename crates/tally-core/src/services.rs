//! External collaborators consumed by the submission pipeline.
//!
//! Beatmap metadata, the performance calculator, replay storage and the
//! notification channel all live outside this workspace's concern; the
//! pipeline sees them only through these traits.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  MapId, PlayerId, ScoreId,
  judgement::Judgements,
  map::MapInfo,
  mods::Mods,
  ruleset::Ruleset,
};

// ─── Beatmaps ────────────────────────────────────────────────────────────────

pub trait MapLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve a beatmap by content md5. `None` if the map is unknown.
  fn lookup<'a>(
    &'a self,
    md5: &'a str,
  ) -> impl Future<Output = Result<Option<MapInfo>, Self::Error>> + Send + 'a;

  /// Register or update a beatmap. Play/pass counters of an existing row
  /// are left alone.
  fn register(
    &self,
    map: MapInfo,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bump the map's play counter, and its pass counter if `passed`.
  fn record_play<'a>(
    &'a self,
    md5: &'a str,
    passed: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Performance ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRequest {
  pub map_id:     MapId,
  pub ruleset:    Ruleset,
  pub mods:       Mods,
  pub judgements: Judgements,
  pub accuracy:   f64,
  pub max_combo:  u32,
  pub raw_score:  u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceResult {
  pub pp:          f64,
  pub star_rating: f64,
}

impl PerformanceResult {
  /// Used in place of a real result when the oracle is unavailable.
  pub const ZERO: PerformanceResult =
    PerformanceResult { pp: 0.0, star_rating: 0.0 };
}

/// The difficulty / performance-points calculator.
pub trait PerformanceOracle: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn compute(
    &self,
    request: PerformanceRequest,
  ) -> impl Future<Output = Result<PerformanceResult, Self::Error>> + Send + '_;
}

// ─── Replays ─────────────────────────────────────────────────────────────────

pub trait ReplayStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn store<'a>(
    &'a self,
    score_id: ScoreId,
    data: &'a [u8],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
  /// Private message to the submitting player about their placement.
  Placement { player_id: PlayerId, message: String },
  /// Public announcement (new #1 on a map).
  Announcement { message: String },
  /// Something worth a moderator's look.
  SuspiciousActivity { player_id: PlayerId, reason: String },
  AchievementsUnlocked {
    player_id:    PlayerId,
    achievements: Vec<String>,
  },
}

/// Fire-and-forget delivery. Implementations must not block.
pub trait NotificationSink: Send + Sync {
  fn notify(&self, notification: Notification);
}
