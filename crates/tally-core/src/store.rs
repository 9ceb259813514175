//! The `ScoreStore` trait and the types exchanged with it.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! The pipeline (`tally-submit`) and the HTTP surface depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  AchievementId, PlayerId, ScoreId,
  achievement::Achievement,
  player::{Player, PlayerStats},
  rating::RatedScore,
  ruleset::Ruleset,
  score::{Play, Score, SubmissionStatus},
};

// ─── Commit types ────────────────────────────────────────────────────────────

/// Everything the aggregate updater persists for one submission, applied as
/// a single unit of work.
#[derive(Debug, Clone)]
pub struct SubmissionCommit {
  pub play:             Play,
  pub status:           SubmissionStatus,
  /// Previous best to demote to `Submitted` in the same unit of work.
  pub demote:           Option<ScoreId>,
  /// The recomputed aggregate row. Its `version` field is ignored; the store
  /// assigns `expected_version + 1`.
  pub stats:            PlayerStats,
  /// The aggregate version the plan was computed against.
  pub expected_version: u64,
}

/// Result of [`ScoreStore::commit_submission`].
#[derive(Debug, Clone)]
pub enum CommitOutcome {
  Committed { score: Score, stats: PlayerStats },
  /// A result with the same online checksum is already persisted.
  Duplicate,
  /// The aggregate row or the best slot changed since the plan was read.
  /// Nothing was written; the caller should re-read and re-plan.
  Conflict,
}

/// One row of a map leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  /// 1-indexed.
  pub rank:  u32,
  pub score: Score,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Tally score store backend.
///
/// Results are append-only apart from their status. Aggregate rows are
/// versioned; every successful commit bumps the version by exactly one.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ScoreStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Players ───────────────────────────────────────────────────────────

  /// Create or rename a player. Ensures a zeroed aggregate row exists for
  /// every ruleset.
  fn upsert_player(
    &self,
    player: Player,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_player(
    &self,
    player_id: PlayerId,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  /// Flag a player as restricted. Their results drop out of placement.
  fn restrict_player(
    &self,
    player_id: PlayerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Results ───────────────────────────────────────────────────────────

  /// Whether any persisted result carries this online checksum.
  fn checksum_exists<'a>(
    &'a self,
    checksum: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// The player's current `Best` on (map, ruleset), if any.
  fn best_score<'a>(
    &'a self,
    player_id: PlayerId,
    map_md5: &'a str,
    ruleset: Ruleset,
  ) -> impl Future<Output = Result<Option<Score>, Self::Error>> + Send + 'a;

  /// Number of `Best` results from non-restricted players on (map, ruleset)
  /// whose ranking metric is at least `value`.
  fn count_at_or_above<'a>(
    &'a self,
    map_md5: &'a str,
    ruleset: Ruleset,
    value: f64,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;

  /// Number of `Best` results from non-restricted players on the same
  /// (map, ruleset) that outrank `score`: a higher metric, or an equal
  /// metric submitted earlier.
  fn count_ahead_of<'a>(
    &'a self,
    score: &'a Score,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;

  fn get_score(
    &self,
    score_id: ScoreId,
  ) -> impl Future<Output = Result<Option<Score>, Self::Error>> + Send + '_;

  /// `Best` results from non-restricted players, metric descending, earlier
  /// submission first on ties.
  fn leaderboard<'a>(
    &'a self,
    map_md5: &'a str,
    ruleset: Ruleset,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + 'a;

  // ── Aggregates ────────────────────────────────────────────────────────

  fn stats(
    &self,
    player_id: PlayerId,
    ruleset: Ruleset,
  ) -> impl Future<Output = Result<Option<PlayerStats>, Self::Error>> + Send + '_;

  /// The player's `Best` results on maps that award ranked pp, pp
  /// descending.
  fn qualifying_scores(
    &self,
    player_id: PlayerId,
    ruleset: Ruleset,
  ) -> impl Future<Output = Result<Vec<RatedScore>, Self::Error>> + Send + '_;

  /// Persist a result, demote the superseded best and write the aggregate,
  /// all or nothing.
  fn commit_submission(
    &self,
    commit: SubmissionCommit,
  ) -> impl Future<Output = Result<CommitOutcome, Self::Error>> + Send + '_;

  // ── Achievements ──────────────────────────────────────────────────────

  fn achievements(
    &self,
  ) -> impl Future<Output = Result<Vec<Achievement>, Self::Error>> + Send + '_;

  fn unlocked_achievements(
    &self,
    player_id: PlayerId,
  ) -> impl Future<Output = Result<Vec<AchievementId>, Self::Error>> + Send + '_;

  /// Record an unlock. Returns `false` if it was already recorded.
  fn unlock_achievement(
    &self,
    player_id: PlayerId,
    achievement_id: AchievementId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
