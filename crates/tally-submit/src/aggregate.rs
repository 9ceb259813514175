//! Aggregate updater: plans the new per-(player, ruleset) row.
//!
//! Planning is pure. The pipeline reads the inputs, calls [`plan`], and
//! hands the result to [`ScoreStore::commit_submission`] together with the
//! version it read, so a concurrent writer turns the commit into a conflict
//! instead of a lost update.
//!
//! [`ScoreStore::commit_submission`]: tally_core::store::ScoreStore::commit_submission

use tally_core::{
  ScoreId,
  map::MapInfo,
  player::PlayerStats,
  rating::{RatedScore, weighted_totals},
  score::{Play, Score, SubmissionStatus},
};

/// Stand-in id for the candidate while it has none. Sorts after every real
/// id, matching its position as the newest result.
const PENDING_SCORE_ID: ScoreId = ScoreId::MAX;

pub struct PlanInput<'a> {
  pub before:     &'a PlayerStats,
  pub play:       &'a Play,
  pub status:     SubmissionStatus,
  /// The best being superseded, when `status` is `Best`.
  pub prev_best:  Option<&'a Score>,
  pub map:        &'a MapInfo,
  /// The player's current qualifying bests on this ruleset. Still contains
  /// `prev_best` if it qualifies; never the candidate.
  pub qualifying: &'a [RatedScore],
}

pub fn plan(input: PlanInput<'_>) -> PlayerStats {
  let PlanInput {
    before,
    play,
    status,
    prev_best,
    map,
    qualifying,
  } = input;
  let mut stats = before.clone();
  let mode = play.ruleset.as_vanilla();

  stats.plays = stats.plays.saturating_add(1);
  stats.playtime_secs += u64::from(play.time_elapsed_ms / 1000);
  stats.total_score = stats.total_score.saturating_add(play.raw_score);
  stats.total_hits = stats
    .total_hits
    .saturating_add(play.judgements.total_hits(mode));

  if play.passed && map.has_leaderboard() {
    stats.max_combo = stats.max_combo.max(play.max_combo);
  }

  if status != SubmissionStatus::Best || !map.awards_ranked_pp() {
    return stats;
  }

  let prev = prev_best.map(|s| &s.play);

  let prev_raw = prev.map_or(0, |p| p.raw_score);
  stats.ranked_score = stats
    .ranked_score
    .saturating_add(play.raw_score)
    .saturating_sub(prev_raw);

  match prev {
    Some(prev) if prev.grade == play.grade => {}
    Some(prev) => {
      if let Some(n) = stats.grades.slot_mut(play.grade) {
        *n += 1;
      }
      if let Some(n) = stats.grades.slot_mut(prev.grade) {
        *n = n.saturating_sub(1);
      }
    }
    None => {
      if let Some(n) = stats.grades.slot_mut(play.grade) {
        *n += 1;
      }
    }
  }

  let demoted = prev_best.map(|s| s.score_id);
  let mut rated: Vec<RatedScore> = qualifying
    .iter()
    .filter(|r| Some(r.score_id) != demoted)
    .cloned()
    .collect();
  rated.push(RatedScore {
    score_id: PENDING_SCORE_ID,
    pp:       play.pp,
    accuracy: play.accuracy,
  });
  let totals = weighted_totals(&rated);
  stats.pp = totals.pp;
  stats.accuracy = totals.accuracy;

  stats
}
