//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, Utc};
use tally_core::{
  achievement::default_registry,
  judgement::Judgements,
  map::{MapInfo, RankedStatus},
  mods::Mods,
  player::{Player, PlayerStats},
  ruleset::Ruleset,
  score::{ClientFlags, Grade, Play, SubmissionStatus},
  services::MapLookup,
  store::{CommitOutcome, ScoreStore, SubmissionCommit},
};

use crate::SqliteStore;

const RANKED: &str = "11111111111111111111111111111111";
const LOVED: &str = "22222222222222222222222222222222";

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  for (md5, map_id, status) in [
    (RANKED, 1, RankedStatus::Ranked),
    (LOVED, 2, RankedStatus::Loved),
  ] {
    s.register(MapInfo {
      map_id,
      set_id: 100,
      md5: md5.into(),
      status,
      plays: 0,
      passes: 0,
    })
    .await
    .unwrap();
  }
  s
}

async fn add_player(s: &SqliteStore, player_id: u32) {
  s.upsert_player(Player {
    player_id,
    name: format!("player{player_id}"),
    restricted: false,
  })
  .await
  .unwrap();
}

fn play(player_id: u32, map_md5: &str, raw_score: u64, pp: f64, checksum: &str) -> Play {
  Play {
    map_md5: map_md5.into(),
    player_id,
    player_name: format!("player{player_id}"),
    ruleset: Ruleset::VanillaOsu,
    mods: Mods::NOMOD,
    judgements: Judgements {
      n300: 100,
      n100: 5,
      ..Default::default()
    },
    raw_score,
    max_combo: 150,
    perfect: false,
    grade: Grade::A,
    passed: true,
    accuracy: 96.5,
    pp,
    star_rating: 4.2,
    client_time: NaiveDate::from_ymd_opt(2024, 5, 1)
      .and_then(|d| d.and_hms_opt(12, 0, 0))
      .unwrap(),
    server_time: Utc::now(),
    time_elapsed_ms: 90_000,
    client_flags: ClientFlags::CLEAN,
    online_checksum: checksum.into(),
  }
}

async fn stats(s: &SqliteStore, player_id: u32) -> PlayerStats {
  s.stats(player_id, Ruleset::VanillaOsu).await.unwrap().unwrap()
}

/// Commit `play` with a stats row that bumps the play count and total score.
async fn commit(
  s: &SqliteStore,
  play: Play,
  status: SubmissionStatus,
  demote: Option<i64>,
) -> CommitOutcome {
  let before = stats(s, play.player_id).await;
  let mut after = before.clone();
  after.plays += 1;
  after.total_score += play.raw_score;
  s.commit_submission(SubmissionCommit {
    play,
    status,
    demote,
    stats: after,
    expected_version: before.version,
  })
  .await
  .unwrap()
}

fn committed_id(outcome: CommitOutcome) -> i64 {
  match outcome {
    CommitOutcome::Committed { score, .. } => score.score_id,
    other => panic!("expected commit, got {other:?}"),
  }
}

// ─── Players & aggregates ────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_player_creates_zeroed_stats_for_every_ruleset() {
  let s = store().await;
  add_player(&s, 7).await;

  for ruleset in Ruleset::ALL {
    let st = s.stats(7, ruleset).await.unwrap().unwrap();
    assert_eq!(st, PlayerStats::empty(7, ruleset));
  }
  assert!(s.stats(8, Ruleset::VanillaOsu).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_player_twice_keeps_stats() {
  let s = store().await;
  add_player(&s, 7).await;
  committed_id(commit(&s, play(7, RANKED, 1000, 10.0, "c1"), SubmissionStatus::Best, None).await);
  s.upsert_player(Player {
    player_id:  7,
    name:       "renamed".into(),
    restricted: false,
  })
  .await
  .unwrap();

  assert_eq!(stats(&s, 7).await.plays, 1);
  assert_eq!(s.get_player(7).await.unwrap().unwrap().name, "renamed");
}

#[tokio::test]
async fn restrict_unknown_player_errors() {
  let s = store().await;
  assert!(s.restrict_player(99).await.is_err());
  add_player(&s, 1).await;
  s.restrict_player(1).await.unwrap();
  assert!(s.get_player(1).await.unwrap().unwrap().restricted);
}

// ─── Commit ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commit_persists_score_and_bumps_version() {
  let s = store().await;
  add_player(&s, 1).await;

  let outcome = commit(&s, play(1, RANKED, 5000, 50.0, "c1"), SubmissionStatus::Best, None).await;
  let CommitOutcome::Committed { score, stats: after } = outcome else {
    panic!("not committed");
  };
  assert_eq!(after.version, 1);
  assert_eq!(after.plays, 1);

  let fetched = s.get_score(score.score_id).await.unwrap().unwrap();
  assert_eq!(fetched, score);
  assert_eq!(fetched.play.player_name, "player1");

  let best = s.best_score(1, RANKED, Ruleset::VanillaOsu).await.unwrap().unwrap();
  assert_eq!(best.score_id, score.score_id);
  assert_eq!(stats(&s, 1).await, after);
  assert!(s.checksum_exists("c1").await.unwrap());
  assert!(!s.checksum_exists("c2").await.unwrap());
}

#[tokio::test]
async fn duplicate_checksum_writes_nothing() {
  let s = store().await;
  add_player(&s, 1).await;
  committed_id(commit(&s, play(1, RANKED, 5000, 50.0, "dup"), SubmissionStatus::Best, None).await);
  let before = stats(&s, 1).await;

  let again = commit(&s, play(1, RANKED, 9000, 90.0, "dup"), SubmissionStatus::Submitted, None).await;
  assert!(matches!(again, CommitOutcome::Duplicate));
  assert_eq!(s.count_scores().await.unwrap(), 1);
  assert_eq!(stats(&s, 1).await, before);
}

#[tokio::test]
async fn demotion_keeps_a_single_best() {
  let s = store().await;
  add_player(&s, 1).await;
  let first = committed_id(commit(&s, play(1, RANKED, 5000, 50.0, "c1"), SubmissionStatus::Best, None).await);
  let second = committed_id(
    commit(&s, play(1, RANKED, 6000, 60.0, "c2"), SubmissionStatus::Best, Some(first)).await,
  );

  let best = s.best_score(1, RANKED, Ruleset::VanillaOsu).await.unwrap().unwrap();
  assert_eq!(best.score_id, second);
  let old = s.get_score(first).await.unwrap().unwrap();
  assert_eq!(old.status, SubmissionStatus::Submitted);
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
  let s = store().await;
  add_player(&s, 1).await;
  let before = stats(&s, 1).await;
  committed_id(commit(&s, play(1, RANKED, 5000, 50.0, "c1"), SubmissionStatus::Best, None).await);

  let outcome = s
    .commit_submission(SubmissionCommit {
      play:             play(1, LOVED, 100, 1.0, "c2"),
      status:           SubmissionStatus::Best,
      demote:           None,
      stats:            before.clone(),
      expected_version: before.version,
    })
    .await
    .unwrap();
  assert!(matches!(outcome, CommitOutcome::Conflict));
  assert_eq!(s.count_scores().await.unwrap(), 1);
}

#[tokio::test]
async fn occupied_best_slot_without_demotion_is_a_conflict() {
  let s = store().await;
  add_player(&s, 1).await;
  committed_id(commit(&s, play(1, RANKED, 5000, 50.0, "c1"), SubmissionStatus::Best, None).await);

  let outcome = commit(&s, play(1, RANKED, 6000, 60.0, "c2"), SubmissionStatus::Best, None).await;
  assert!(matches!(outcome, CommitOutcome::Conflict));
}

#[tokio::test]
async fn demoting_an_already_demoted_best_is_a_conflict() {
  let s = store().await;
  add_player(&s, 1).await;
  let first = committed_id(commit(&s, play(1, RANKED, 5000, 50.0, "c1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(1, RANKED, 6000, 60.0, "c2"), SubmissionStatus::Best, Some(first)).await);

  let outcome = commit(&s, play(1, RANKED, 7000, 70.0, "c3"), SubmissionStatus::Best, Some(first)).await;
  assert!(matches!(outcome, CommitOutcome::Conflict));
  assert_eq!(s.count_scores().await.unwrap(), 2);
}

#[tokio::test]
async fn failure_mid_commit_rolls_everything_back() {
  let s = store().await;
  add_player(&s, 1).await;
  let first = committed_id(commit(&s, play(1, RANKED, 5000, 50.0, "c1"), SubmissionStatus::Best, None).await);
  let stats_before = stats(&s, 1).await;
  let best_before = s.get_score(first).await.unwrap().unwrap();

  s.execute_batch(
    "CREATE TRIGGER fail_stats BEFORE UPDATE ON stats
     BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
  )
  .await
  .unwrap();

  let before = stats(&s, 1).await;
  let mut after = before.clone();
  after.plays += 1;
  let result = s
    .commit_submission(SubmissionCommit {
      play:             play(1, RANKED, 9000, 90.0, "c2"),
      status:           SubmissionStatus::Best,
      demote:           Some(first),
      stats:            after,
      expected_version: before.version,
    })
    .await;
  assert!(result.is_err());

  assert_eq!(s.count_scores().await.unwrap(), 1);
  assert_eq!(s.get_score(first).await.unwrap().unwrap(), best_before);
  assert_eq!(stats(&s, 1).await, stats_before);
  assert!(!s.checksum_exists("c2").await.unwrap());
}

// ─── Placement & leaderboards ────────────────────────────────────────────────

#[tokio::test]
async fn count_at_or_above_ignores_restricted_and_non_best() {
  let s = store().await;
  for id in [1, 2, 3] {
    add_player(&s, id).await;
  }
  committed_id(commit(&s, play(1, RANKED, 300, 0.0, "a1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(2, RANKED, 200, 0.0, "b1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(2, RANKED, 250, 0.0, "b2"), SubmissionStatus::Submitted, None).await);
  committed_id(commit(&s, play(3, RANKED, 400, 0.0, "c1"), SubmissionStatus::Best, None).await);
  s.restrict_player(3).await.unwrap();

  let count = |v| s.count_at_or_above(RANKED, Ruleset::VanillaOsu, v);
  assert_eq!(count(100.0).await.unwrap(), 2);
  assert_eq!(count(200.0).await.unwrap(), 2);
  assert_eq!(count(201.0).await.unwrap(), 1);
  assert_eq!(count(301.0).await.unwrap(), 0);
}

#[tokio::test]
async fn count_ahead_of_breaks_ties_by_submission_order() {
  let s = store().await;
  for id in [1, 2, 3, 4] {
    add_player(&s, id).await;
  }
  let first = committed_id(commit(&s, play(1, RANKED, 500, 0.0, "a1"), SubmissionStatus::Best, None).await);
  let second = committed_id(commit(&s, play(2, RANKED, 500, 0.0, "b1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(3, RANKED, 800, 0.0, "c1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(4, RANKED, 900, 0.0, "d1"), SubmissionStatus::Best, None).await);
  s.restrict_player(4).await.unwrap();

  let first = s.get_score(first).await.unwrap().unwrap();
  let second = s.get_score(second).await.unwrap().unwrap();
  assert_eq!(s.count_ahead_of(&first).await.unwrap(), 1);
  assert_eq!(s.count_ahead_of(&second).await.unwrap(), 2);
}

#[tokio::test]
async fn leaderboard_orders_by_metric_then_submission() {
  let s = store().await;
  for id in [1, 2, 3] {
    add_player(&s, id).await;
  }
  committed_id(commit(&s, play(1, RANKED, 500, 0.0, "a1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(2, RANKED, 700, 0.0, "b1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(3, RANKED, 500, 0.0, "c1"), SubmissionStatus::Best, None).await);

  let board = s.leaderboard(RANKED, Ruleset::VanillaOsu, 10).await.unwrap();
  let order: Vec<(u32, u32)> =
    board.iter().map(|e| (e.rank, e.score.play.player_id)).collect();
  assert_eq!(order, vec![(1, 2), (2, 1), (3, 3)]);

  let top = s.leaderboard(RANKED, Ruleset::VanillaOsu, 1).await.unwrap();
  assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn relax_leaderboards_rank_by_pp() {
  let s = store().await;
  add_player(&s, 1).await;
  add_player(&s, 2).await;
  for (pid, raw, pp, chk) in [(1, 900, 100.0, "r1"), (2, 100, 200.0, "r2")] {
    let mut p = play(pid, RANKED, raw, pp, chk);
    p.ruleset = Ruleset::RelaxOsu;
    let before = s.stats(pid, Ruleset::RelaxOsu).await.unwrap().unwrap();
    let outcome = s
      .commit_submission(SubmissionCommit {
        play:             p,
        status:           SubmissionStatus::Best,
        demote:           None,
        stats:            before.clone(),
        expected_version: before.version,
      })
      .await
      .unwrap();
    committed_id(outcome);
  }

  let board = s.leaderboard(RANKED, Ruleset::RelaxOsu, 10).await.unwrap();
  assert_eq!(board[0].score.play.player_id, 2);
  assert_eq!(s.count_at_or_above(RANKED, Ruleset::RelaxOsu, 150.0).await.unwrap(), 1);
}

#[tokio::test]
async fn qualifying_scores_only_cover_pp_awarding_maps() {
  let s = store().await;
  add_player(&s, 1).await;
  committed_id(commit(&s, play(1, RANKED, 500, 40.0, "q1"), SubmissionStatus::Best, None).await);
  committed_id(commit(&s, play(1, LOVED, 500, 80.0, "q2"), SubmissionStatus::Best, None).await);

  let rated = s.qualifying_scores(1, Ruleset::VanillaOsu).await.unwrap();
  assert_eq!(rated.len(), 1);
  assert_eq!(rated[0].pp, 40.0);
}

// ─── Maps ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn map_lookup_and_counters() {
  let s = store().await;
  assert!(s.lookup("ffffffffffffffffffffffffffffffff").await.unwrap().is_none());

  s.record_play(RANKED, true).await.unwrap();
  s.record_play(RANKED, false).await.unwrap();
  let map = s.lookup(RANKED).await.unwrap().unwrap();
  assert_eq!((map.plays, map.passes), (2, 1));
  assert!(map.awards_ranked_pp());
}

// ─── Achievements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn registry_is_seeded_once() {
  let s = store().await;
  let seeded = s.achievements().await.unwrap();
  assert_eq!(seeded, default_registry());
  s.init_schema().await.unwrap();
  assert_eq!(s.achievements().await.unwrap().len(), seeded.len());
}

#[tokio::test]
async fn unlocks_are_idempotent() {
  let s = store().await;
  add_player(&s, 1).await;
  assert!(s.unlock_achievement(1, 5).await.unwrap());
  assert!(!s.unlock_achievement(1, 5).await.unwrap());
  assert!(s.unlock_achievement(1, 2).await.unwrap());
  assert_eq!(s.unlocked_achievements(1).await.unwrap(), vec![2, 5]);
}
