//! The submission pipeline.
//!
//! | Stage | Checksum lock | Aggregate lock |
//! |-------|---------------|----------------|
//! | decode, identity and map checks, integrity | no | no |
//! | duplicate check, rating | yes | no |
//! | status, placement, aggregate plan, commit | yes | yes |
//! | replay, map counters, achievements, notifications | no | no |
//!
//! Locks are always taken checksum first, then (player, ruleset).
//!
//! Everything before the commit is read-only, so any failure up to and
//! including the commit leaves storage untouched. Stages after the commit
//! are best-effort: their failures are logged and never undo the result.

use std::{future::Future, sync::Arc};

use chrono::Utc;
use tally_codec::RawSubmission;
use tally_core::{
  PlayerId,
  map::MapInfo,
  player::PlayerStats,
  ruleset::Ruleset,
  score::{Play, Score, SubmissionStatus},
  services::{
    MapLookup, Notification, NotificationSink, PerformanceOracle,
    PerformanceRequest, PerformanceResult, ReplayStore,
  },
  session::SessionContext,
  store::{CommitOutcome, LeaderboardEntry, ScoreStore, SubmissionCommit},
};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::{
  Result, SubmitError,
  achievements,
  admission::AdmissionGuard,
  aggregate::{self, PlanInput},
  config::{IntegrityPolicy, SubmitConfig},
  integrity::{self, Anomaly},
  outcome::{Accepted, Outcome, PrevBest, RejectReason},
  placement,
  request::SubmissionRequest,
  status::{self, Resolution},
};

/// Runs submissions against a store and the external collaborators.
///
/// Cheap to share behind an `Arc`; every submission for the same online
/// checksum must go through the same `Submitter` for admission to hold.
pub struct Submitter<S, O, R, N> {
  store:    Arc<S>,
  oracle:   Arc<O>,
  replays:  Arc<R>,
  notifier: Arc<N>,
  guard:    AdmissionGuard,
  /// Serialises commits against one aggregate row. The stored version
  /// check still catches writers outside this process.
  players:  AdmissionGuard<(PlayerId, Ruleset)>,
  config:   SubmitConfig,
}

/// A commit that went through, plus what was read to plan it.
struct Committed {
  score:        Score,
  stats_before: PlayerStats,
  stats_after:  PlayerStats,
  resolution:   Resolution,
  rank:         Option<u32>,
  prev_rank:    Option<u32>,
  /// Holder of #1 before this commit, when the candidate takes #1.
  prev_top:     Option<LeaderboardEntry>,
}

enum Attempt {
  Done(Box<Committed>),
  Duplicate,
  UnknownPlayer,
}

impl<S, O, R, N> Submitter<S, O, R, N>
where
  S: ScoreStore + MapLookup,
  O: PerformanceOracle,
  R: ReplayStore,
  N: NotificationSink,
{
  pub fn new(
    store: Arc<S>,
    oracle: Arc<O>,
    replays: Arc<R>,
    notifier: Arc<N>,
    config: SubmitConfig,
  ) -> Self {
    Self {
      store,
      oracle,
      replays,
      notifier,
      guard: AdmissionGuard::new(),
      players: AdmissionGuard::new(),
      config,
    }
  }

  /// Process one submission for the player behind `session`.
  ///
  /// Rejections, duplicates and undecodable payloads are `Ok` outcomes. An
  /// `Err` means nothing was committed and the same bytes may be retried.
  pub async fn submit(
    &self,
    request: &SubmissionRequest,
    session: &SessionContext,
  ) -> Result<Outcome> {
    self.run(request, session).await.inspect_err(|e| {
      error!(player_id = session.player_id, error = %e, "submission failed");
    })
  }

  async fn run(
    &self,
    request: &SubmissionRequest,
    session: &SessionContext,
  ) -> Result<Outcome> {
    let raw = match tally_codec::decode(&request.payload, &request.osu_version)
    {
      Ok(raw) => raw,
      Err(e) => {
        debug!(player_id = session.player_id, error = %e, "undecodable submission");
        return Ok(Outcome::Invalid {
          reason: e.to_string(),
        });
      }
    };

    if raw.player_name != session.player_name {
      warn!(
        player_id = session.player_id,
        claimed = %raw.player_name,
        "payload names a different player"
      );
      return Ok(rejected(RejectReason::PlayerMismatch));
    }

    let Some(player) = self
      .bounded("player lookup", self.store.get_player(session.player_id))
      .await?
    else {
      return Ok(rejected(RejectReason::UnknownPlayer));
    };
    let restricted = session.restricted || player.restricted;

    let Some(map) = self
      .bounded("map lookup", MapLookup::lookup(&*self.store, &raw.map_md5))
      .await?
    else {
      info!(map_md5 = %raw.map_md5, "submission for unknown map");
      return Ok(rejected(RejectReason::UnknownMap));
    };

    let anomalies = integrity::check(
      &raw,
      request,
      &session.fingerprint,
      &self.config.integrity,
    );
    if let Some(outcome) = self.enforce(&anomalies, session).await? {
      return Ok(outcome);
    }

    let mut play = build_play(raw, request, session);

    // ── Critical section ──────────────────────────────────────────────────

    let permit = timeout(
      self.config.admission_timeout(),
      self.guard.acquire(&play.online_checksum),
    )
    .await
    .map_err(|_| SubmitError::AdmissionTimeout)?;

    if self
      .bounded("duplicate check", self.store.checksum_exists(&play.online_checksum))
      .await?
    {
      info!(
        player_id = play.player_id,
        checksum = %play.online_checksum,
        "duplicate submission"
      );
      return Ok(Outcome::Duplicate);
    }

    let perf = self.performance(&play, &map).await;
    play.pp = perf.pp;
    play.star_rating = perf.star_rating;

    let aggregate_permit = timeout(
      self.config.admission_timeout(),
      self.players.acquire((play.player_id, play.ruleset)),
    )
    .await
    .map_err(|_| SubmitError::AdmissionTimeout)?;

    let committed = match self.commit(&play, &map, restricted).await? {
      Attempt::Done(c) => c,
      Attempt::Duplicate => return Ok(Outcome::Duplicate),
      Attempt::UnknownPlayer => {
        return Ok(rejected(RejectReason::UnknownPlayer));
      }
    };
    drop(aggregate_permit);
    drop(permit);

    // ── Post-commit, best-effort ──────────────────────────────────────────

    let score = &committed.score;
    info!(
      score_id = score.score_id,
      player_id = play.player_id,
      map_md5 = %play.map_md5,
      ruleset = %play.ruleset,
      status = ?score.status,
      rank = ?committed.rank,
      "score accepted"
    );

    self.keep_replay(score, request.replay.as_deref()).await;

    if !restricted {
      let counted = self
        .bounded(
          "map counters",
          self.store.record_play(&play.map_md5, play.passed),
        )
        .await;
      if let Err(e) = counted {
        warn!(map_md5 = %play.map_md5, error = %e, "failed to update map counters");
      }
    }

    let unlocked = if play.passed && map.awards_ranked_pp() && !restricted {
      self.unlock_achievements(&play).await
    } else {
      Vec::new()
    };

    self.announce(&play, &map, &committed, restricted);

    let Committed {
      score,
      stats_before,
      stats_after,
      resolution,
      rank,
      prev_rank,
      ..
    } = *committed;

    Ok(Outcome::Accepted(Accepted {
      score_id: score.score_id,
      status: score.status,
      rank,
      prev_best: resolution
        .prev_best
        .as_ref()
        .map(|prev| PrevBest::new(prev, prev_rank)),
      stats_before,
      stats_after,
      achievements: unlocked,
      anomalies,
    }))
  }

  /// Apply the integrity policy. `Some` ends the submission.
  async fn enforce(
    &self,
    anomalies: &[Anomaly],
    session: &SessionContext,
  ) -> Result<Option<Outcome>> {
    if anomalies.is_empty() {
      return Ok(None);
    }
    for anomaly in anomalies {
      warn!(
        player_id = session.player_id,
        anomaly = anomaly.kind(),
        "integrity anomaly: {anomaly}"
      );
    }

    let reject = || {
      rejected(RejectReason::Integrity {
        anomalies: anomalies.to_vec(),
      })
    };
    match self.config.integrity.policy {
      IntegrityPolicy::LogOnly => Ok(None),
      IntegrityPolicy::Reject => Ok(Some(reject())),
      IntegrityPolicy::Restrict => {
        self
          .bounded("restrict", self.store.restrict_player(session.player_id))
          .await?;
        let kinds: Vec<_> = anomalies.iter().map(Anomaly::kind).collect();
        self.notifier.notify(Notification::SuspiciousActivity {
          player_id: session.player_id,
          reason:    format!("restricted on submission: {}", kinds.join(", ")),
        });
        Ok(Some(reject()))
      }
    }
  }

  /// Ask the oracle for the result's rating. Degrades to zero.
  async fn performance(&self, play: &Play, map: &MapInfo) -> PerformanceResult {
    let request = PerformanceRequest {
      map_id:     map.map_id,
      ruleset:    play.ruleset,
      mods:       play.mods,
      judgements: play.judgements,
      accuracy:   play.accuracy,
      max_combo:  play.max_combo,
      raw_score:  play.raw_score,
    };
    match timeout(self.config.storage_timeout(), self.oracle.compute(request))
      .await
    {
      Ok(Ok(result)) => result,
      Ok(Err(e)) => {
        warn!(map_id = map.map_id, error = %e, "performance oracle failed, rating as zero");
        PerformanceResult::ZERO
      }
      Err(_) => {
        warn!(map_id = map.map_id, "performance oracle timed out, rating as zero");
        PerformanceResult::ZERO
      }
    }
  }

  /// Resolve, place, plan and commit, re-planning on conflict.
  async fn commit(
    &self,
    play: &Play,
    map: &MapInfo,
    restricted: bool,
  ) -> Result<Attempt> {
    let max_attempts = self.config.max_commit_attempts.max(1);
    let mut attempts = 0;

    loop {
      attempts += 1;

      let Some(stats_before) = self
        .bounded("stats read", self.store.stats(play.player_id, play.ruleset))
        .await?
      else {
        return Ok(Attempt::UnknownPlayer);
      };

      let existing = if play.passed {
        self
          .bounded(
            "best lookup",
            self
              .store
              .best_score(play.player_id, &play.map_md5, play.ruleset),
          )
          .await?
      } else {
        None
      };
      let resolution = status::resolve(play, existing);

      let (rank, prev_rank, prev_top) = if play.passed && map.has_leaderboard()
      {
        let rank = self
          .bounded("placement", placement::rank(&*self.store, play))
          .await?;
        // A restricted player's results are not on the leaderboard.
        let prev_rank = match &resolution.prev_best {
          Some(prev) if !restricted => Some(
            self
              .bounded("placement", self.store.count_ahead_of(prev))
              .await?
              + 1,
          ),
          _ => None,
        };
        let prev_top =
          if rank == 1 && resolution.status == SubmissionStatus::Best {
            self
              .bounded(
                "leaderboard read",
                self.store.leaderboard(&play.map_md5, play.ruleset, 1),
              )
              .await?
              .into_iter()
              .next()
          } else {
            None
          };
        (Some(rank), prev_rank, prev_top)
      } else {
        (None, None, None)
      };

      let qualifying = if resolution.status == SubmissionStatus::Best
        && map.awards_ranked_pp()
      {
        self
          .bounded(
            "qualifying scores",
            self.store.qualifying_scores(play.player_id, play.ruleset),
          )
          .await?
      } else {
        Vec::new()
      };

      let planned = aggregate::plan(PlanInput {
        before: &stats_before,
        play,
        status: resolution.status,
        prev_best: resolution.prev_best.as_ref(),
        map,
        qualifying: &qualifying,
      });

      let commit = SubmissionCommit {
        play:             play.clone(),
        status:           resolution.status,
        demote:           resolution.demote(),
        stats:            planned,
        expected_version: stats_before.version,
      };

      match self.bounded("commit", self.store.commit_submission(commit)).await? {
        CommitOutcome::Committed { score, stats } => {
          return Ok(Attempt::Done(Box::new(Committed {
            score,
            stats_before,
            stats_after: stats,
            resolution,
            rank,
            prev_rank,
            prev_top,
          })));
        }
        CommitOutcome::Duplicate => return Ok(Attempt::Duplicate),
        CommitOutcome::Conflict if attempts < max_attempts => {
          debug!(
            player_id = play.player_id,
            attempt = attempts,
            "aggregate changed since read, re-planning"
          );
        }
        CommitOutcome::Conflict => {
          return Err(SubmitError::Contention { attempts });
        }
      }
    }
  }

  async fn keep_replay(&self, score: &Score, replay: Option<&[u8]>) {
    if !score.play.passed {
      return;
    }

    let min = self.config.min_replay_size;
    let Some(data) = replay.filter(|r| r.len() >= min) else {
      warn!(
        score_id = score.score_id,
        player_id = score.play.player_id,
        "passing score submitted without a replay"
      );
      self.notifier.notify(Notification::SuspiciousActivity {
        player_id: score.play.player_id,
        reason:    format!("score {} submitted without a replay", score.score_id),
      });
      return;
    };

    match timeout(
      self.config.storage_timeout(),
      self.replays.store(score.score_id, data),
    )
    .await
    {
      Ok(Ok(())) => {}
      Ok(Err(e)) => {
        warn!(score_id = score.score_id, error = %e, "failed to store replay");
      }
      Err(_) => {
        warn!(score_id = score.score_id, "replay store timed out");
      }
    }
  }

  /// Unlock and return display strings of newly earned achievements.
  async fn unlock_achievements(&self, play: &Play) -> Vec<String> {
    match self.try_unlock_achievements(play).await {
      Ok(unlocked) => unlocked,
      Err(e) => {
        warn!(player_id = play.player_id, error = %e, "achievement evaluation failed");
        Vec::new()
      }
    }
  }

  async fn try_unlock_achievements(&self, play: &Play) -> Result<Vec<String>> {
    let registry = self
      .bounded("achievement registry", self.store.achievements())
      .await?;
    let held = self
      .bounded(
        "unlocked achievements",
        self.store.unlocked_achievements(play.player_id),
      )
      .await?;

    let mut unlocked = Vec::new();
    for achievement in achievements::newly_satisfied(&registry, &held, play) {
      let fresh = self
        .bounded(
          "unlock achievement",
          self
            .store
            .unlock_achievement(play.player_id, achievement.achievement_id),
        )
        .await?;
      if fresh {
        unlocked.push(achievement.display_string());
      }
    }

    if !unlocked.is_empty() {
      self.notifier.notify(Notification::AchievementsUnlocked {
        player_id:    play.player_id,
        achievements: unlocked.clone(),
      });
    }
    Ok(unlocked)
  }

  fn announce(
    &self,
    play: &Play,
    map: &MapInfo,
    committed: &Committed,
    restricted: bool,
  ) {
    if committed.score.status != SubmissionStatus::Best
      || !map.has_leaderboard()
    {
      return;
    }
    let Some(rank) = committed.rank else {
      return;
    };

    let metric = placement::describe_metric(play);
    self.notifier.notify(Notification::Placement {
      player_id: play.player_id,
      message:   format!("You achieved #{rank}! ({metric})"),
    });

    if rank != 1 || restricted {
      return;
    }
    let headline = format!(
      "{} achieved #1 on beatmap {} ({metric}, {:.2}%)",
      play.player_name, map.map_id, play.accuracy
    );
    let message = match &committed.prev_top {
      Some(prev) if prev.score.play.player_id != play.player_id => {
        format!("{headline} (Previous #1: {})", prev.score.play.player_name)
      }
      _ => headline,
    };
    self.notifier.notify(Notification::Announcement { message });
  }

  /// Run a storage call under the configured timeout.
  async fn bounded<T, E>(
    &self,
    op: &'static str,
    call: impl Future<Output = std::result::Result<T, E>>,
  ) -> Result<T>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match timeout(self.config.storage_timeout(), call).await {
      Ok(result) => result.map_err(SubmitError::storage),
      Err(_) => Err(SubmitError::StorageTimeout(op)),
    }
  }
}

fn rejected(reason: RejectReason) -> Outcome { Outcome::Rejected { reason } }

fn build_play(
  raw: RawSubmission,
  request: &SubmissionRequest,
  session: &SessionContext,
) -> Play {
  let accuracy = raw.judgements.accuracy(raw.ruleset.as_vanilla());
  let time_elapsed_ms = if raw.passed {
    request.score_time_ms
  } else {
    request.fail_time_ms
  };

  Play {
    map_md5: raw.map_md5,
    player_id: session.player_id,
    player_name: raw.player_name,
    ruleset: raw.ruleset,
    mods: raw.mods,
    judgements: raw.judgements,
    raw_score: raw.raw_score,
    max_combo: raw.max_combo,
    perfect: raw.perfect,
    grade: raw.grade,
    passed: raw.passed,
    accuracy,
    pp: 0.0,
    star_rating: 0.0,
    client_time: raw.client_time,
    server_time: Utc::now(),
    time_elapsed_ms,
    client_flags: raw.client_flags,
    online_checksum: raw.online_checksum,
  }
}
