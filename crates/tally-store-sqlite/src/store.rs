//! [`SqliteStore`]: the SQLite implementation of [`ScoreStore`] and
//! [`MapLookup`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tally_core::{
  AchievementId, PlayerId, ScoreId,
  achievement::{Achievement, default_registry},
  map::MapInfo,
  player::{Player, PlayerStats},
  rating::RatedScore,
  ruleset::Ruleset,
  score::{Score, SubmissionStatus},
  services::MapLookup,
  store::{CommitOutcome, LeaderboardEntry, ScoreStore, SubmissionCommit},
};

use crate::{
  Error, Result,
  encode::{
    RawAchievement, RawMap, RawPlayer, RawScore, RawStats, SCORE_COLUMNS,
    STATS_COLUMNS, encode_condition, encode_dt, encode_naive, encode_u64,
    metric_column,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally score store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What happened inside the commit transaction, before the row is re-read.
enum RawCommit {
  Committed(ScoreId),
  Duplicate,
  Conflict(&'static str),
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and seed
  /// the achievement registry.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    let registry = default_registry()
      .into_iter()
      .map(|a| {
        let cond = encode_condition(&a.condition)?;
        Ok((a.achievement_id, a.file, a.name, a.description, cond))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO achievements
               (achievement_id, file, name, description, condition_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (id, file, name, description, cond) in &registry {
            stmt.execute(rusqlite::params![id, file, name, description, cond])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection. Lets tests install triggers that
  /// make a later statement fail.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn count_scores(&self) -> Result<i64> {
    Ok(
      self
        .conn
        .call(|conn| {
          Ok(conn.query_row("SELECT COUNT(*) FROM scores", [], |r| r.get(0))?)
        })
        .await?,
    )
  }
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = Error;

  // ── Players ───────────────────────────────────────────────────────────────

  async fn upsert_player(&self, player: Player) -> Result<()> {
    let rulesets: Vec<u8> = Ruleset::ALL.iter().map(|r| r.id()).collect();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO players (player_id, name, restricted) VALUES (?1, ?2, ?3)
           ON CONFLICT(player_id) DO UPDATE SET
             name = excluded.name,
             restricted = excluded.restricted",
          rusqlite::params![player.player_id, player.name, player.restricted],
        )?;
        for ruleset in rulesets {
          tx.execute(
            "INSERT OR IGNORE INTO stats (player_id, ruleset) VALUES (?1, ?2)",
            rusqlite::params![player.player_id, ruleset],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT player_id, name, restricted FROM players WHERE player_id = ?1",
              rusqlite::params![player_id],
              |row| {
                Ok(RawPlayer {
                  player_id:  row.get(0)?,
                  name:       row.get(1)?,
                  restricted: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw.map(RawPlayer::into_player))
  }

  async fn restrict_player(&self, player_id: PlayerId) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE players SET restricted = 1 WHERE player_id = ?1",
          rusqlite::params![player_id],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::PlayerNotFound(player_id));
    }
    Ok(())
  }

  // ── Results ───────────────────────────────────────────────────────────────

  async fn checksum_exists(&self, checksum: &str) -> Result<bool> {
    let checksum = checksum.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM scores WHERE online_checksum = ?1",
                rusqlite::params![checksum],
                |_| Ok(()),
              )
              .optional()?
              .is_some(),
          )
        })
        .await?,
    )
  }

  async fn best_score(
    &self,
    player_id: PlayerId,
    map_md5: &str,
    ruleset: Ruleset,
  ) -> Result<Option<Score>> {
    let map_md5 = map_md5.to_owned();
    let ruleset = ruleset.id();
    let raw: Option<RawScore> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCORE_COLUMNS}
                 FROM scores s JOIN players p ON p.player_id = s.player_id
                 WHERE s.player_id = ?1 AND s.map_md5 = ?2 AND s.ruleset = ?3
                   AND s.status = 2"
              ),
              rusqlite::params![player_id, map_md5, ruleset],
              RawScore::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawScore::into_score).transpose()
  }

  async fn count_at_or_above(
    &self,
    map_md5: &str,
    ruleset: Ruleset,
    value: f64,
  ) -> Result<u32> {
    let map_md5 = map_md5.to_owned();
    let column = metric_column(ruleset);
    let ruleset = ruleset.id();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            &format!(
              "SELECT COUNT(*)
               FROM scores s JOIN players p ON p.player_id = s.player_id
               WHERE s.map_md5 = ?1 AND s.ruleset = ?2 AND s.status = 2
                 AND p.restricted = 0 AND s.{column} >= ?3"
            ),
            rusqlite::params![map_md5, ruleset, value],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }

  async fn count_ahead_of(&self, score: &Score) -> Result<u32> {
    let map_md5 = score.play.map_md5.clone();
    let column = metric_column(score.play.ruleset);
    let ruleset = score.play.ruleset.id();
    let value = score.metric_value();
    let score_id = score.score_id;
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            &format!(
              "SELECT COUNT(*)
               FROM scores s JOIN players p ON p.player_id = s.player_id
               WHERE s.map_md5 = ?1 AND s.ruleset = ?2 AND s.status = 2
                 AND p.restricted = 0 AND s.score_id != ?4
                 AND (s.{column} > ?3
                      OR (s.{column} = ?3 AND s.score_id < ?4))"
            ),
            rusqlite::params![map_md5, ruleset, value, score_id],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }

  async fn get_score(&self, score_id: ScoreId) -> Result<Option<Score>> {
    let raw: Option<RawScore> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCORE_COLUMNS}
                 FROM scores s JOIN players p ON p.player_id = s.player_id
                 WHERE s.score_id = ?1"
              ),
              rusqlite::params![score_id],
              RawScore::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawScore::into_score).transpose()
  }

  async fn leaderboard(
    &self,
    map_md5: &str,
    ruleset: Ruleset,
    limit: u32,
  ) -> Result<Vec<LeaderboardEntry>> {
    let map_md5 = map_md5.to_owned();
    let column = metric_column(ruleset);
    let ruleset = ruleset.id();
    let raws: Vec<RawScore> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCORE_COLUMNS}
           FROM scores s JOIN players p ON p.player_id = s.player_id
           WHERE s.map_md5 = ?1 AND s.ruleset = ?2 AND s.status = 2
             AND p.restricted = 0
           ORDER BY s.{column} DESC, s.score_id ASC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![map_md5, ruleset, limit], RawScore::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .zip(1u32..)
      .map(|(raw, rank)| Ok(LeaderboardEntry { rank, score: raw.into_score()? }))
      .collect()
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn stats(
    &self,
    player_id: PlayerId,
    ruleset: Ruleset,
  ) -> Result<Option<PlayerStats>> {
    let ruleset = ruleset.id();
    let raw: Option<RawStats> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STATS_COLUMNS} FROM stats
                 WHERE player_id = ?1 AND ruleset = ?2"
              ),
              rusqlite::params![player_id, ruleset],
              RawStats::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStats::into_stats).transpose()
  }

  async fn qualifying_scores(
    &self,
    player_id: PlayerId,
    ruleset: Ruleset,
  ) -> Result<Vec<RatedScore>> {
    let ruleset = ruleset.id();
    Ok(
      self
        .conn
        .call(move |conn| {
          // Ranked (2) and approved (3) maps award pp.
          let mut stmt = conn.prepare(
            "SELECT s.score_id, s.pp, s.accuracy
             FROM scores s JOIN maps m ON m.md5 = s.map_md5
             WHERE s.player_id = ?1 AND s.ruleset = ?2 AND s.status = 2
               AND m.status IN (2, 3)
             ORDER BY s.pp DESC, s.score_id ASC",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![player_id, ruleset], |row| {
              Ok(RatedScore {
                score_id: row.get(0)?,
                pp:       row.get(1)?,
                accuracy: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn commit_submission(
    &self,
    commit: SubmissionCommit,
  ) -> Result<CommitOutcome> {
    let SubmissionCommit {
      play,
      status,
      demote,
      stats,
      expected_version,
    } = commit;

    let ruleset = play.ruleset.id();
    let grade = play.grade.as_str();
    let client_time = encode_naive(play.client_time);
    let server_time = encode_dt(play.server_time);
    let status_code = status.as_i64();
    let expected = encode_u64(expected_version);
    let p = play.clone();
    let st = stats.clone();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let duplicate = tx
          .query_row(
            "SELECT 1 FROM scores WHERE online_checksum = ?1",
            rusqlite::params![p.online_checksum],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if duplicate {
          return Ok(RawCommit::Duplicate);
        }

        if let Some(old) = demote {
          let demoted = tx.execute(
            "UPDATE scores SET status = 1 WHERE score_id = ?1 AND status = 2",
            rusqlite::params![old],
          )?;
          if demoted == 0 {
            return Ok(RawCommit::Conflict("superseded best already demoted"));
          }
        } else if status == SubmissionStatus::Best {
          let occupied = tx
            .query_row(
              "SELECT 1 FROM scores
               WHERE player_id = ?1 AND map_md5 = ?2 AND ruleset = ?3
                 AND status = 2",
              rusqlite::params![p.player_id, p.map_md5, ruleset],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if occupied {
            return Ok(RawCommit::Conflict("best slot taken"));
          }
        }

        let j = &p.judgements;
        tx.execute(
          "INSERT INTO scores (
             map_md5, player_id, ruleset, mods,
             n300, n100, n50, ngeki, nkatu, nmiss,
             raw_score, max_combo, perfect, grade, passed,
             accuracy, pp, star_rating, client_time, server_time,
             time_elapsed_ms, client_flags, online_checksum, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
          rusqlite::params![
            p.map_md5,
            p.player_id,
            ruleset,
            p.mods.bits(),
            j.n300,
            j.n100,
            j.n50,
            j.ngeki,
            j.nkatu,
            j.nmiss,
            encode_u64(p.raw_score),
            p.max_combo,
            p.perfect,
            grade,
            p.passed,
            p.accuracy,
            p.pp,
            p.star_rating,
            client_time,
            server_time,
            p.time_elapsed_ms,
            p.client_flags.bits(),
            p.online_checksum,
            status_code,
          ],
        )?;
        let score_id = tx.last_insert_rowid();

        let g = &st.grades;
        let updated = tx.execute(
          "UPDATE stats SET
             total_score = ?3, ranked_score = ?4, pp = ?5, accuracy = ?6,
             plays = ?7, playtime_secs = ?8, max_combo = ?9, total_hits = ?10,
             xh_count = ?11, x_count = ?12, sh_count = ?13, s_count = ?14,
             a_count = ?15, version = version + 1
           WHERE player_id = ?1 AND ruleset = ?2 AND version = ?16",
          rusqlite::params![
            st.player_id,
            ruleset,
            encode_u64(st.total_score),
            encode_u64(st.ranked_score),
            st.pp,
            st.accuracy,
            st.plays,
            encode_u64(st.playtime_secs),
            st.max_combo,
            encode_u64(st.total_hits),
            g.xh,
            g.x,
            g.sh,
            g.s,
            g.a,
            expected,
          ],
        )?;
        if updated == 0 {
          return Ok(RawCommit::Conflict("aggregate version moved"));
        }

        tx.commit()?;
        Ok(RawCommit::Committed(score_id))
      })
      .await?;

    match raw {
      RawCommit::Duplicate => Ok(CommitOutcome::Duplicate),
      RawCommit::Conflict(why) => {
        tracing::debug!(player_id = play.player_id, reason = why, "commit conflict");
        Ok(CommitOutcome::Conflict)
      }
      RawCommit::Committed(score_id) => Ok(CommitOutcome::Committed {
        score: Score {
          score_id,
          status,
          play,
        },
        stats: PlayerStats {
          version: expected_version + 1,
          ..stats
        },
      }),
    }
  }

  // ── Achievements ──────────────────────────────────────────────────────────

  async fn achievements(&self) -> Result<Vec<Achievement>> {
    let raws: Vec<RawAchievement> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT achievement_id, file, name, description, condition_json
           FROM achievements ORDER BY achievement_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAchievement {
              achievement_id: row.get(0)?,
              file:           row.get(1)?,
              name:           row.get(2)?,
              description:    row.get(3)?,
              condition_json: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAchievement::into_achievement).collect()
  }

  async fn unlocked_achievements(
    &self,
    player_id: PlayerId,
  ) -> Result<Vec<AchievementId>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT achievement_id FROM player_achievements
             WHERE player_id = ?1 ORDER BY achievement_id",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![player_id], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn unlock_achievement(
    &self,
    player_id: PlayerId,
    achievement_id: AchievementId,
  ) -> Result<bool> {
    let at = encode_dt(Utc::now());
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO player_achievements
             (player_id, achievement_id, unlocked_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![player_id, achievement_id, at],
        )?)
      })
      .await?;
    Ok(inserted == 1)
  }
}

// ─── MapLookup impl ──────────────────────────────────────────────────────────

impl MapLookup for SqliteStore {
  type Error = Error;

  async fn lookup(&self, md5: &str) -> Result<Option<MapInfo>> {
    let md5 = md5.to_owned();
    let raw: Option<RawMap> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT md5, map_id, set_id, status, plays, passes
               FROM maps WHERE md5 = ?1",
              rusqlite::params![md5],
              |row| {
                Ok(RawMap {
                  md5:    row.get(0)?,
                  map_id: row.get(1)?,
                  set_id: row.get(2)?,
                  status: row.get(3)?,
                  plays:  row.get(4)?,
                  passes: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawMap::into_map).transpose()
  }

  async fn register(&self, map: MapInfo) -> Result<()> {
    let status = map.status.as_i64();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO maps (md5, map_id, set_id, status)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(md5) DO UPDATE SET
             map_id = excluded.map_id,
             set_id = excluded.set_id,
             status = excluded.status",
          rusqlite::params![map.md5, map.map_id, map.set_id, status],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_play(&self, md5: &str, passed: bool) -> Result<()> {
    let md5 = md5.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE maps SET plays = plays + 1, passes = passes + ?2 WHERE md5 = ?1",
          rusqlite::params![md5, i64::from(passed)],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
