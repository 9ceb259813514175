//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Server timestamps are stored as RFC 3339 strings, client timestamps as
//! zone-less ISO 8601. Unsigned 64-bit counters are stored as `INTEGER`
//! (i64) and saturate on the way in. Achievement conditions are compact
//! JSON.

use chrono::{DateTime, NaiveDateTime, Utc};
use tally_core::{
  achievement::{Achievement, Condition},
  judgement::Judgements,
  map::{MapInfo, RankedStatus},
  mods::Mods,
  player::{GradeCounts, Player, PlayerStats},
  ruleset::{RankingMetric, Ruleset},
  score::{ClientFlags, Grade, Play, Score, SubmissionStatus},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_u64(v: u64) -> i64 { i64::try_from(v).unwrap_or(i64::MAX) }

pub fn decode_u64(v: i64) -> u64 { u64::try_from(v).unwrap_or(0) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn encode_naive(dt: NaiveDateTime) -> String {
  dt.format(NAIVE_FORMAT).to_string()
}

pub fn decode_naive(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Column a ruleset's leaderboards are ordered by.
pub fn metric_column(ruleset: Ruleset) -> &'static str {
  match ruleset.ranking_metric() {
    RankingMetric::Score => "raw_score",
    RankingMetric::Performance => "pp",
  }
}

// ─── Scores ──────────────────────────────────────────────────────────────────

/// Column list matching [`RawScore::from_row`]. Requires `scores s` joined
/// with `players p`.
pub const SCORE_COLUMNS: &str = "
  s.score_id, s.map_md5, s.player_id, p.name, s.ruleset, s.mods,
  s.n300, s.n100, s.n50, s.ngeki, s.nkatu, s.nmiss,
  s.raw_score, s.max_combo, s.perfect, s.grade, s.passed,
  s.accuracy, s.pp, s.star_rating, s.client_time, s.server_time,
  s.time_elapsed_ms, s.client_flags, s.online_checksum, s.status";

/// Raw values read directly from a `scores` row joined with `players`.
pub struct RawScore {
  pub score_id:        i64,
  pub map_md5:         String,
  pub player_id:       u32,
  pub player_name:     String,
  pub ruleset:         u8,
  pub mods:            u32,
  pub n300:            u32,
  pub n100:            u32,
  pub n50:             u32,
  pub ngeki:           u32,
  pub nkatu:           u32,
  pub nmiss:           u32,
  pub raw_score:       i64,
  pub max_combo:       u32,
  pub perfect:         bool,
  pub grade:           String,
  pub passed:          bool,
  pub accuracy:        f64,
  pub pp:              f64,
  pub star_rating:     f64,
  pub client_time:     String,
  pub server_time:     String,
  pub time_elapsed_ms: u32,
  pub client_flags:    u32,
  pub online_checksum: String,
  pub status:          i64,
}

impl RawScore {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      score_id:        row.get(0)?,
      map_md5:         row.get(1)?,
      player_id:       row.get(2)?,
      player_name:     row.get(3)?,
      ruleset:         row.get(4)?,
      mods:            row.get(5)?,
      n300:            row.get(6)?,
      n100:            row.get(7)?,
      n50:             row.get(8)?,
      ngeki:           row.get(9)?,
      nkatu:           row.get(10)?,
      nmiss:           row.get(11)?,
      raw_score:       row.get(12)?,
      max_combo:       row.get(13)?,
      perfect:         row.get(14)?,
      grade:           row.get(15)?,
      passed:          row.get(16)?,
      accuracy:        row.get(17)?,
      pp:              row.get(18)?,
      star_rating:     row.get(19)?,
      client_time:     row.get(20)?,
      server_time:     row.get(21)?,
      time_elapsed_ms: row.get(22)?,
      client_flags:    row.get(23)?,
      online_checksum: row.get(24)?,
      status:          row.get(25)?,
    })
  }

  pub fn into_score(self) -> Result<Score> {
    Ok(Score {
      score_id: self.score_id,
      status:   SubmissionStatus::from_i64(self.status)?,
      play:     Play {
        map_md5:         self.map_md5,
        player_id:       self.player_id,
        player_name:     self.player_name,
        ruleset:         Ruleset::try_from(self.ruleset)?,
        mods:            Mods(self.mods),
        judgements:      Judgements {
          n300:  self.n300,
          n100:  self.n100,
          n50:   self.n50,
          ngeki: self.ngeki,
          nkatu: self.nkatu,
          nmiss: self.nmiss,
        },
        raw_score:       decode_u64(self.raw_score),
        max_combo:       self.max_combo,
        perfect:         self.perfect,
        grade:           Grade::parse(&self.grade)?,
        passed:          self.passed,
        accuracy:        self.accuracy,
        pp:              self.pp,
        star_rating:     self.star_rating,
        client_time:     decode_naive(&self.client_time)?,
        server_time:     decode_dt(&self.server_time)?,
        time_elapsed_ms: self.time_elapsed_ms,
        client_flags:    ClientFlags(self.client_flags),
        online_checksum: self.online_checksum,
      },
    })
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub const STATS_COLUMNS: &str = "
  player_id, ruleset, total_score, ranked_score, pp, accuracy, plays,
  playtime_secs, max_combo, total_hits,
  xh_count, x_count, sh_count, s_count, a_count, version";

pub struct RawStats {
  pub player_id:     u32,
  pub ruleset:       u8,
  pub total_score:   i64,
  pub ranked_score:  i64,
  pub pp:            f64,
  pub accuracy:      f64,
  pub plays:         u32,
  pub playtime_secs: i64,
  pub max_combo:     u32,
  pub total_hits:    i64,
  pub grades:        [u32; 5],
  pub version:       i64,
}

impl RawStats {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      player_id:     row.get(0)?,
      ruleset:       row.get(1)?,
      total_score:   row.get(2)?,
      ranked_score:  row.get(3)?,
      pp:            row.get(4)?,
      accuracy:      row.get(5)?,
      plays:         row.get(6)?,
      playtime_secs: row.get(7)?,
      max_combo:     row.get(8)?,
      total_hits:    row.get(9)?,
      grades:        [
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
        row.get(14)?,
      ],
      version:       row.get(15)?,
    })
  }

  pub fn into_stats(self) -> Result<PlayerStats> {
    let [xh, x, sh, s, a] = self.grades;
    Ok(PlayerStats {
      player_id:     self.player_id,
      ruleset:       Ruleset::try_from(self.ruleset)?,
      total_score:   decode_u64(self.total_score),
      ranked_score:  decode_u64(self.ranked_score),
      pp:            self.pp,
      accuracy:      self.accuracy,
      plays:         self.plays,
      playtime_secs: decode_u64(self.playtime_secs),
      max_combo:     self.max_combo,
      total_hits:    decode_u64(self.total_hits),
      grades:        GradeCounts { xh, x, sh, s, a },
      version:       decode_u64(self.version),
    })
  }
}

// ─── Players, maps, achievements ─────────────────────────────────────────────

pub struct RawPlayer {
  pub player_id:  u32,
  pub name:       String,
  pub restricted: bool,
}

impl RawPlayer {
  pub fn into_player(self) -> Player {
    Player {
      player_id:  self.player_id,
      name:       self.name,
      restricted: self.restricted,
    }
  }
}

pub struct RawMap {
  pub md5:    String,
  pub map_id: u32,
  pub set_id: u32,
  pub status: i64,
  pub plays:  u32,
  pub passes: u32,
}

impl RawMap {
  pub fn into_map(self) -> Result<MapInfo> {
    Ok(MapInfo {
      map_id: self.map_id,
      set_id: self.set_id,
      md5:    self.md5,
      status: RankedStatus::from_i64(self.status)?,
      plays:  self.plays,
      passes: self.passes,
    })
  }
}

pub fn encode_condition(c: &Condition) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub struct RawAchievement {
  pub achievement_id: u32,
  pub file:           String,
  pub name:           String,
  pub description:    String,
  pub condition_json: String,
}

impl RawAchievement {
  pub fn into_achievement(self) -> Result<Achievement> {
    Ok(Achievement {
      achievement_id: self.achievement_id,
      file:           self.file,
      name:           self.name,
      description:    self.description,
      condition:      serde_json::from_str(&self.condition_json)?,
    })
  }
}
