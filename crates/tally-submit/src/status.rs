//! Status resolver.

use tally_core::{
  ScoreId,
  score::{Play, Score, SubmissionStatus},
};

/// How a candidate stands against the player's existing best.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub status:    SubmissionStatus,
  /// The best the candidate was compared against. `None` for failures and
  /// first clears.
  pub prev_best: Option<Score>,
}

impl Resolution {
  /// The score to demote in the same commit, if the candidate supersedes
  /// one.
  pub fn demote(&self) -> Option<ScoreId> {
    match (self.status, &self.prev_best) {
      (SubmissionStatus::Best, Some(prev)) => Some(prev.score_id),
      _ => None,
    }
  }
}

/// Classify `play` given the player's current best on the same map and
/// ruleset. Only a strictly greater ranking metric takes the best slot.
pub fn resolve(play: &Play, existing_best: Option<Score>) -> Resolution {
  if !play.passed {
    return Resolution {
      status:    SubmissionStatus::Failed,
      prev_best: None,
    };
  }

  match existing_best {
    None => Resolution {
      status:    SubmissionStatus::Best,
      prev_best: None,
    },
    Some(prev) if play.metric_value() > prev.metric_value() => Resolution {
      status:    SubmissionStatus::Best,
      prev_best: Some(prev),
    },
    Some(prev) => Resolution {
      status:    SubmissionStatus::Submitted,
      prev_best: Some(prev),
    },
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use chrono::{NaiveDate, Utc};
  use tally_core::{
    judgement::Judgements,
    mods::Mods,
    ruleset::Ruleset,
    score::{ClientFlags, Grade},
  };

  use super::*;

  pub(crate) fn play(ruleset: Ruleset, raw_score: u64, pp: f64) -> Play {
    Play {
      map_md5: "d".repeat(32),
      player_id: 7,
      player_name: "whitecat".into(),
      ruleset,
      mods: Mods::NOMOD,
      judgements: Judgements {
        n300:  400,
        n100:  10,
        n50:   0,
        ngeki: 0,
        nkatu: 0,
        nmiss: 1,
      },
      raw_score,
      max_combo: 600,
      perfect: false,
      grade: Grade::A,
      passed: true,
      accuracy: 97.8,
      pp,
      star_rating: 6.1,
      client_time: NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap(),
      server_time: Utc::now(),
      time_elapsed_ms: 120_000,
      client_flags: ClientFlags::CLEAN,
      online_checksum: "c".repeat(32),
    }
  }

  fn best(score_id: ScoreId, play: Play) -> Score {
    Score {
      score_id,
      status: SubmissionStatus::Best,
      play,
    }
  }

  #[test]
  fn failure_is_failed_regardless_of_history() {
    let mut p = play(Ruleset::VanillaOsu, 9_000_000, 0.0);
    p.passed = false;
    let prev = best(1, play(Ruleset::VanillaOsu, 1, 0.0));
    let r = resolve(&p, Some(prev));
    assert_eq!(r.status, SubmissionStatus::Failed);
    assert_eq!(r.demote(), None);
  }

  #[test]
  fn first_clear_is_best() {
    let r = resolve(&play(Ruleset::VanillaOsu, 100, 0.0), None);
    assert_eq!(r.status, SubmissionStatus::Best);
    assert_eq!(r.demote(), None);
  }

  #[test]
  fn strictly_greater_metric_supersedes() {
    let prev = best(3, play(Ruleset::VanillaOsu, 1_000, 0.0));
    let r = resolve(&play(Ruleset::VanillaOsu, 1_001, 0.0), Some(prev));
    assert_eq!(r.status, SubmissionStatus::Best);
    assert_eq!(r.demote(), Some(3));
  }

  #[test]
  fn equal_metric_does_not_supersede() {
    let prev = best(3, play(Ruleset::VanillaOsu, 1_000, 0.0));
    let r = resolve(&play(Ruleset::VanillaOsu, 1_000, 0.0), Some(prev));
    assert_eq!(r.status, SubmissionStatus::Submitted);
    assert_eq!(r.demote(), None);
  }

  #[test]
  fn assisted_rulesets_compare_pp() {
    let prev = best(3, play(Ruleset::RelaxOsu, 5_000_000, 200.0));
    let r = resolve(&play(Ruleset::RelaxOsu, 1_000, 201.0), Some(prev));
    assert_eq!(r.status, SubmissionStatus::Best);
  }
}
