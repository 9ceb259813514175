//! Placement calculator.

use tally_core::{score::Play, store::ScoreStore};

/// 1-indexed leaderboard position `play` would take on its map and ruleset.
///
/// Ties go to the earlier submission, so the candidate ranks below every
/// existing best with an equal metric. Restricted players are not counted.
pub async fn rank<S: ScoreStore>(store: &S, play: &Play) -> Result<u32, S::Error> {
  let ahead = store
    .count_at_or_above(&play.map_md5, play.ruleset, play.metric_value())
    .await?;
  Ok(ahead.saturating_add(1))
}

/// The metric as shown to players, e.g. `"1,234,567 score"` or `"412pp"`.
pub fn describe_metric(play: &Play) -> String {
  use tally_core::ruleset::RankingMetric;

  match play.ruleset.ranking_metric() {
    RankingMetric::Score => format!("{} score", group_thousands(play.raw_score)),
    RankingMetric::Performance => format!("{}pp", play.pp.round()),
  }
}

fn group_thousands(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

#[cfg(test)]
mod tests {
  use tally_core::ruleset::Ruleset;

  use super::*;
  use crate::status::tests::play;

  #[test]
  fn thousands_grouping() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1_000), "1,000");
    assert_eq!(group_thousands(1_234_567), "1,234,567");
  }

  #[test]
  fn metric_follows_ruleset() {
    assert_eq!(
      describe_metric(&play(Ruleset::VanillaOsu, 1_234_567, 300.0)),
      "1,234,567 score"
    );
    assert_eq!(describe_metric(&play(Ruleset::RelaxOsu, 1, 411.6)), "412pp");
  }
}
