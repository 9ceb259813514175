//! Weighted performance rating and accuracy.
//!
//! A player's rating is the decayed sum of their qualifying results ordered
//! best first, `Σ pp_i · 0.95^i`, plus a bonus that grows with the number of
//! qualifying results, `416.6667 · (1 − 0.9994^N)`. Accuracy uses the same
//! decay, normalised by the sum of the weights and without a bonus.

use serde::{Deserialize, Serialize};

use crate::ScoreId;

/// Per-position weight decay.
pub const WEIGHT_DECAY: f64 = 0.95;
/// Asymptotic value of the result-count bonus.
pub const BONUS_CEILING: f64 = 416.6667;
/// Per-result decay of the result-count bonus.
pub const BONUS_DECAY: f64 = 0.9994;

/// The rating inputs of one qualifying result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatedScore {
  pub score_id: ScoreId,
  pub pp:       f64,
  pub accuracy: f64,
}

/// Output of [`weighted_totals`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightedTotals {
  pub pp:       f64,
  pub accuracy: f64,
}

/// Recompute the weighted rating and accuracy over every qualifying result.
///
/// Input order does not matter; results are ranked by pp descending (ties
/// broken by score id so the sum is deterministic).
pub fn weighted_totals(scores: &[RatedScore]) -> WeightedTotals {
  if scores.is_empty() {
    return WeightedTotals::default();
  }

  let mut ordered = scores.to_vec();
  ordered.sort_by(|a, b| {
    b.pp.total_cmp(&a.pp).then_with(|| a.score_id.cmp(&b.score_id))
  });

  let mut weighted_pp = 0.0;
  let mut weighted_acc = 0.0;
  let mut weight = 1.0;
  for s in &ordered {
    weighted_pp += s.pp * weight;
    weighted_acc += s.accuracy * weight;
    weight *= WEIGHT_DECAY;
  }

  let n = ordered.len() as i32;
  let bonus_pp = BONUS_CEILING * (1.0 - BONUS_DECAY.powi(n));
  let acc_divisor = 100.0 / (20.0 * (1.0 - WEIGHT_DECAY.powi(n)));

  WeightedTotals {
    pp:       weighted_pp + bonus_pp,
    accuracy: weighted_acc * acc_divisor / 100.0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rated(score_id: ScoreId, pp: f64, accuracy: f64) -> RatedScore {
    RatedScore { score_id, pp, accuracy }
  }

  #[test]
  fn two_results_weighted_with_bonus() {
    let totals = weighted_totals(&[rated(1, 100.0, 100.0), rated(2, 50.0, 90.0)]);
    // 100 + 50·0.95 + 416.6667·(1 − 0.9994²)
    assert!((totals.pp - 148.0).abs() < 0.01, "pp = {}", totals.pp);
    // (100 + 90·0.95) / (1 + 0.95)
    let expected_acc = (100.0 + 90.0 * 0.95) / 1.95;
    assert!((totals.accuracy - expected_acc).abs() < 1e-9);
  }

  #[test]
  fn order_of_input_is_irrelevant() {
    let a = weighted_totals(&[rated(1, 50.0, 90.0), rated(2, 100.0, 100.0)]);
    let b = weighted_totals(&[rated(2, 100.0, 100.0), rated(1, 50.0, 90.0)]);
    assert_eq!(a, b);
  }

  #[test]
  fn single_perfect_result_has_full_accuracy() {
    let totals = weighted_totals(&[rated(1, 10.0, 100.0)]);
    assert!((totals.accuracy - 100.0).abs() < 1e-9);
  }

  #[test]
  fn no_results_is_zero() {
    assert_eq!(weighted_totals(&[]), WeightedTotals::default());
  }
}
