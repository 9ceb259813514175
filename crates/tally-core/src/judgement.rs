//! Per-judgement hit counts and the values derived from them.

use serde::{Deserialize, Serialize};

use crate::ruleset::VanillaMode;

/// Hit counts as reported by the client.
///
/// `ngeki` and `nkatu` carry mode-specific meanings: in taiko they count
/// big-note double hits, in mania they are the rainbow 300 and 200
/// judgements, in catch `nkatu` counts missed droplets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Judgements {
  pub n300:  u32,
  pub n100:  u32,
  pub n50:   u32,
  pub ngeki: u32,
  pub nkatu: u32,
  pub nmiss: u32,
}

impl Judgements {
  /// Accuracy in the range 0–100. Zero when there are no judged objects.
  pub fn accuracy(&self, mode: VanillaMode) -> f64 {
    let n300 = f64::from(self.n300);
    let n100 = f64::from(self.n100);
    let n50 = f64::from(self.n50);
    let ngeki = f64::from(self.ngeki);
    let nkatu = f64::from(self.nkatu);
    let nmiss = f64::from(self.nmiss);

    match mode {
      VanillaMode::Osu => {
        let total = n300 + n100 + n50 + nmiss;
        if total == 0.0 {
          return 0.0;
        }
        100.0 * (n300 * 300.0 + n100 * 100.0 + n50 * 50.0) / (total * 300.0)
      }
      VanillaMode::Taiko => {
        let total = n300 + n100 + nmiss;
        if total == 0.0 {
          return 0.0;
        }
        100.0 * (n100 * 0.5 + n300) / total
      }
      VanillaMode::Catch => {
        let total = n300 + n100 + n50 + nkatu + nmiss;
        if total == 0.0 {
          return 0.0;
        }
        100.0 * (n300 + n100 + n50) / total
      }
      VanillaMode::Mania => {
        let total = n300 + n100 + n50 + ngeki + nkatu + nmiss;
        if total == 0.0 {
          return 0.0;
        }
        100.0
          * (n50 * 50.0 + n100 * 100.0 + nkatu * 200.0 + (n300 + ngeki) * 300.0)
          / (total * 300.0)
      }
    }
  }

  /// Number of successful hits credited to the player's lifetime total.
  /// Taiko and mania also count geki and katu judgements.
  pub fn total_hits(&self, mode: VanillaMode) -> u64 {
    let base = u64::from(self.n300) + u64::from(self.n100) + u64::from(self.n50);
    match mode {
      VanillaMode::Taiko | VanillaMode::Mania => {
        base + u64::from(self.ngeki) + u64::from(self.nkatu)
      }
      VanillaMode::Osu | VanillaMode::Catch => base,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counts(n300: u32, n100: u32, n50: u32, nmiss: u32) -> Judgements {
    Judgements { n300, n100, n50, nmiss, ..Default::default() }
  }

  #[test]
  fn osu_accuracy() {
    assert_eq!(counts(100, 0, 0, 0).accuracy(VanillaMode::Osu), 100.0);
    let acc = counts(90, 10, 0, 0).accuracy(VanillaMode::Osu);
    assert!((acc - 93.3333).abs() < 1e-3);
  }

  #[test]
  fn taiko_counts_goods_as_half() {
    let acc = counts(50, 50, 0, 0).accuracy(VanillaMode::Taiko);
    assert!((acc - 75.0).abs() < 1e-9);
  }

  #[test]
  fn mania_uses_geki_and_katu() {
    let j = Judgements { ngeki: 10, nkatu: 10, ..Default::default() };
    let acc = j.accuracy(VanillaMode::Mania);
    assert!((acc - 83.3333).abs() < 1e-3);
  }

  #[test]
  fn empty_play_has_zero_accuracy() {
    for mode in [
      VanillaMode::Osu,
      VanillaMode::Taiko,
      VanillaMode::Catch,
      VanillaMode::Mania,
    ] {
      assert_eq!(Judgements::default().accuracy(mode), 0.0);
    }
  }

  #[test]
  fn total_hits_by_mode() {
    let j = Judgements {
      n300: 10, n100: 5, n50: 1, ngeki: 3, nkatu: 2, nmiss: 4,
    };
    assert_eq!(j.total_hits(VanillaMode::Osu), 16);
    assert_eq!(j.total_hits(VanillaMode::Mania), 21);
  }
}
