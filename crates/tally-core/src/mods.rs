//! Gameplay modifier bitset.
//!
//! Bit positions follow the game client's wire format; the value is stored
//! and transmitted as a plain `u32`.

use std::{
  fmt,
  ops::{BitAnd, BitOr},
};

use serde::{Deserialize, Serialize};

/// A set of gameplay modifiers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Mods(pub u32);

impl Mods {
  pub const NOMOD: Mods = Mods(0);
  pub const NOFAIL: Mods = Mods(1 << 0);
  pub const EASY: Mods = Mods(1 << 1);
  pub const TOUCHSCREEN: Mods = Mods(1 << 2);
  pub const HIDDEN: Mods = Mods(1 << 3);
  pub const HARDROCK: Mods = Mods(1 << 4);
  pub const SUDDENDEATH: Mods = Mods(1 << 5);
  pub const DOUBLETIME: Mods = Mods(1 << 6);
  pub const RELAX: Mods = Mods(1 << 7);
  pub const HALFTIME: Mods = Mods(1 << 8);
  pub const NIGHTCORE: Mods = Mods(1 << 9);
  pub const FLASHLIGHT: Mods = Mods(1 << 10);
  pub const AUTOPLAY: Mods = Mods(1 << 11);
  pub const SPUNOUT: Mods = Mods(1 << 12);
  pub const AUTOPILOT: Mods = Mods(1 << 13);
  pub const PERFECT: Mods = Mods(1 << 14);
  pub const FADEIN: Mods = Mods(1 << 20);
  pub const RANDOM: Mods = Mods(1 << 21);
  pub const SCOREV2: Mods = Mods(1 << 29);
  pub const MIRROR: Mods = Mods(1 << 30);

  pub fn bits(self) -> u32 { self.0 }

  /// `true` if every bit of `other` is set in `self`.
  pub fn contains(self, other: Mods) -> bool { self.0 & other.0 == other.0 }

  /// `true` if any bit of `other` is set in `self`.
  pub fn intersects(self, other: Mods) -> bool { self.0 & other.0 != 0 }
}

impl BitOr for Mods {
  type Output = Mods;
  fn bitor(self, rhs: Mods) -> Mods { Mods(self.0 | rhs.0) }
}

impl BitAnd for Mods {
  type Output = Mods;
  fn bitand(self, rhs: Mods) -> Mods { Mods(self.0 & rhs.0) }
}

const ACRONYMS: &[(Mods, &str)] = &[
  (Mods::NOFAIL, "NF"),
  (Mods::EASY, "EZ"),
  (Mods::TOUCHSCREEN, "TD"),
  (Mods::HIDDEN, "HD"),
  (Mods::HARDROCK, "HR"),
  (Mods::SUDDENDEATH, "SD"),
  (Mods::DOUBLETIME, "DT"),
  (Mods::RELAX, "RX"),
  (Mods::HALFTIME, "HT"),
  (Mods::NIGHTCORE, "NC"),
  (Mods::FLASHLIGHT, "FL"),
  (Mods::AUTOPLAY, "AU"),
  (Mods::SPUNOUT, "SO"),
  (Mods::AUTOPILOT, "AP"),
  (Mods::PERFECT, "PF"),
  (Mods::FADEIN, "FI"),
  (Mods::RANDOM, "RD"),
  (Mods::SCOREV2, "V2"),
  (Mods::MIRROR, "MR"),
];

impl fmt::Display for Mods {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if *self == Mods::NOMOD {
      return f.write_str("NM");
    }

    for (mods, acronym) in ACRONYMS {
      if !self.contains(*mods) {
        continue;
      }
      // NC and PF imply DT and SD respectively.
      if *mods == Mods::DOUBLETIME && self.contains(Mods::NIGHTCORE) {
        continue;
      }
      if *mods == Mods::SUDDENDEATH && self.contains(Mods::PERFECT) {
        continue;
      }
      f.write_str(acronym)?;
    }
    Ok(())
  }
}
