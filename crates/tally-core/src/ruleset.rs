//! Rulesets partition leaderboards and aggregates.
//!
//! A ruleset is a vanilla play mode combined with an optional assist mode
//! (relax or autopilot). Assisted rulesets rank by performance points; the
//! vanilla rulesets rank by raw score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, mods::Mods};

/// One of the four base play modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VanillaMode {
  Osu,
  Taiko,
  Catch,
  Mania,
}

impl VanillaMode {
  pub fn from_id(id: u8) -> Option<Self> {
    match id {
      0 => Some(Self::Osu),
      1 => Some(Self::Taiko),
      2 => Some(Self::Catch),
      3 => Some(Self::Mania),
      _ => None,
    }
  }

  pub fn id(self) -> u8 {
    match self {
      Self::Osu => 0,
      Self::Taiko => 1,
      Self::Catch => 2,
      Self::Mania => 3,
    }
  }
}

/// Which per-result value orders a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMetric {
  /// Raw in-game score.
  Score,
  /// Performance points.
  Performance,
}

/// A play mode plus assist mode.
///
/// Serialised as its numeric id. Combinations that the game does not support
/// (relax mania, autopilot on anything but osu!) have no variant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Ruleset {
  VanillaOsu,
  VanillaTaiko,
  VanillaCatch,
  VanillaMania,
  RelaxOsu,
  RelaxTaiko,
  RelaxCatch,
  AutopilotOsu,
}

impl Ruleset {
  pub const ALL: [Ruleset; 8] = [
    Ruleset::VanillaOsu,
    Ruleset::VanillaTaiko,
    Ruleset::VanillaCatch,
    Ruleset::VanillaMania,
    Ruleset::RelaxOsu,
    Ruleset::RelaxTaiko,
    Ruleset::RelaxCatch,
    Ruleset::AutopilotOsu,
  ];

  /// Derive the ruleset from the client's vanilla mode id and modifiers.
  /// Autopilot takes precedence over relax.
  pub fn from_params(mode_vn: u8, mods: Mods) -> Result<Self> {
    let mut id = mode_vn;
    if mode_vn > 3 {
      return Err(Error::InvalidRuleset { mode_vn, mods: mods.bits() });
    }
    if mods.contains(Mods::AUTOPILOT) {
      id += 8;
    } else if mods.contains(Mods::RELAX) {
      id += 4;
    }
    Self::try_from(id)
      .map_err(|_| Error::InvalidRuleset { mode_vn, mods: mods.bits() })
  }

  pub fn id(self) -> u8 {
    match self {
      Self::VanillaOsu => 0,
      Self::VanillaTaiko => 1,
      Self::VanillaCatch => 2,
      Self::VanillaMania => 3,
      Self::RelaxOsu => 4,
      Self::RelaxTaiko => 5,
      Self::RelaxCatch => 6,
      Self::AutopilotOsu => 8,
    }
  }

  pub fn as_vanilla(self) -> VanillaMode {
    match self {
      Self::VanillaOsu | Self::RelaxOsu | Self::AutopilotOsu => VanillaMode::Osu,
      Self::VanillaTaiko | Self::RelaxTaiko => VanillaMode::Taiko,
      Self::VanillaCatch | Self::RelaxCatch => VanillaMode::Catch,
      Self::VanillaMania => VanillaMode::Mania,
    }
  }

  /// The fixed metric table: vanilla rulesets rank by score, assisted
  /// rulesets by performance.
  pub fn ranking_metric(self) -> RankingMetric {
    match self {
      Self::VanillaOsu
      | Self::VanillaTaiko
      | Self::VanillaCatch
      | Self::VanillaMania => RankingMetric::Score,
      Self::RelaxOsu
      | Self::RelaxTaiko
      | Self::RelaxCatch
      | Self::AutopilotOsu => RankingMetric::Performance,
    }
  }
}

impl TryFrom<u8> for Ruleset {
  type Error = Error;

  fn try_from(id: u8) -> Result<Self> {
    match id {
      0 => Ok(Self::VanillaOsu),
      1 => Ok(Self::VanillaTaiko),
      2 => Ok(Self::VanillaCatch),
      3 => Ok(Self::VanillaMania),
      4 => Ok(Self::RelaxOsu),
      5 => Ok(Self::RelaxTaiko),
      6 => Ok(Self::RelaxCatch),
      8 => Ok(Self::AutopilotOsu),
      other => Err(Error::UnknownRuleset(other)),
    }
  }
}

impl From<Ruleset> for u8 {
  fn from(r: Ruleset) -> u8 { r.id() }
}

impl fmt::Display for Ruleset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::VanillaOsu => "vn!std",
      Self::VanillaTaiko => "vn!taiko",
      Self::VanillaCatch => "vn!catch",
      Self::VanillaMania => "vn!mania",
      Self::RelaxOsu => "rx!std",
      Self::RelaxTaiko => "rx!taiko",
      Self::RelaxCatch => "rx!catch",
      Self::AutopilotOsu => "ap!std",
    };
    f.write_str(s)
  }
}
