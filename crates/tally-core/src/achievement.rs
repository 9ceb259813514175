//! Achievements: data-driven unlock conditions over a single play.
//!
//! A [`Condition`] is a closed expression tree, serialised as tagged JSON so
//! a registry can be stored and edited as data. Evaluation is pure and sees
//! only the committed [`Play`].

use serde::{Deserialize, Serialize};

use crate::{
  AchievementId,
  mods::Mods,
  ruleset::VanillaMode,
  score::{Grade, Play},
};

// ─── Condition ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
  All { of: Vec<Condition> },
  Any { of: Vec<Condition> },
  Not { cond: Box<Condition> },
  Mode { mode: VanillaMode },
  /// The play's mod set is exactly `mods`.
  ModsEqual { mods: Mods },
  ModsInclude { mods: Mods },
  /// None of `mods` are set.
  ModsExclude { mods: Mods },
  /// Star rating in `[min, max)`; unbounded above when `max` is `None`.
  StarRating { min: f64, max: Option<f64> },
  /// Max combo in `[min, max)`; unbounded above when `max` is `None`.
  Combo { min: u32, max: Option<u32> },
  FullCombo,
  Passed,
  AccuracyAtLeast { accuracy: f64 },
  GradeAtLeast { grade: Grade },
}

impl Condition {
  pub fn evaluate(&self, play: &Play) -> bool {
    match self {
      Self::All { of } => of.iter().all(|c| c.evaluate(play)),
      Self::Any { of } => of.iter().any(|c| c.evaluate(play)),
      Self::Not { cond } => !cond.evaluate(play),
      Self::Mode { mode } => play.ruleset.as_vanilla() == *mode,
      Self::ModsEqual { mods } => play.mods == *mods,
      Self::ModsInclude { mods } => play.mods.contains(*mods),
      Self::ModsExclude { mods } => !play.mods.intersects(*mods),
      Self::StarRating { min, max } => {
        play.star_rating >= *min && max.is_none_or(|m| play.star_rating < m)
      }
      Self::Combo { min, max } => {
        play.max_combo >= *min && max.is_none_or(|m| play.max_combo < m)
      }
      Self::FullCombo => play.perfect,
      Self::Passed => play.passed,
      Self::AccuracyAtLeast { accuracy } => play.accuracy >= *accuracy,
      Self::GradeAtLeast { grade } => play.grade >= *grade,
    }
  }
}

// ─── Achievement ─────────────────────────────────────────────────────────────

/// One entry of the achievement registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
  pub achievement_id: AchievementId,
  /// Icon / asset key, e.g. `osu-skill-pass-4`.
  pub file:           String,
  pub name:           String,
  pub description:    String,
  pub condition:      Condition,
}

impl Achievement {
  /// The `file+name+description` triple the game client expects when told
  /// about a fresh unlock.
  pub fn display_string(&self) -> String {
    format!("{}+{}+{}", self.file, self.name, self.description)
  }
}

// ─── Default registry ────────────────────────────────────────────────────────

fn mode_slug(mode: VanillaMode) -> &'static str {
  match mode {
    VanillaMode::Osu => "osu",
    VanillaMode::Taiko => "taiko",
    VanillaMode::Catch => "fruits",
    VanillaMode::Mania => "mania",
  }
}

fn mode_title(mode: VanillaMode) -> &'static str {
  match mode {
    VanillaMode::Osu => "osu!",
    VanillaMode::Taiko => "osu!taiko",
    VanillaMode::Catch => "osu!catch",
    VanillaMode::Mania => "osu!mania",
  }
}

/// The stock registry: skill pass/FC medals per star band for every mode,
/// osu! combo milestones and the mod introduction medals.
///
/// Ids are stable so that the registry can be re-seeded into an existing
/// store without disturbing unlock records.
pub fn default_registry() -> Vec<Achievement> {
  let mut out = Vec::new();
  let mut next_id: AchievementId = 1;
  let mut push = |file: String, name: String, description: String, condition| {
    out.push(Achievement {
      achievement_id: next_id,
      file,
      name,
      description,
      condition,
    });
    next_id += 1;
  };

  for mode in [
    VanillaMode::Osu,
    VanillaMode::Taiko,
    VanillaMode::Catch,
    VanillaMode::Mania,
  ] {
    let top_band = if mode == VanillaMode::Osu { 10 } else { 8 };
    for stars in 1..=top_band {
      let band = Condition::StarRating {
        min: f64::from(stars),
        max: Some(f64::from(stars + 1)),
      };
      push(
        format!("{}-skill-pass-{stars}", mode_slug(mode)),
        format!("{stars} Star Pass ({})", mode_title(mode)),
        format!("Pass a {stars} star map in {}.", mode_title(mode)),
        Condition::All {
          of: vec![
            Condition::Mode { mode },
            Condition::ModsExclude { mods: Mods::NOFAIL },
            band.clone(),
          ],
        },
      );
      push(
        format!("{}-skill-fc-{stars}", mode_slug(mode)),
        format!("{stars} Star Full Combo ({})", mode_title(mode)),
        format!("Full combo a {stars} star map in {}.", mode_title(mode)),
        Condition::All {
          of: vec![Condition::Mode { mode }, Condition::FullCombo, band],
        },
      );
    }
  }

  let combos: [(u32, Option<u32>, &str); 4] = [
    (500, Some(750), "500 big ones! You're moving up in the world!"),
    (750, Some(1000), "750 notes back to back? Woah."),
    (1000, Some(2000), "A thousand reasons why you rock at this game."),
    (2000, None, "Nothing can stop you now."),
  ];
  for (min, max, description) in combos {
    push(
      format!("osu-combo-{min}"),
      format!("{min} Combo"),
      description.to_owned(),
      Condition::All {
        of: vec![
          Condition::Mode {
            mode: VanillaMode::Osu,
          },
          Condition::Combo { min, max },
        ],
      },
    );
  }

  let intros: [(&str, &str, &str, Mods); 11] = [
    ("suddendeath", "Finality", "High stakes, no regrets.", Mods::SUDDENDEATH),
    ("hidden", "Blindsight", "I can see just perfectly.", Mods::HIDDEN),
    ("perfect", "Perfectionist", "Accept nothing but the best.", Mods::PERFECT),
    ("hardrock", "Rock Around The Clock", "You can't stop the rock.", Mods::HARDROCK),
    ("doubletime", "Time And A Half", "Having a right ol' time.", Mods::DOUBLETIME),
    ("flashlight", "Are You Afraid Of The Dark?", "Harder than it looks.", Mods::FLASHLIGHT),
    ("easy", "Dial It Right Back", "Sometimes you just want to take it easy.", Mods::EASY),
    ("nofail", "Risk Averse", "Safety nets are fun!", Mods::NOFAIL),
    ("nightcore", "Sweet Rave Party", "Founded in the fine tradition of changing things that were just fine as they were.", Mods::NIGHTCORE),
    ("halftime", "Slowboat", "You got there. Eventually.", Mods::HALFTIME),
    ("spunout", "Burned Out", "One cannot always spin to win.", Mods::SPUNOUT),
  ];
  for (slug, name, description, mods) in intros {
    push(
      format!("all-intro-{slug}"),
      name.to_owned(),
      description.to_owned(),
      Condition::ModsEqual { mods },
    );
  }

  out
}
