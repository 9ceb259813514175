//! Achievement evaluator.

use tally_core::{AchievementId, achievement::Achievement, score::Play};

/// Registry entries `play` satisfies that the player has not unlocked yet.
pub fn newly_satisfied<'a>(
  registry: &'a [Achievement],
  unlocked: &[AchievementId],
  play: &Play,
) -> Vec<&'a Achievement> {
  registry
    .iter()
    .filter(|a| !unlocked.contains(&a.achievement_id))
    .filter(|a| a.condition.evaluate(play))
    .collect()
}
