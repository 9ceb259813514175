//! Local stand-ins for the external collaborators the pipeline talks to.

use std::convert::Infallible;

use tally_core::services::{
  Notification, NotificationSink, PerformanceOracle, PerformanceRequest,
  PerformanceResult,
};
use tracing::{info, warn};

/// Rates every result zero. Used until a difficulty calculator is attached.
pub struct NullOracle;

impl PerformanceOracle for NullOracle {
  type Error = Infallible;

  async fn compute(
    &self,
    _request: PerformanceRequest,
  ) -> Result<PerformanceResult, Infallible> {
    Ok(PerformanceResult::ZERO)
  }
}

/// Delivers notifications to the log.
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
  fn notify(&self, notification: Notification) {
    match notification {
      Notification::Placement { player_id, message } => {
        info!(player_id, %message, "placement");
      }
      Notification::Announcement { message } => {
        info!(%message, "announcement");
      }
      Notification::SuspiciousActivity { player_id, reason } => {
        warn!(player_id, %reason, "suspicious activity");
      }
      Notification::AchievementsUnlocked {
        player_id,
        achievements,
      } => {
        info!(player_id, count = achievements.len(), "achievements unlocked");
      }
    }
  }
}
