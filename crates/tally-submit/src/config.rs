//! Pipeline configuration.
//!
//! Deserialised as the `[submit]` table of the server's `config.toml`; every
//! field has a default so the table may be omitted entirely.

use std::time::Duration;

use serde::Deserialize;

/// What to do when an integrity check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityPolicy {
  /// Log the anomaly and accept the result.
  #[default]
  LogOnly,
  /// Reject the submission.
  Reject,
  /// Flag the account as restricted, then reject.
  Restrict,
}

/// Toggles for the individual integrity checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
  pub policy:                IntegrityPolicy,
  pub check_build:           bool,
  pub check_client_hash:     bool,
  pub check_unique_ids:      bool,
  pub check_online_checksum: bool,
  pub check_map_hash:        bool,
}

impl Default for IntegrityConfig {
  fn default() -> Self {
    Self {
      policy:                IntegrityPolicy::LogOnly,
      check_build:           true,
      check_client_hash:     true,
      check_unique_ids:      true,
      check_online_checksum: true,
      check_map_hash:        true,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
  pub integrity:            IntegrityConfig,
  /// Upper bound on any single storage call.
  pub storage_timeout_ms:   u64,
  /// Upper bound on waiting for the checksum-scoped admission section.
  pub admission_timeout_ms: u64,
  /// Commit attempts before giving up on a contended aggregate row.
  pub max_commit_attempts:  u32,
  /// Replays shorter than this are treated as missing.
  pub min_replay_size:      usize,
}

impl Default for SubmitConfig {
  fn default() -> Self {
    Self {
      integrity:            IntegrityConfig::default(),
      storage_timeout_ms:   5_000,
      admission_timeout_ms: 10_000,
      max_commit_attempts:  5,
      min_replay_size:      24,
    }
  }
}

impl SubmitConfig {
  pub fn storage_timeout(&self) -> Duration {
    Duration::from_millis(self.storage_timeout_ms)
  }

  pub fn admission_timeout(&self) -> Duration {
    Duration::from_millis(self.admission_timeout_ms)
  }
}
