//! Integrity validator.
//!
//! Cross-checks a decoded submission against the client fingerprint recorded
//! at login and against values the server can recompute. Every enabled check
//! runs; the caller decides what to do with the anomalies.

use serde::Serialize;
use tally_codec::RawSubmission;
use tally_core::session::ClientFingerprint;
use thiserror::Error;

use crate::{config::IntegrityConfig, request::SubmissionRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
  #[error("client build {got:?} differs from session build {expected:?}")]
  BuildMismatch { expected: String, got: String },

  #[error("client hash differs from the one recorded at login")]
  ClientHashMismatch,

  #[error("unique ids are not in `a|b` form")]
  UniqueIdsMalformed,

  #[error("uninstall id does not match the session")]
  UninstallIdMismatch,

  #[error("disk signature does not match the session")]
  DiskSignatureMismatch,

  #[error("online checksum {got} does not match recomputed {expected}")]
  OnlineChecksumMismatch { expected: String, got: String },

  #[error("submitted map {submitted} differs from claimed map {claimed}")]
  MapHashMismatch { claimed: String, submitted: String },
}

impl Anomaly {
  /// Short machine-readable name, used as a log field.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::BuildMismatch { .. } => "build_mismatch",
      Self::ClientHashMismatch => "client_hash_mismatch",
      Self::UniqueIdsMalformed => "unique_ids_malformed",
      Self::UninstallIdMismatch => "uninstall_id_mismatch",
      Self::DiskSignatureMismatch => "disk_signature_mismatch",
      Self::OnlineChecksumMismatch { .. } => "online_checksum_mismatch",
      Self::MapHashMismatch { .. } => "map_hash_mismatch",
    }
  }
}

fn md5_hex(s: &str) -> String { format!("{:x}", md5::compute(s)) }

/// Run every enabled check and collect the anomalies found.
pub fn check(
  raw: &RawSubmission,
  request: &SubmissionRequest,
  fingerprint: &ClientFingerprint,
  config: &IntegrityConfig,
) -> Vec<Anomaly> {
  let mut found = Vec::new();

  if config.check_build && request.osu_version != fingerprint.build {
    found.push(Anomaly::BuildMismatch {
      expected: fingerprint.build.clone(),
      got:      request.osu_version.clone(),
    });
  }

  if config.check_client_hash && raw.client_hash != fingerprint.client_hash {
    found.push(Anomaly::ClientHashMismatch);
  }

  if config.check_unique_ids {
    match request.unique_ids.split_once('|') {
      None => found.push(Anomaly::UniqueIdsMalformed),
      Some((uninstall, disk)) => {
        if md5_hex(uninstall) != fingerprint.uninstall_md5 {
          found.push(Anomaly::UninstallIdMismatch);
        }
        if md5_hex(disk) != fingerprint.disk_signature_md5 {
          found.push(Anomaly::DiskSignatureMismatch);
        }
      }
    }
  }

  if config.check_online_checksum {
    let storyboard = request.storyboard_md5.as_deref().unwrap_or("");
    let expected =
      tally_codec::online_checksum(raw, &request.osu_version, storyboard);
    if expected != raw.online_checksum {
      found.push(Anomaly::OnlineChecksumMismatch {
        expected,
        got: raw.online_checksum.clone(),
      });
    }
  }

  if config.check_map_hash && raw.map_md5 != request.updated_beatmap_hash {
    found.push(Anomaly::MapHashMismatch {
      claimed:   request.updated_beatmap_hash.clone(),
      submitted: raw.map_md5.clone(),
    });
  }

  found
}
