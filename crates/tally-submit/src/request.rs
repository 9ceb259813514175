//! The inbound submission, as handed over by the HTTP layer.

use tally_codec::EncryptedPayload;

/// One score submission: the encrypted payload plus the plain-text fields
/// the client sends alongside it.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
  pub payload:              EncryptedPayload,
  /// Client build string. Keys the payload cipher.
  pub osu_version:          String,
  /// Installation-uniqueness identifiers, `"<uninstall>|<disk signature>"`.
  pub unique_ids:           String,
  pub storyboard_md5:       Option<String>,
  /// The map fingerprint the client believes it played.
  pub updated_beatmap_hash: String,
  pub score_time_ms:        u32,
  pub fail_time_ms:         u32,
  pub replay:               Option<Vec<u8>>,
}
