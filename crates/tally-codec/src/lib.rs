//! Score submission payload codec for Tally.
//!
//! Converts between the encrypted, base64'd form a game client uploads and
//! [`RawSubmission`]. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use tally_codec::{EncryptedPayload, decode};
//!
//! let payload = EncryptedPayload {
//!   score_data:  "...".into(),
//!   client_hash: "...".into(),
//!   iv:          "...".into(),
//! };
//! let raw = decode(&payload, "20210520").unwrap();
//! println!("{} on {}", raw.player_name, raw.map_md5);
//! ```

mod checksum;
mod cipher;
pub mod error;
mod parse;
mod serialize;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::NaiveDateTime;
pub use error::{Error, Result};
use tally_core::{
  judgement::Judgements,
  mods::Mods,
  ruleset::Ruleset,
  score::{ClientFlags, Grade},
};

use crate::cipher::ScoreKey;

// ─── Public types ────────────────────────────────────────────────────────────

/// The three base64 form fields that make up an encrypted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
  /// Colon-delimited score fields, encrypted.
  pub score_data:  String,
  /// Client executable hash, encrypted with the same key and IV.
  pub client_hash: String,
  pub iv:          String,
}

/// A decrypted, positionally parsed submission. Nothing here has been
/// checked against the session or the server's own computations yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSubmission {
  pub map_md5:         String,
  /// One trailing supporter-marker space already stripped.
  pub player_name:     String,
  pub online_checksum: String,
  pub judgements:      Judgements,
  pub raw_score:       u64,
  pub max_combo:       u32,
  pub perfect:         bool,
  pub grade:           Grade,
  pub mods:            Mods,
  pub passed:          bool,
  pub mode_vn:         u8,
  /// Derived from `mode_vn` and `mods`.
  pub ruleset:         Ruleset,
  pub client_time:     NaiveDateTime,
  /// Build string with padding removed.
  pub osu_version:     String,
  /// Decoded from the build string's trailing padding.
  pub client_flags:    ClientFlags,
  /// Decrypted client executable hash.
  pub client_hash:     String,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Decrypt and parse a submission.
///
/// `osu_version` is the plain build string sent alongside the payload; it
/// keys the cipher. Any failure leaves nothing behind: the caller gets an
/// error and no partially parsed fields.
pub fn decode(payload: &EncryptedPayload, osu_version: &str) -> Result<RawSubmission> {
  let key = ScoreKey::for_version(osu_version)?;
  let iv = b64("iv", &payload.iv)?;

  let score_data = key.decrypt(&iv, &b64("score_data", &payload.score_data)?)?;
  let client_hash = key.decrypt(&iv, &b64("client_hash", &payload.client_hash)?)?;

  let score_data = String::from_utf8(score_data)?;
  let client_hash = String::from_utf8(client_hash)?;

  parse::parse_fields(&score_data, client_hash)
}

/// Serialize and encrypt a submission the way a client would.
///
/// The inverse of [`decode`]; `sub.player_name` is written as is, without
/// a supporter marker.
pub fn encode(
  sub: &RawSubmission,
  osu_version: &str,
  iv: &[u8],
) -> Result<EncryptedPayload> {
  let key = ScoreKey::for_version(osu_version)?;
  let score_data = serialize::join_fields(sub);
  Ok(EncryptedPayload {
    score_data:  B64.encode(key.encrypt(iv, score_data.as_bytes())?),
    client_hash: B64.encode(key.encrypt(iv, sub.client_hash.as_bytes())?),
    iv:          B64.encode(iv),
  })
}

/// The online checksum a genuine client would compute for `sub`.
pub fn online_checksum(
  sub: &RawSubmission,
  osu_version: &str,
  storyboard_md5: &str,
) -> String {
  checksum::compute(sub, osu_version, storyboard_md5)
}

fn b64(field: &'static str, s: &str) -> Result<Vec<u8>> {
  B64
    .decode(s.trim())
    .map_err(|source| Error::Base64 { field, source })
}

// ─── Round-trip test ─────────────────────────────────────────────────────────

#[cfg(test)]
mod roundtrip_tests {
  use super::{test_helpers::sample, *};

  const IV: [u8; 16] = *b"0123456789abcdef";

  #[test]
  fn decode_recovers_encoded_submission() {
    let sub = sample();
    let payload = encode(&sub, "20210520", &IV).unwrap();
    let back = decode(&payload, "20210520").unwrap();
    assert_eq!(back, sub);
  }

  #[test]
  fn garbage_payload_is_an_error() {
    let payload = EncryptedPayload {
      score_data:  "not base64!!".into(),
      client_hash: B64.encode([0u8; 16]),
      iv:          B64.encode(IV),
    };
    assert!(matches!(
      decode(&payload, "20210520"),
      Err(Error::Base64 { field: "score_data", .. })
    ));
  }

  #[test]
  fn mismatched_version_does_not_decode() {
    let payload = encode(&sample(), "20210520", &IV).unwrap();
    assert!(decode(&payload, "20210521").is_err());
  }
}

// ─── Shared test helpers ─────────────────────────────────────────────────────
