//! Error types for the tally-codec payload codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid base64 in {field}: {source}")]
  Base64 {
    field:  &'static str,
    #[source]
    source: base64::DecodeError,
  },

  #[error("cipher key must be 32 bytes, got {0} (client version {1:?})")]
  KeyLength(usize, String),

  #[error("cipher IV must be 16 bytes, got {0}")]
  IvLength(usize),

  #[error("decryption failed: bad padding or truncated block")]
  Unpad,

  #[error("decrypted payload is not UTF-8")]
  Utf8(#[from] std::string::FromUtf8Error),

  #[error("expected {expected} payload fields, got {got}")]
  FieldCount { expected: usize, got: usize },

  #[error("invalid {field}: {value:?}")]
  InvalidField { field: &'static str, value: String },

  #[error(transparent)]
  Core(#[from] tally_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
