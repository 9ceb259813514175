//! Error type for `tally-submit`.
//!
//! Only failures the caller can do nothing about within this request end up
//! here. Rejections, duplicates and malformed payloads are ordinary
//! [`Outcome`](crate::Outcome)s.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
  /// A storage call failed. Nothing was committed; retrying the same bytes
  /// is safe.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("storage call timed out: {0}")]
  StorageTimeout(&'static str),

  #[error("timed out waiting for admission")]
  AdmissionTimeout,

  #[error("aggregate row still contended after {attempts} commit attempts")]
  Contention { attempts: u32 },
}

impl SubmitError {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = SubmitError> = std::result::Result<T, E>;
