//! Session context delivered to the pipeline by the authentication layer.

use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Client fingerprint recorded when the session was established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFingerprint {
  /// Client build identifier, e.g. `"20210520"`.
  pub build:              String,
  /// Keyed hash over the client executable and adapter list.
  pub client_hash:        String,
  pub adapters_md5:       String,
  /// md5 of the first installation-uniqueness identifier.
  pub uninstall_md5:      String,
  /// md5 of the second installation-uniqueness identifier.
  pub disk_signature_md5: String,
}

/// Who is submitting, and what their client looked like at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
  pub player_id:   PlayerId,
  pub player_name: String,
  pub restricted:  bool,
  pub fingerprint: ClientFingerprint,
}
