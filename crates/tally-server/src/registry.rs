//! In-memory session registry.
//!
//! The login service owns authentication; it pushes each established session
//! here under an opaque token, and submissions present that token.

use std::{collections::HashMap, sync::Arc};

use tally_core::session::SessionContext;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct SessionRegistry {
  sessions: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl SessionRegistry {
  /// Store `session` under `token`. Returns `true` if it replaced one.
  pub async fn insert(&self, token: Uuid, session: SessionContext) -> bool {
    self.sessions.write().await.insert(token, session).is_some()
  }

  pub async fn get(&self, token: &Uuid) -> Option<SessionContext> {
    self.sessions.read().await.get(token).cloned()
  }

  pub async fn remove(&self, token: &Uuid) -> Option<SessionContext> {
    self.sessions.write().await.remove(token)
  }

  pub async fn len(&self) -> usize { self.sessions.read().await.len() }
}

#[cfg(test)]
mod tests {
  use tally_core::session::ClientFingerprint;

  use super::*;

  fn session(player_id: u32) -> SessionContext {
    SessionContext {
      player_id,
      player_name: format!("player{player_id}"),
      restricted: false,
      fingerprint: ClientFingerprint {
        build:              "20240102".into(),
        client_hash:        "hash".into(),
        adapters_md5:       "a".repeat(32),
        uninstall_md5:      "b".repeat(32),
        disk_signature_md5: "c".repeat(32),
      },
    }
  }

  #[tokio::test]
  async fn insert_get_remove() {
    let registry = SessionRegistry::default();
    let token = Uuid::new_v4();

    assert!(!registry.insert(token, session(1)).await);
    assert!(registry.insert(token, session(2)).await);
    assert_eq!(registry.get(&token).await.unwrap().player_id, 2);
    assert_eq!(registry.len().await, 1);

    assert!(registry.remove(&token).await.is_some());
    assert!(registry.get(&token).await.is_none());
  }
}
