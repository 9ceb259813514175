//! Admission guard.
//!
//! Keyed async locks. The pipeline keeps two tables: one keyed by online
//! checksum, so that the duplicate check and the commit behave as one
//! critical section, and one keyed by (player, ruleset), so that commits
//! against the same aggregate row run one at a time instead of racing on
//! its version. Distinct keys never contend. Entries are evicted once nobody
//! holds or waits on them, so each table stays proportional to in-flight
//! submissions.

use std::{hash::Hash, sync::Arc};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable<K> = DashMap<K, Arc<Mutex<()>>>;

pub struct AdmissionGuard<K = String>
where
  K: Eq + Hash,
{
  locks: Arc<LockTable<K>>,
}

impl<K: Eq + Hash> Clone for AdmissionGuard<K> {
  fn clone(&self) -> Self {
    Self {
      locks: Arc::clone(&self.locks),
    }
  }
}

impl<K: Eq + Hash> Default for AdmissionGuard<K> {
  fn default() -> Self {
    Self {
      locks: Arc::new(DashMap::new()),
    }
  }
}

/// Held for the duration of the critical section.
pub struct AdmissionPermit<K = String>
where
  K: Eq + Hash,
{
  // Field order matters: the mutex guard must drop before the slot so the
  // eviction check sees the lock released.
  _guard: OwnedMutexGuard<()>,
  _slot:  Slot<K>,
}

/// Evicts its table entry on drop if no other permit or waiter shares it.
struct Slot<K: Eq + Hash> {
  key:   K,
  locks: Arc<LockTable<K>>,
}

impl<K: Eq + Hash> Drop for Slot<K> {
  fn drop(&mut self) {
    self
      .locks
      .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
  }
}

impl<K: Eq + Hash + Clone> AdmissionGuard<K> {
  pub fn new() -> Self { Self::default() }

  /// Wait for exclusive access to `key`.
  ///
  /// Cancel-safe: dropping the future before it resolves leaves no entry
  /// behind.
  pub async fn acquire(&self, key: impl Into<K>) -> AdmissionPermit<K> {
    let slot = Slot {
      key:   key.into(),
      locks: Arc::clone(&self.locks),
    };
    let lock = Arc::clone(self.locks.entry(slot.key.clone()).or_default().value());
    let guard = lock.lock_owned().await;
    AdmissionPermit {
      _guard: guard,
      _slot:  slot,
    }
  }

  /// Number of keys currently held or awaited.
  pub fn in_flight(&self) -> usize { self.locks.len() }
}
