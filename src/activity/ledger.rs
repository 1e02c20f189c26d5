use chrono::{DateTime, Utc};
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Last access of one container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessRecord {
    /// Monotonic timestamp used for idleness decisions.
    pub at: Instant,
    /// Wall clock timestamp shown in the status listing.
    pub wall: DateTime<Utc>,
}

/// Shared map from container id to its last access.
///
/// The map is split into independently locked shards selected by a hash of the id, so
/// request tasks touching different containers rarely contend. A single shard degrades to
/// one coarse lock, which is fine for small deployments.
///
/// Locks are held only for the map access itself, never across a runtime call.
///
/// An absent entry means "not accessed since process start" and reads as infinitely idle.
pub struct ActivityLedger {
    shards: Vec<Mutex<HashMap<String, AccessRecord>>>,
}

impl ActivityLedger {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, id: &str) -> MutexGuard<'_, HashMap<String, AccessRecord>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        // entries are plain values, a poisoned shard is still consistent
        self.shards[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `id` as accessed now. The stored timestamp never moves backwards.
    pub fn record_access(&self, id: &str) -> Instant {
        let now = Instant::now();
        let record = AccessRecord {
            at: now,
            wall: Utc::now(),
        };
        let mut shard = self.shard(id);
        match shard.get_mut(id) {
            Some(existing) if existing.at > now => {}
            Some(existing) => *existing = record,
            None => {
                shard.insert(id.to_string(), record);
            }
        }
        now
    }

    /// Time elapsed since the last access, `None` when `id` was never accessed.
    pub fn time_since_access(&self, id: &str) -> Option<Duration> {
        self.shard(id)
            .get(id)
            .map(|record| Instant::now().saturating_duration_since(record.at))
    }

    /// Whether `id` has been idle for strictly longer than `timeout`.
    pub fn is_idle(&self, id: &str, timeout: Duration) -> bool {
        match self.time_since_access(id) {
            None => true,
            Some(idle) => idle > timeout,
        }
    }

    pub fn last_access(&self, id: &str) -> Option<DateTime<Utc>> {
        self.shard(id).get(id).map(|record| record.wall)
    }

    /// Removes the entry for `id`.
    pub fn forget(&self, id: &str) -> bool {
        self.shard(id).remove(id).is_some()
    }

    /// Removes the entry for `id` unless it was refreshed after `observed_at`.
    ///
    /// Used after a confirmed stop: an access recorded while the stop was in flight must
    /// survive so the container is not treated as idle on its next wake.
    pub fn forget_if_idle_since(&self, id: &str, observed_at: Instant) -> bool {
        let mut shard = self.shard(id);
        match shard.get(id) {
            Some(record) if record.at > observed_at => {
                debug!(
                    "Keeping ledger entry for {}: accessed while being stopped",
                    id
                );
                false
            }
            Some(_) => shard.remove(id).is_some(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLedger {
    fn default() -> Self {
        Self::new(16)
    }
}
