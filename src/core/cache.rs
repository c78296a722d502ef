use crate::{
    core::ranking::{Snapshot, SnapshotBuilder},
    error::BoardResult,
};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, warn};

struct Stored {
    snapshot: Arc<Snapshot>,
    expires_at: Instant,
}

/// Single-slot TTL cache over the snapshot builder.
///
/// Rebuilds are single-flight: concurrent demand for a stale snapshot runs
/// the builder once, never N times. Callers arriving while a rebuild is in
/// flight are served the previous snapshot when one exists; only cold-start
/// callers (empty slot) wait for the rebuild to finish.
pub struct SnapshotCache {
    builder: SnapshotBuilder,
    ttl: Duration,
    // Locked for pointer swaps only, never across an await.
    slot: RwLock<Option<Stored>>,
    // Held for the duration of a rebuild.
    rebuild: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(builder: SnapshotBuilder, ttl: Duration) -> Self {
        Self {
            builder,
            ttl,
            slot: RwLock::new(None),
            rebuild: Mutex::new(()),
        }
    }

    /// Serve the cached snapshot, rebuilding it once the TTL has elapsed.
    ///
    /// A rebuild failure keeps the previous snapshot in service; the failure
    /// only reaches the caller when the cache has nothing to fall back on.
    pub async fn get(&self) -> BoardResult<Arc<Snapshot>> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        match self.rebuild.try_lock() {
            Ok(guard) => self.rebuild_slot(guard).await,
            Err(_) => match self.stored() {
                // A rebuild is already in flight, serve the previous snapshot.
                Some(snapshot) => Ok(snapshot),
                // Cold start with a rebuild in flight: wait our turn.
                None => {
                    let guard = self.rebuild.lock().await;
                    self.rebuild_slot(guard).await
                }
            },
        }
    }

    async fn rebuild_slot(&self, _guard: MutexGuard<'_, ()>) -> BoardResult<Arc<Snapshot>> {
        // Another flight may have filled the slot while we waited for the lock.
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        match self.builder.build().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let stored = Stored {
                    snapshot: snapshot.clone(),
                    expires_at: Instant::now() + self.ttl,
                };
                // The slot is replaced wholesale, readers never observe a
                // partially built snapshot.
                *self.slot.write().unwrap() = Some(stored);
                debug!("Snapshot rebuilt, next refresh in {:?}.", self.ttl);
                Ok(snapshot)
            }
            Err(e) => match self.stored() {
                Some(snapshot) => {
                    // Keep serving the previous snapshot; the next read past
                    // the TTL will retry the rebuild.
                    warn!("Snapshot rebuild failed, serving previous snapshot. {e}");
                    Ok(snapshot)
                }
                None => Err(e),
            },
        }
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        let slot = self.slot.read().unwrap();
        slot.as_ref()
            .filter(|stored| Instant::now() < stored.expires_at)
            .map(|stored| stored.snapshot.clone())
    }

    fn stored(&self) -> Option<Arc<Snapshot>> {
        let slot = self.slot.read().unwrap();
        slot.as_ref().map(|stored| stored.snapshot.clone())
    }
}
