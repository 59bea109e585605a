//! In-process snapshot cache backed by a `RwLock`-guarded map.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use warren_domain::id::FarmId;
use warren_domain::row::Row;

use crate::ports::SnapshotCache;

/// In-process [`SnapshotCache`] keeping one row snapshot per farm.
///
/// A poisoned lock is treated as a cache miss; the store stays authoritative.
#[derive(Debug, Default)]
pub struct InMemorySnapshotCache {
    rows: RwLock<HashMap<FarmId, Vec<Row>>>,
}

impl InMemorySnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotCache for InMemorySnapshotCache {
    fn rows(&self, farm_id: FarmId) -> impl Future<Output = Option<Vec<Row>>> + Send {
        let snapshot = self
            .rows
            .read()
            .ok()
            .and_then(|rows| rows.get(&farm_id).cloned());
        async { snapshot }
    }

    fn store_rows(&self, farm_id: FarmId, rows: Vec<Row>) -> impl Future<Output = ()> + Send {
        if let Ok(mut cached) = self.rows.write() {
            cached.insert(farm_id, rows);
        }
        async {}
    }

    fn invalidate(&self, farm_id: FarmId) -> impl Future<Output = ()> + Send {
        if let Ok(mut cached) = self.rows.write() {
            cached.remove(&farm_id);
        }
        async {}
    }
}

/// A cache that never holds anything; every read goes to the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSnapshotCache;

impl SnapshotCache for NoSnapshotCache {
    fn rows(&self, _farm_id: FarmId) -> impl Future<Output = Option<Vec<Row>>> + Send {
        async { None }
    }

    fn store_rows(&self, _farm_id: FarmId, _rows: Vec<Row>) -> impl Future<Output = ()> + Send {
        async {}
    }

    fn invalidate(&self, _farm_id: FarmId) -> impl Future<Output = ()> + Send {
        async {}
    }
}
