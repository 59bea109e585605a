//! Snapshot cache port — read-through cache of farm layout snapshots.
//!
//! A cached snapshot may be stale. Services only use it for reads and rely on
//! the authoritative repositories to reject conflicting writes. After a
//! successful write, services invalidate the farm's snapshot; they never edit
//! cached contents.

use std::future::Future;

use warren_domain::id::FarmId;
use warren_domain::row::Row;

/// Cache of per-farm row lists.
pub trait SnapshotCache {
    /// The cached rows of a farm, if a snapshot is held.
    fn rows(&self, farm_id: FarmId) -> impl Future<Output = Option<Vec<Row>>> + Send;

    /// Replace the farm's snapshot with an authoritative row list.
    fn store_rows(&self, farm_id: FarmId, rows: Vec<Row>) -> impl Future<Output = ()> + Send;

    /// Drop the farm's snapshot so the next read goes to the store.
    fn invalidate(&self, farm_id: FarmId) -> impl Future<Output = ()> + Send;
}

impl<T: SnapshotCache + Send + Sync> SnapshotCache for std::sync::Arc<T> {
    fn rows(&self, farm_id: FarmId) -> impl Future<Output = Option<Vec<Row>>> + Send {
        (**self).rows(farm_id)
    }

    fn store_rows(&self, farm_id: FarmId, rows: Vec<Row>) -> impl Future<Output = ()> + Send {
        (**self).store_rows(farm_id, rows)
    }

    fn invalidate(&self, farm_id: FarmId) -> impl Future<Output = ()> + Send {
        (**self).invalidate(farm_id)
    }
}
