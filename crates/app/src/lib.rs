//! # warren-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RowRepository`, `HutchRepository`, `RabbitRepository` — farm layout and animals
//!   - `BreedingRecordRepository`, `KitRepository` — breeding cycles and litters
//!   - `RemovalHistoryRepository` — append-only hutch history
//!   - `SnapshotCache` — possibly-stale row lists
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RowService` — create rows, expand capacity
//!   - `HutchService` — add/remove hutches, house and release rabbits
//!   - `RabbitService` — register and look up rabbits
//!   - `BreedingService` — mate, confirm pregnancy, due alerts
//!   - `LitterService` — record litters and their kits
//! - Provide **in-process infrastructure** (snapshot cache) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `warren-domain` only. Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod cache;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
