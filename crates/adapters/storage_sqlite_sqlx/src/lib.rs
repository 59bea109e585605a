//! # warren-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `warren-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Enforce the uniqueness and capacity rules with constraints, conditional
//!   inserts and transactions
//!
//! ## Dependency rule
//! Depends on `warren-app` (for port traits) and `warren-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod codec;
pub mod error;
pub mod pool;

mod breeding_repo;
mod hutch_repo;
mod kit_repo;
mod rabbit_repo;
mod removal_history_repo;
mod row_repo;

pub use breeding_repo::SqliteBreedingRecordRepository;
pub use hutch_repo::SqliteHutchRepository;
pub use kit_repo::SqliteKitRepository;
pub use rabbit_repo::SqliteRabbitRepository;
pub use removal_history_repo::SqliteRemovalHistoryRepository;
pub use row_repo::SqliteRowRepository;
