//! Storage ports — repository traits for persistence.
//!
//! Repositories are the authoritative store. Besides plain CRUD they enforce
//! the uniqueness and capacity rules that must hold under concurrent writers
//! (unique row names and hutch ids, conditional hutch and breeding-record
//! inserts, a single transaction for a delivery) and report violations as
//! [`ConflictError`](warren_domain::error::ConflictError)s.

use std::future::Future;

use warren_domain::breeding::BreedingRecord;
use warren_domain::error::FarmError;
use warren_domain::hutch::{Hutch, HutchId};
use warren_domain::id::{BreedingRecordId, FarmId, RabbitId};
use warren_domain::kit::Kit;
use warren_domain::rabbit::Rabbit;
use warren_domain::removal::HutchRemovalRecord;
use warren_domain::row::Row;

/// Repository for persisting and querying [`Row`]s.
pub trait RowRepository {
    /// Create a new row.
    ///
    /// Fails with `ConflictError::DuplicateName` when the farm already has a
    /// row with that name.
    fn create(&self, row: Row) -> impl Future<Output = Result<Row, FarmError>> + Send;

    /// Get a row by its farm-scoped name.
    fn get_by_name(
        &self,
        farm_id: FarmId,
        name: &str,
    ) -> impl Future<Output = Result<Option<Row>, FarmError>> + Send;

    /// List a farm's rows, oldest first.
    fn list(&self, farm_id: FarmId) -> impl Future<Output = Result<Vec<Row>, FarmError>> + Send;

    /// Add `additional` hutches to a row's stored capacity and return the
    /// updated row. The increment is applied to the stored value, so
    /// concurrent expansions add up.
    fn increase_capacity(
        &self,
        farm_id: FarmId,
        name: &str,
        additional: u32,
    ) -> impl Future<Output = Result<Row, FarmError>> + Send;
}

/// Repository for persisting and querying [`Hutch`]es.
pub trait HutchRepository {
    /// Create a hutch if its row holds fewer than `capacity` non-deleted hutches.
    ///
    /// Fails with `ConflictError::CapacityExceeded` when the row is full and
    /// `ConflictError::DuplicateHutch` when the id is taken, deleted or not.
    fn create(
        &self,
        hutch: Hutch,
        capacity: u32,
    ) -> impl Future<Output = Result<Hutch, FarmError>> + Send;

    /// Get a hutch by id, including soft-deleted ones.
    fn get_by_id(
        &self,
        farm_id: FarmId,
        id: &HutchId,
    ) -> impl Future<Output = Result<Option<Hutch>, FarmError>> + Send;

    /// List the non-deleted hutches of a row, ordered by level then position.
    fn list_by_row(
        &self,
        farm_id: FarmId,
        row_name: &str,
    ) -> impl Future<Output = Result<Vec<Hutch>, FarmError>> + Send;

    /// Count the non-deleted hutches of a row.
    fn count_active(
        &self,
        farm_id: FarmId,
        row_name: &str,
    ) -> impl Future<Output = Result<u32, FarmError>> + Send;

    /// Mark a hutch as deleted. The row is kept for the removal history.
    fn soft_delete(
        &self,
        farm_id: FarmId,
        id: &HutchId,
    ) -> impl Future<Output = Result<(), FarmError>> + Send;
}

/// Repository for persisting and querying [`Rabbit`]s.
pub trait RabbitRepository {
    /// Create a new rabbit. Fails with `ConflictError::DuplicateRabbit` when
    /// the tag is taken on the farm.
    fn create(&self, rabbit: Rabbit) -> impl Future<Output = Result<Rabbit, FarmError>> + Send;

    /// Get a rabbit by its unique identifier.
    fn get_by_id(
        &self,
        farm_id: FarmId,
        id: RabbitId,
    ) -> impl Future<Output = Result<Option<Rabbit>, FarmError>> + Send;

    /// Get a rabbit by its farm-visible tag.
    fn find_by_tag(
        &self,
        farm_id: FarmId,
        tag: &str,
    ) -> impl Future<Output = Result<Option<Rabbit>, FarmError>> + Send;

    /// List the rabbits whose `hutch_name` is `hutch_id`.
    fn list_by_hutch(
        &self,
        farm_id: FarmId,
        hutch_id: &HutchId,
    ) -> impl Future<Output = Result<Vec<Rabbit>, FarmError>> + Send;

    /// List the does currently carrying a pregnancy.
    fn list_pregnant(
        &self,
        farm_id: FarmId,
    ) -> impl Future<Output = Result<Vec<Rabbit>, FarmError>> + Send;

    /// Persist hutch assignment, pregnancy, and litter totals.
    fn update(&self, rabbit: Rabbit) -> impl Future<Output = Result<Rabbit, FarmError>> + Send;
}

/// Everything a delivered litter changes, committed as one unit.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// The closed breeding record.
    pub record: BreedingRecord,
    /// Whether the record was created for this delivery.
    pub record_is_new: bool,
    /// The doe with her pregnancy cleared and totals updated.
    pub doe: Rabbit,
    /// The new kits.
    pub kits: Vec<Kit>,
}

/// Repository for persisting and querying [`BreedingRecord`]s.
pub trait BreedingRecordRepository {
    /// Insert an open record unless the doe already has one.
    ///
    /// Fails with `ConflictError::OpenBreedingRecord` otherwise.
    fn open(
        &self,
        record: BreedingRecord,
    ) -> impl Future<Output = Result<BreedingRecord, FarmError>> + Send;

    /// Get a record by its unique identifier.
    fn get_by_id(
        &self,
        farm_id: FarmId,
        id: BreedingRecordId,
    ) -> impl Future<Output = Result<Option<BreedingRecord>, FarmError>> + Send;

    /// The doe's open record, if any.
    fn find_open_for_doe(
        &self,
        farm_id: FarmId,
        doe_id: RabbitId,
    ) -> impl Future<Output = Result<Option<BreedingRecord>, FarmError>> + Send;

    /// All records of a doe, ordered by mating date.
    fn list_for_doe(
        &self,
        farm_id: FarmId,
        doe_id: RabbitId,
    ) -> impl Future<Output = Result<Vec<BreedingRecord>, FarmError>> + Send;

    /// Commit a delivery: write the closed record, the doe, and the kits in
    /// one transaction.
    ///
    /// An existing record is only closed if it is still open; otherwise the
    /// whole delivery fails with `ConflictError::InvalidTransition`.
    fn record_delivery(
        &self,
        delivery: Delivery,
    ) -> impl Future<Output = Result<Delivery, FarmError>> + Send;
}

/// Read access to recorded [`Kit`]s. Kits are written by
/// [`BreedingRecordRepository::record_delivery`].
pub trait KitRepository {
    /// The kits of one litter, ordered by kit number.
    fn list_for_record(
        &self,
        farm_id: FarmId,
        breeding_record_id: BreedingRecordId,
    ) -> impl Future<Output = Result<Vec<Kit>, FarmError>> + Send;
}

/// Append-only removal history of hutches.
pub trait RemovalHistoryRepository {
    /// Append an entry.
    fn append(
        &self,
        entry: HutchRemovalRecord,
    ) -> impl Future<Output = Result<HutchRemovalRecord, FarmError>> + Send;

    /// Entries for a hutch that have a `removed_at`, oldest first.
    fn list_for_hutch(
        &self,
        farm_id: FarmId,
        hutch_id: &HutchId,
    ) -> impl Future<Output = Result<Vec<HutchRemovalRecord>, FarmError>> + Send;
}
