//! `SQLite` implementation of [`RemovalHistoryRepository`].
//!
//! The table is append-only: nothing here updates or deletes an entry.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use warren_app::ports::RemovalHistoryRepository;
use warren_domain::error::FarmError;
use warren_domain::hutch::HutchId;
use warren_domain::id::{FarmId, RabbitId, RemovalRecordId};
use warren_domain::removal::HutchRemovalRecord;

use crate::codec::{decode_parsed, decode_timestamp, encode_timestamp};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`HutchRemovalRecord`].
struct Wrapper(HutchRemovalRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let hutch_id: String = row.try_get("hutch_id")?;
        let rabbit_id: uuid::Uuid = row.try_get("rabbit_id")?;
        let removed_at: Option<String> = row.try_get("removed_at")?;
        let recorded_at: String = row.try_get("recorded_at")?;

        Ok(Self(HutchRemovalRecord {
            id: RemovalRecordId::from_uuid(id),
            farm_id: FarmId::from_uuid(farm_id),
            hutch_id: decode_parsed::<HutchId>(&hutch_id)?,
            rabbit_id: RabbitId::from_uuid(rabbit_id),
            rabbit_tag: row.try_get("rabbit_tag")?,
            reason: row.try_get("reason")?,
            notes: row.try_get("notes")?,
            removed_at: removed_at.as_deref().map(decode_timestamp).transpose()?,
            recorded_at: decode_timestamp(&recorded_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO hutch_removals
        (id, farm_id, hutch_id, rabbit_id, rabbit_tag, reason, notes, removed_at, recorded_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_HUTCH: &str = r"
    SELECT * FROM hutch_removals
    WHERE farm_id = ? AND hutch_id = ? AND removed_at IS NOT NULL
    ORDER BY removed_at ASC, recorded_at ASC
";

/// `SQLite`-backed removal history.
pub struct SqliteRemovalHistoryRepository {
    pool: SqlitePool,
}

impl SqliteRemovalHistoryRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RemovalHistoryRepository for SqliteRemovalHistoryRepository {
    async fn append(&self, entry: HutchRemovalRecord) -> Result<HutchRemovalRecord, FarmError> {
        sqlx::query(INSERT)
            .bind(entry.id.as_uuid())
            .bind(entry.farm_id.as_uuid())
            .bind(entry.hutch_id.as_str())
            .bind(entry.rabbit_id.as_uuid())
            .bind(&entry.rabbit_tag)
            .bind(&entry.reason)
            .bind(entry.notes.as_deref())
            .bind(entry.removed_at.map(encode_timestamp))
            .bind(encode_timestamp(entry.recorded_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(entry)
    }

    async fn list_for_hutch(
        &self,
        farm_id: FarmId,
        hutch_id: &HutchId,
    ) -> Result<Vec<HutchRemovalRecord>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_HUTCH)
            .bind(farm_id.as_uuid())
            .bind(hutch_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
