//! `SQLite` implementation of [`HutchRepository`].

use std::collections::BTreeSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use warren_app::ports::HutchRepository;
use warren_domain::error::{ConflictError, FarmError, NotFoundError};
use warren_domain::hutch::{Hutch, HutchId};
use warren_domain::id::FarmId;
use warren_domain::level::Level;

use crate::codec::{decode_json, decode_parsed, decode_timestamp, encode_timestamp};
use crate::error::{StorageError, conflict_on_unique};

/// Wrapper for converting database rows into domain [`Hutch`].
struct Wrapper(Hutch);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let id: String = row.try_get("id")?;
        let level: String = row.try_get("level")?;
        let features: String = row.try_get("features")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Hutch {
            id: decode_parsed::<HutchId>(&id)?,
            farm_id: FarmId::from_uuid(farm_id),
            row_name: row.try_get("row_name")?,
            level: decode_parsed::<Level>(&level)?,
            position: row.try_get("position")?,
            size: row.try_get("size")?,
            material: row.try_get("material")?,
            features: decode_json::<BTreeSet<String>>(&features)?,
            is_deleted: row.try_get("is_deleted")?,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

/// Inserts only while the row holds fewer active hutches than the bound capacity.
const INSERT_WITHIN_CAPACITY: &str = r"
    INSERT INTO hutches
        (farm_id, id, row_name, level, position, size, material, features, is_deleted, created_at)
    SELECT ?, ?, ?, ?, ?, ?, ?, ?, 0, ?
    WHERE (
        SELECT COUNT(*) FROM hutches
        WHERE farm_id = ? AND row_name = ? AND is_deleted = 0
    ) < ?
";

const SELECT_BY_ID: &str = "SELECT * FROM hutches WHERE farm_id = ? AND id = ?";

const SELECT_ACTIVE_BY_ROW: &str = r"
    SELECT * FROM hutches
    WHERE farm_id = ? AND row_name = ? AND is_deleted = 0
    ORDER BY level ASC, position ASC
";

const COUNT_ACTIVE_BY_ROW: &str =
    "SELECT COUNT(*) FROM hutches WHERE farm_id = ? AND row_name = ? AND is_deleted = 0";

const SOFT_DELETE: &str = "UPDATE hutches SET is_deleted = 1 WHERE farm_id = ? AND id = ?";

/// `SQLite`-backed hutch repository.
pub struct SqliteHutchRepository {
    pool: SqlitePool,
}

impl SqliteHutchRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl HutchRepository for SqliteHutchRepository {
    async fn create(&self, hutch: Hutch, capacity: u32) -> Result<Hutch, FarmError> {
        let features = serde_json::to_string(&hutch.features).map_err(StorageError::from)?;

        let result = sqlx::query(INSERT_WITHIN_CAPACITY)
            .bind(hutch.farm_id.as_uuid())
            .bind(hutch.id.as_str())
            .bind(&hutch.row_name)
            .bind(hutch.level.to_string())
            .bind(hutch.position)
            .bind(&hutch.size)
            .bind(&hutch.material)
            .bind(&features)
            .bind(encode_timestamp(hutch.created_at))
            .bind(hutch.farm_id.as_uuid())
            .bind(&hutch.row_name)
            .bind(capacity)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                conflict_on_unique(err, || {
                    ConflictError::DuplicateHutch {
                        id: hutch.id.to_string(),
                    }
                    .into()
                })
            })?;

        if result.rows_affected() == 0 {
            return Err(ConflictError::CapacityExceeded {
                row: hutch.row_name,
                capacity,
            }
            .into());
        }
        Ok(hutch)
    }

    async fn get_by_id(&self, farm_id: FarmId, id: &HutchId) -> Result<Option<Hutch>, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(farm_id.as_uuid())
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn list_by_row(&self, farm_id: FarmId, row_name: &str) -> Result<Vec<Hutch>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE_BY_ROW)
            .bind(farm_id.as_uuid())
            .bind(row_name)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn count_active(&self, farm_id: FarmId, row_name: &str) -> Result<u32, FarmError> {
        let count: i64 = sqlx::query_scalar(COUNT_ACTIVE_BY_ROW)
            .bind(farm_id.as_uuid())
            .bind(row_name)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        u32::try_from(count)
            .map_err(|_| StorageError::Decode(format!("hutch count {count}")).into())
    }

    async fn soft_delete(&self, farm_id: FarmId, id: &HutchId) -> Result<(), FarmError> {
        let result = sqlx::query(SOFT_DELETE)
            .bind(farm_id.as_uuid())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Hutch",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
