//! `SQLite` implementation of [`RowRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row as _, SqlitePool};

use warren_app::ports::RowRepository;
use warren_domain::error::{ConflictError, FarmError, NotFoundError};
use warren_domain::id::FarmId;
use warren_domain::level::Level;
use warren_domain::row::Row;

use crate::codec::{decode_json, decode_timestamp, encode_timestamp};
use crate::error::{StorageError, conflict_on_unique};

/// Wrapper for converting database rows into domain [`Row`].
struct Wrapper(Row);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let levels: String = row.try_get("levels")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Row {
            farm_id: FarmId::from_uuid(farm_id),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            capacity: row.try_get("capacity")?,
            levels: decode_json::<Vec<Level>>(&levels)?,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO farm_rows (farm_id, name, description, capacity, levels, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_NAME: &str = "SELECT * FROM farm_rows WHERE farm_id = ? AND name = ?";

const SELECT_BY_FARM: &str =
    "SELECT * FROM farm_rows WHERE farm_id = ? ORDER BY created_at ASC, name ASC";

const INCREASE_CAPACITY: &str = r"
    UPDATE farm_rows SET capacity = capacity + ?1
    WHERE farm_id = ?2 AND name = ?3 AND capacity + ?1 <= 4294967295
    RETURNING *
";

/// `SQLite`-backed row repository.
pub struct SqliteRowRepository {
    pool: SqlitePool,
}

impl SqliteRowRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RowRepository for SqliteRowRepository {
    async fn create(&self, row: Row) -> Result<Row, FarmError> {
        let levels = serde_json::to_string(&row.levels).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(row.farm_id.as_uuid())
            .bind(&row.name)
            .bind(row.description.as_deref())
            .bind(row.capacity)
            .bind(&levels)
            .bind(encode_timestamp(row.created_at))
            .execute(&self.pool)
            .await
            .map_err(|err| {
                conflict_on_unique(err, || {
                    ConflictError::DuplicateName {
                        name: row.name.clone(),
                    }
                    .into()
                })
            })?;

        Ok(row)
    }

    async fn get_by_name(&self, farm_id: FarmId, name: &str) -> Result<Option<Row>, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
            .bind(farm_id.as_uuid())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn list(&self, farm_id: FarmId) -> Result<Vec<Row>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_FARM)
            .bind(farm_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn increase_capacity(
        &self,
        farm_id: FarmId,
        name: &str,
        additional: u32,
    ) -> Result<Row, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(INCREASE_CAPACITY)
            .bind(additional)
            .bind(farm_id.as_uuid())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if let Some(Wrapper(row)) = row {
            return Ok(row);
        }
        // Nothing updated: either the row is gone or the sum would overflow.
        match self.get_by_name(farm_id, name).await? {
            Some(_) => Err(ConflictError::InvalidExpansion {
                requested: additional.to_string(),
            }
            .into()),
            None => Err(NotFoundError {
                entity: "Row",
                id: name.to_string(),
            }
            .into()),
        }
    }
}
