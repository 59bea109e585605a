//! `SQLite` implementation of [`RabbitRepository`].
//!
//! A doe's pregnancy is stored as a flag plus start and expected dates and
//! rebuilt into a [`Pregnancy`] on read.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteExecutor, SqlitePool};

use warren_app::ports::RabbitRepository;
use warren_domain::error::{ConflictError, FarmError, NotFoundError};
use warren_domain::hutch::HutchId;
use warren_domain::id::{FarmId, RabbitId};
use warren_domain::rabbit::{Gender, Pregnancy, Rabbit};

use crate::codec::{
    decode_optional_date, decode_parsed, decode_timestamp, encode_date, encode_timestamp,
};
use crate::error::{StorageError, conflict_on_unique};

/// Wrapper for converting database rows into domain [`Rabbit`].
struct Wrapper(Rabbit);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let gender: String = row.try_get("gender")?;
        let hutch_name: Option<String> = row.try_get("hutch_name")?;
        let is_pregnant: bool = row.try_get("is_pregnant")?;
        let start: Option<String> = row.try_get("pregnancy_start_date")?;
        let expected: Option<String> = row.try_get("expected_birth_date")?;
        let created_at: String = row.try_get("created_at")?;

        let pregnancy = Pregnancy::from_stored(
            is_pregnant,
            decode_optional_date(start)?,
            decode_optional_date(expected)?,
        )
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Rabbit {
            id: RabbitId::from_uuid(id),
            farm_id: FarmId::from_uuid(farm_id),
            rabbit_id: row.try_get("rabbit_id")?,
            name: row.try_get("name")?,
            gender: decode_parsed::<Gender>(&gender)?,
            hutch_name: hutch_name
                .as_deref()
                .map(decode_parsed::<HutchId>)
                .transpose()?,
            pregnancy,
            total_litters: row.try_get("total_litters")?,
            total_kits: row.try_get("total_kits")?,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO rabbits
        (id, farm_id, rabbit_id, name, gender, hutch_name, is_pregnant,
         pregnancy_start_date, expected_birth_date, total_litters, total_kits, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM rabbits WHERE farm_id = ? AND id = ?";

const SELECT_BY_TAG: &str = "SELECT * FROM rabbits WHERE farm_id = ? AND rabbit_id = ?";

const SELECT_BY_HUTCH: &str =
    "SELECT * FROM rabbits WHERE farm_id = ? AND hutch_name = ? ORDER BY rabbit_id ASC";

const SELECT_PREGNANT: &str = r"
    SELECT * FROM rabbits
    WHERE farm_id = ? AND is_pregnant = 1
    ORDER BY expected_birth_date ASC
";

const UPDATE: &str = r"
    UPDATE rabbits SET
        name = ?, hutch_name = ?, is_pregnant = ?, pregnancy_start_date = ?,
        expected_birth_date = ?, total_litters = ?, total_kits = ?
    WHERE farm_id = ? AND id = ?
";

/// Write the mutable columns of `rabbit`. Shared with the delivery transaction.
pub(crate) async fn update_rabbit<'e, E>(executor: E, rabbit: &Rabbit) -> Result<(), FarmError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(UPDATE)
        .bind(rabbit.name.as_deref())
        .bind(rabbit.hutch_name.as_ref().map(HutchId::as_str))
        .bind(rabbit.pregnancy.is_some())
        .bind(rabbit.pregnancy.map(|p| encode_date(p.start_date())))
        .bind(rabbit.pregnancy.map(|p| encode_date(p.expected_birth_date())))
        .bind(rabbit.total_litters)
        .bind(rabbit.total_kits)
        .bind(rabbit.farm_id.as_uuid())
        .bind(rabbit.id.as_uuid())
        .execute(executor)
        .await
        .map_err(StorageError::from)?;

    if result.rows_affected() == 0 {
        return Err(NotFoundError {
            entity: "Rabbit",
            id: rabbit.rabbit_id.clone(),
        }
        .into());
    }
    Ok(())
}

/// `SQLite`-backed rabbit repository.
pub struct SqliteRabbitRepository {
    pool: SqlitePool,
}

impl SqliteRabbitRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RabbitRepository for SqliteRabbitRepository {
    async fn create(&self, rabbit: Rabbit) -> Result<Rabbit, FarmError> {
        sqlx::query(INSERT)
            .bind(rabbit.id.as_uuid())
            .bind(rabbit.farm_id.as_uuid())
            .bind(&rabbit.rabbit_id)
            .bind(rabbit.name.as_deref())
            .bind(rabbit.gender.to_string())
            .bind(rabbit.hutch_name.as_ref().map(HutchId::as_str))
            .bind(rabbit.pregnancy.is_some())
            .bind(rabbit.pregnancy.map(|p| encode_date(p.start_date())))
            .bind(rabbit.pregnancy.map(|p| encode_date(p.expected_birth_date())))
            .bind(rabbit.total_litters)
            .bind(rabbit.total_kits)
            .bind(encode_timestamp(rabbit.created_at))
            .execute(&self.pool)
            .await
            .map_err(|err| {
                conflict_on_unique(err, || {
                    ConflictError::DuplicateRabbit {
                        rabbit_id: rabbit.rabbit_id.clone(),
                    }
                    .into()
                })
            })?;

        Ok(rabbit)
    }

    async fn get_by_id(&self, farm_id: FarmId, id: RabbitId) -> Result<Option<Rabbit>, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(farm_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn find_by_tag(&self, farm_id: FarmId, tag: &str) -> Result<Option<Rabbit>, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_TAG)
            .bind(farm_id.as_uuid())
            .bind(tag)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn list_by_hutch(
        &self,
        farm_id: FarmId,
        hutch_id: &HutchId,
    ) -> Result<Vec<Rabbit>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_HUTCH)
            .bind(farm_id.as_uuid())
            .bind(hutch_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn list_pregnant(&self, farm_id: FarmId) -> Result<Vec<Rabbit>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PREGNANT)
            .bind(farm_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rabbit: Rabbit) -> Result<Rabbit, FarmError> {
        update_rabbit(&self.pool, &rabbit).await?;
        Ok(rabbit)
    }
}
