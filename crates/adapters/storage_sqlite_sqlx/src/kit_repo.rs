//! `SQLite` implementation of [`KitRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteExecutor, SqlitePool};

use warren_app::ports::KitRepository;
use warren_domain::error::{FarmError, ValidationError};
use warren_domain::id::{BreedingRecordId, FarmId, KitId, RabbitId};
use warren_domain::kit::{Kit, KitStatus};
use warren_domain::rabbit::Gender;

use crate::codec::{
    decode_date, decode_parsed, decode_timestamp, encode_date, encode_timestamp,
};
use crate::error::{StorageError, conflict_on_unique};

/// Wrapper for converting database rows into domain [`Kit`].
struct Wrapper(Kit);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let breeding_record_id: uuid::Uuid = row.try_get("breeding_record_id")?;
        let gender: Option<String> = row.try_get("gender")?;
        let status: String = row.try_get("status")?;
        let parent_male_id: Option<uuid::Uuid> = row.try_get("parent_male_id")?;
        let parent_female_id: uuid::Uuid = row.try_get("parent_female_id")?;
        let actual_birth_date: String = row.try_get("actual_birth_date")?;
        let created_at: String = row.try_get("created_at")?;

        let status: KitStatus = decode_parsed(&status)?;

        Ok(Self(Kit {
            id: KitId::from_uuid(id),
            farm_id: FarmId::from_uuid(farm_id),
            breeding_record_id: BreedingRecordId::from_uuid(breeding_record_id),
            kit_number: row.try_get("kit_number")?,
            birth_weight: row.try_get("birth_weight")?,
            gender: gender.as_deref().map(decode_parsed::<Gender>).transpose()?,
            color: row.try_get("color")?,
            status,
            parent_male_id: parent_male_id.map(RabbitId::from_uuid),
            parent_female_id: RabbitId::from_uuid(parent_female_id),
            actual_birth_date: decode_date(&actual_birth_date)?,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO kits
        (id, farm_id, breeding_record_id, kit_number, birth_weight, gender, color,
         status, parent_male_id, parent_female_id, actual_birth_date, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_RECORD: &str = r"
    SELECT * FROM kits
    WHERE farm_id = ? AND breeding_record_id = ?
    ORDER BY kit_number ASC
";

/// Insert one kit. Kits are only written as part of a delivery.
pub(crate) async fn insert_kit<'e, E>(executor: E, kit: &Kit) -> Result<(), FarmError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(INSERT)
        .bind(kit.id.as_uuid())
        .bind(kit.farm_id.as_uuid())
        .bind(kit.breeding_record_id.as_uuid())
        .bind(&kit.kit_number)
        .bind(kit.birth_weight)
        .bind(kit.gender.map(|g| g.to_string()))
        .bind(kit.color.as_deref())
        .bind(kit.status.to_string())
        .bind(kit.parent_male_id.map(RabbitId::as_uuid))
        .bind(kit.parent_female_id.as_uuid())
        .bind(encode_date(kit.actual_birth_date))
        .bind(encode_timestamp(kit.created_at))
        .execute(executor)
        .await
        .map_err(|err| {
            conflict_on_unique(err, || {
                ValidationError::DuplicateKitNumber {
                    kit_number: kit.kit_number.clone(),
                }
                .into()
            })
        })?;
    Ok(())
}

/// `SQLite`-backed kit repository.
pub struct SqliteKitRepository {
    pool: SqlitePool,
}

impl SqliteKitRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KitRepository for SqliteKitRepository {
    async fn list_for_record(
        &self,
        farm_id: FarmId,
        breeding_record_id: BreedingRecordId,
    ) -> Result<Vec<Kit>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_RECORD)
            .bind(farm_id.as_uuid())
            .bind(breeding_record_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
