//! `SQLite` implementation of [`BreedingRecordRepository`].
//!
//! A partial unique index keeps at most one open record per doe, and a
//! delivery writes the record, the doe and the kits in one transaction.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteExecutor, SqlitePool};

use warren_app::ports::{BreedingRecordRepository, Delivery};
use warren_domain::breeding::BreedingRecord;
use warren_domain::error::{ConflictError, FarmError};
use warren_domain::id::{BreedingRecordId, FarmId, RabbitId};

use crate::codec::{
    decode_date, decode_optional_date, decode_timestamp, encode_date, encode_timestamp,
};
use crate::error::{StorageError, conflict_on_unique};
use crate::kit_repo::insert_kit;
use crate::rabbit_repo::update_rabbit;

/// Wrapper for converting database rows into domain [`BreedingRecord`].
struct Wrapper(BreedingRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let doe_id: uuid::Uuid = row.try_get("doe_id")?;
        let buck_id: Option<uuid::Uuid> = row.try_get("buck_id")?;
        let mating_date: String = row.try_get("mating_date")?;
        let expected_birth_date: String = row.try_get("expected_birth_date")?;
        let actual_birth_date: Option<String> = row.try_get("actual_birth_date")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(BreedingRecord {
            id: BreedingRecordId::from_uuid(id),
            farm_id: FarmId::from_uuid(farm_id),
            doe_id: RabbitId::from_uuid(doe_id),
            buck_id: buck_id.map(RabbitId::from_uuid),
            mating_date: decode_date(&mating_date)?,
            expected_birth_date: decode_date(&expected_birth_date)?,
            actual_birth_date: decode_optional_date(actual_birth_date)?,
            number_of_kits: row.try_get("number_of_kits")?,
            notes: row.try_get("notes")?,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO breeding_records
        (id, farm_id, doe_id, buck_id, mating_date, expected_birth_date,
         actual_birth_date, number_of_kits, notes, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM breeding_records WHERE farm_id = ? AND id = ?";

const SELECT_OPEN_FOR_DOE: &str = r"
    SELECT * FROM breeding_records
    WHERE farm_id = ? AND doe_id = ? AND actual_birth_date IS NULL
";

const SELECT_FOR_DOE: &str = r"
    SELECT * FROM breeding_records
    WHERE farm_id = ? AND doe_id = ?
    ORDER BY mating_date ASC, created_at ASC
";

const COUNT_OPEN_FOR_DOE: &str =
    "SELECT COUNT(*) FROM breeding_records WHERE doe_id = ? AND actual_birth_date IS NULL";

/// Closes the record only if nobody closed it first.
const CLOSE_IF_OPEN: &str = r"
    UPDATE breeding_records
    SET actual_birth_date = ?, number_of_kits = ?, notes = ?, buck_id = ?
    WHERE farm_id = ? AND id = ? AND actual_birth_date IS NULL
";

async fn insert_record<'e, E>(executor: E, record: &BreedingRecord) -> Result<(), FarmError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(INSERT)
        .bind(record.id.as_uuid())
        .bind(record.farm_id.as_uuid())
        .bind(record.doe_id.as_uuid())
        .bind(record.buck_id.map(RabbitId::as_uuid))
        .bind(encode_date(record.mating_date))
        .bind(encode_date(record.expected_birth_date))
        .bind(record.actual_birth_date.map(encode_date))
        .bind(record.number_of_kits)
        .bind(record.notes.as_deref())
        .bind(encode_timestamp(record.created_at))
        .execute(executor)
        .await
        .map_err(|err| {
            conflict_on_unique(err, || {
                ConflictError::OpenBreedingRecord {
                    doe_id: record.doe_id.to_string(),
                }
                .into()
            })
        })?;
    Ok(())
}

/// `SQLite`-backed breeding record repository.
pub struct SqliteBreedingRecordRepository {
    pool: SqlitePool,
}

impl SqliteBreedingRecordRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl BreedingRecordRepository for SqliteBreedingRecordRepository {
    async fn open(&self, record: BreedingRecord) -> Result<BreedingRecord, FarmError> {
        insert_record(&self.pool, &record).await?;
        Ok(record)
    }

    async fn get_by_id(
        &self,
        farm_id: FarmId,
        id: BreedingRecordId,
    ) -> Result<Option<BreedingRecord>, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(farm_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn find_open_for_doe(
        &self,
        farm_id: FarmId,
        doe_id: RabbitId,
    ) -> Result<Option<BreedingRecord>, FarmError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_OPEN_FOR_DOE)
            .bind(farm_id.as_uuid())
            .bind(doe_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn list_for_doe(
        &self,
        farm_id: FarmId,
        doe_id: RabbitId,
    ) -> Result<Vec<BreedingRecord>, FarmError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_FOR_DOE)
            .bind(farm_id.as_uuid())
            .bind(doe_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn record_delivery(&self, delivery: Delivery) -> Result<Delivery, FarmError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        let record = &delivery.record;

        if delivery.record_is_new {
            let open: i64 = sqlx::query_scalar(COUNT_OPEN_FOR_DOE)
                .bind(record.doe_id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if open > 0 {
                return Err(ConflictError::OpenBreedingRecord {
                    doe_id: delivery.doe.rabbit_id.clone(),
                }
                .into());
            }
            insert_record(&mut *tx, record).await?;
        } else {
            let result = sqlx::query(CLOSE_IF_OPEN)
                .bind(record.actual_birth_date.map(encode_date))
                .bind(record.number_of_kits)
                .bind(record.notes.as_deref())
                .bind(record.buck_id.map(RabbitId::as_uuid))
                .bind(record.farm_id.as_uuid())
                .bind(record.id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() == 0 {
                return Err(ConflictError::InvalidTransition {
                    doe_id: delivery.doe.rabbit_id.clone(),
                    from: "delivered",
                    to: "delivered",
                }
                .into());
            }
        }

        update_rabbit(&mut *tx, &delivery.doe).await?;
        for kit in &delivery.kits {
            insert_kit(&mut *tx, kit).await?;
        }

        tx.commit().await.map_err(StorageError::from)?;
        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit_repo::SqliteKitRepository;
    use crate::pool::Config;
    use crate::rabbit_repo::SqliteRabbitRepository;
    use chrono::NaiveDate;
    use warren_app::ports::{KitRepository, RabbitRepository};
    use warren_domain::kit::Kit;
    use warren_domain::litter::{KitInput, LitterInput};
    use warren_domain::rabbit::{Gender, Pregnancy, Rabbit};
    use warren_domain::time::Date;

    struct Fixture {
        pool: SqlitePool,
        repo: SqliteBreedingRecordRepository,
        doe: Rabbit,
        buck: Rabbit,
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> Fixture {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let pool = db.pool().clone();
        let rabbits = SqliteRabbitRepository::new(pool.clone());
        let farm = FarmId::new();
        let doe = rabbits
            .create(
                Rabbit::builder()
                    .farm_id(farm)
                    .rabbit_id("RB-010")
                    .pregnancy(Pregnancy::starting(date(2025, 1, 1)))
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();
        let buck = rabbits
            .create(
                Rabbit::builder()
                    .farm_id(farm)
                    .rabbit_id("RB-020")
                    .gender(Gender::Male)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();
        Fixture {
            repo: SqliteBreedingRecordRepository::new(pool.clone()),
            pool,
            doe,
            buck,
        }
    }

    fn kits(record: &BreedingRecord, numbers: &[&str]) -> Vec<Kit> {
        LitterInput {
            actual_birth_date: "2025-02-01".to_string(),
            kits: numbers.iter().map(|n| KitInput::new(*n, "alive")).collect(),
            notes: None,
        }
        .validate()
        .unwrap()
        .into_kits(record)
    }

    fn delivered_doe(doe: &Rabbit, kits: u32) -> Rabbit {
        let mut doe = doe.clone();
        doe.pregnancy = None;
        doe.total_litters += 1;
        doe.total_kits += kits;
        doe
    }

    #[tokio::test]
    async fn should_open_and_find_record_for_doe() {
        let fx = setup().await;
        let record =
            BreedingRecord::open(&fx.doe, Some(&fx.buck), date(2025, 1, 1), None).unwrap();
        fx.repo.open(record.clone()).await.unwrap();

        let open = fx
            .repo
            .find_open_for_doe(fx.doe.farm_id, fx.doe.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(open.id, record.id);
        assert_eq!(open.buck_id, Some(fx.buck.id));
        assert_eq!(open.expected_birth_date, date(2025, 2, 1));
    }

    #[tokio::test]
    async fn should_reject_second_open_record_for_doe() {
        let fx = setup().await;
        fx.repo
            .open(BreedingRecord::open(&fx.doe, None, date(2025, 1, 1), None).unwrap())
            .await
            .unwrap();

        let result = fx
            .repo
            .open(BreedingRecord::open(&fx.doe, None, date(2025, 1, 3), None).unwrap())
            .await;
        assert!(matches!(
            result,
            Err(FarmError::Conflict(ConflictError::OpenBreedingRecord { .. }))
        ));
    }

    #[tokio::test]
    async fn should_commit_delivery_atomically() {
        let fx = setup().await;
        let mut record =
            BreedingRecord::open(&fx.doe, Some(&fx.buck), date(2025, 1, 1), None).unwrap();
        fx.repo.open(record.clone()).await.unwrap();
        record.close(date(2025, 2, 1), 2).unwrap();
        let kits = kits(&record, &["K1", "K2"]);

        fx.repo
            .record_delivery(Delivery {
                record: record.clone(),
                record_is_new: false,
                doe: delivered_doe(&fx.doe, 2),
                kits,
            })
            .await
            .unwrap();

        let stored = fx
            .repo
            .get_by_id(fx.doe.farm_id, record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.actual_birth_date, Some(date(2025, 2, 1)));
        assert_eq!(stored.number_of_kits, 2);

        let doe = SqliteRabbitRepository::new(fx.pool.clone())
            .get_by_id(fx.doe.farm_id, fx.doe.id)
            .await
            .unwrap()
            .unwrap();
        assert!(doe.pregnancy.is_none());
        assert_eq!(doe.total_kits, 2);

        let stored_kits = SqliteKitRepository::new(fx.pool.clone())
            .list_for_record(fx.doe.farm_id, record.id)
            .await
            .unwrap();
        assert_eq!(stored_kits.len(), 2);
        assert!(
            fx.repo
                .find_open_for_doe(fx.doe.farm_id, fx.doe.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn should_roll_back_when_record_already_closed() {
        let fx = setup().await;
        let mut record = BreedingRecord::open(&fx.doe, None, date(2025, 1, 1), None).unwrap();
        fx.repo.open(record.clone()).await.unwrap();
        record.close(date(2025, 2, 1), 1).unwrap();

        fx.repo
            .record_delivery(Delivery {
                record: record.clone(),
                record_is_new: false,
                doe: delivered_doe(&fx.doe, 1),
                kits: kits(&record, &["K1"]),
            })
            .await
            .unwrap();

        let replay = fx
            .repo
            .record_delivery(Delivery {
                record: record.clone(),
                record_is_new: false,
                doe: delivered_doe(&fx.doe, 1),
                kits: kits(&record, &["K9"]),
            })
            .await;
        assert!(matches!(
            replay,
            Err(FarmError::Conflict(ConflictError::InvalidTransition { .. }))
        ));

        let stored_kits = SqliteKitRepository::new(fx.pool.clone())
            .list_for_record(fx.doe.farm_id, record.id)
            .await
            .unwrap();
        assert_eq!(stored_kits.len(), 1);
    }

    #[tokio::test]
    async fn should_insert_backdated_record_on_delivery() {
        let fx = setup().await;
        let mut record =
            BreedingRecord::backdated(&fx.doe, None, date(2025, 2, 1), None).unwrap();
        record.close(date(2025, 2, 1), 1).unwrap();

        fx.repo
            .record_delivery(Delivery {
                record: record.clone(),
                record_is_new: true,
                doe: delivered_doe(&fx.doe, 1),
                kits: kits(&record, &["K1"]),
            })
            .await
            .unwrap();

        let history = fx
            .repo
            .list_for_doe(fx.doe.farm_id, fx.doe.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].mating_date, date(2025, 1, 1));
        assert!(!history[0].is_open());
    }
}
