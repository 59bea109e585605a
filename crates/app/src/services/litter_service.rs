//! Litter service — records a delivery and the kits born in it.

use warren_domain::breeding::{BreedingEvent, BreedingRecord, BreedingState};
use warren_domain::error::{FarmError, NotFoundError};
use warren_domain::id::{BreedingRecordId, FarmId};
use warren_domain::kit::Kit;
use warren_domain::litter::LitterInput;

use crate::ports::{BreedingRecordRepository, Delivery, KitRepository, RabbitRepository};
use crate::services::rabbit_service::load_rabbit;

/// Result of [`LitterService::record_litter`].
#[derive(Debug, Clone)]
pub struct LitterOutcome {
    pub breeding_record_id: BreedingRecordId,
    pub created_kits: Vec<Kit>,
}

/// Application service for litters.
pub struct LitterService<B, BR, K> {
    rabbits: B,
    records: BR,
    kits: K,
}

impl<B, BR, K> LitterService<B, BR, K>
where
    B: RabbitRepository,
    BR: BreedingRecordRepository,
    K: KitRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(rabbits: B, records: BR, kits: K) -> Self {
        Self {
            rabbits,
            records,
            kits,
        }
    }

    /// Record a litter born to `doe`.
    ///
    /// The whole litter is validated before anything is written. The doe's
    /// open breeding record is closed, or a record back-dated one gestation
    /// period is created when there is none. Her pregnancy is cleared and her
    /// litter totals grow. The record, the doe and the kits are committed
    /// together.
    ///
    /// Kits take the record's buck as their father. A `buck` given here fills
    /// in a record that has none and must match one that does.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] for malformed litter input or a
    /// wrong-gender parent, [`FarmError::NotFound`] for an unknown rabbit,
    /// [`BuckMismatch`](warren_domain::error::ConflictError::BuckMismatch)
    /// when `buck` differs from the record's,
    /// a [`FarmError::Conflict`] when the record was closed concurrently, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self, input), fields(farm_id = %farm_id, kits = input.kits.len()))]
    pub async fn record_litter(
        &self,
        farm_id: FarmId,
        doe: &str,
        buck: Option<&str>,
        input: &LitterInput,
    ) -> Result<LitterOutcome, FarmError> {
        let litter = input.validate().inspect_err(|err| {
            tracing::warn!(error = %err, "litter rejected");
        })?;

        let mut doe = load_rabbit(&self.rabbits, farm_id, doe).await?;
        doe.ensure_doe()?;
        let buck = match buck {
            Some(key) => Some(load_rabbit(&self.rabbits, farm_id, key).await?),
            None => None,
        };
        if let Some(buck) = &buck {
            buck.ensure_buck()?;
        }

        let born = litter.actual_birth_date;
        let open = self.records.find_open_for_doe(farm_id, doe.id).await?;
        BreedingState::of(&doe, open.as_ref())
            .apply(BreedingEvent::Deliver { on: born })
            .and_then(|delivered| delivered.apply(BreedingEvent::Release))
            .map_err(|rejected| rejected.for_doe(&doe))?;

        let (mut record, record_is_new) = match open {
            Some(record) => (record, false),
            None => (
                BreedingRecord::backdated(&doe, buck.as_ref(), born, litter.notes.clone())?,
                true,
            ),
        };
        if let Some(buck) = &buck {
            record.settle_buck(buck).inspect_err(|err| {
                tracing::warn!(error = %err, "litter rejected");
            })?;
        }
        let size = litter.size();
        record.close(born, size)?;
        if record.notes.is_none() {
            record.notes.clone_from(&litter.notes);
        }

        doe.pregnancy = None;
        doe.total_litters = doe.total_litters.saturating_add(1);
        doe.total_kits = doe.total_kits.saturating_add(size);

        let kits = litter.into_kits(&record);
        let delivery = self
            .records
            .record_delivery(Delivery {
                record,
                record_is_new,
                doe,
                kits,
            })
            .await
            .inspect_err(|err| {
                if matches!(err, FarmError::Conflict(_)) {
                    tracing::warn!(error = %err, "delivery rejected by store");
                }
            })?;

        tracing::info!(
            doe = %delivery.doe.rabbit_id,
            record = %delivery.record.id,
            kits = delivery.kits.len(),
            backdated = delivery.record_is_new,
            "litter recorded"
        );
        Ok(LitterOutcome {
            breeding_record_id: delivery.record.id,
            created_kits: delivery.kits,
        })
    }

    /// The kits of one litter, ordered by kit number.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] for an unknown breeding record, or a
    /// storage error from the repository.
    pub async fn list_kits(
        &self,
        farm_id: FarmId,
        breeding_record_id: BreedingRecordId,
    ) -> Result<Vec<Kit>, FarmError> {
        if self
            .records
            .get_by_id(farm_id, breeding_record_id)
            .await?
            .is_none()
        {
            return Err(NotFoundError {
                entity: "BreedingRecord",
                id: breeding_record_id.to_string(),
            }
            .into());
        }
        self.kits.list_for_record(farm_id, breeding_record_id).await
    }
}
