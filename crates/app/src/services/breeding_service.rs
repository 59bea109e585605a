//! Breeding service — drives a doe through mating and pregnancy.
//!
//! Delivery closes the cycle and lives in the litter service, since it also
//! records the kits.

use warren_domain::breeding::{BreedingEvent, BreedingRecord, BreedingState};
use warren_domain::error::FarmError;
use warren_domain::id::FarmId;
use warren_domain::rabbit::Rabbit;
use warren_domain::time::Date;

use crate::ports::{BreedingRecordRepository, RabbitRepository};
use crate::services::rabbit_service::load_rabbit;

/// Application service for the breeding cycle of does.
pub struct BreedingService<B, BR> {
    rabbits: B,
    records: BR,
}

impl<B: RabbitRepository, BR: BreedingRecordRepository> BreedingService<B, BR> {
    /// Create a new service backed by the given repositories.
    pub fn new(rabbits: B, records: BR) -> Self {
        Self { rabbits, records }
    }

    /// Record a mating and open a breeding record for the doe.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] when `doe` is not female or `buck` is
    /// not male, `ConflictError::OpenBreedingRecord` when the doe already has
    /// an open record, [`FarmError::NotFound`] for an unknown rabbit, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, notes), fields(farm_id = %farm_id))]
    pub async fn mate_doe(
        &self,
        farm_id: FarmId,
        doe: &str,
        buck: Option<&str>,
        mating_date: Date,
        notes: Option<String>,
    ) -> Result<BreedingRecord, FarmError> {
        let doe = load_rabbit(&self.rabbits, farm_id, doe).await?;
        let buck = match buck {
            Some(key) => Some(load_rabbit(&self.rabbits, farm_id, key).await?),
            None => None,
        };
        let record = BreedingRecord::open(&doe, buck.as_ref(), mating_date, notes)?;

        self.transition(&doe, BreedingEvent::Mate { on: mating_date })
            .await?;
        let created = self.records.open(record).await.inspect_err(|err| {
            tracing::warn!(doe = %doe.rabbit_id, error = %err, "breeding record rejected by store");
        })?;
        tracing::info!(
            doe = %doe.rabbit_id,
            mating_date = %created.mating_date,
            expected_birth_date = %created.expected_birth_date,
            "doe mated"
        );
        Ok(created)
    }

    /// Confirm that a mated doe is pregnant.
    ///
    /// `start_date` defaults to the mating date of her open record.
    ///
    /// # Errors
    ///
    /// Returns `ConflictError::InvalidTransition` when the doe is not in the
    /// mated state, [`FarmError::Validation`] for a buck,
    /// [`FarmError::NotFound`] for an unknown rabbit, or a storage error from
    /// the repository.
    #[tracing::instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn confirm_pregnancy(
        &self,
        farm_id: FarmId,
        doe: &str,
        start_date: Option<Date>,
    ) -> Result<Rabbit, FarmError> {
        let mut doe = load_rabbit(&self.rabbits, farm_id, doe).await?;
        doe.ensure_doe()?;
        let open = self.records.find_open_for_doe(farm_id, doe.id).await?;
        let since = start_date
            .or_else(|| open.as_ref().map(|record| record.mating_date))
            .unwrap_or_else(warren_domain::time::today);

        let next = self
            .transition(&doe, BreedingEvent::ConfirmPregnancy { since })
            .await?;
        doe.pregnancy = next.pregnancy();
        let updated = self.rabbits.update(doe).await?;
        tracing::info!(doe = %updated.rabbit_id, since = %since, "pregnancy confirmed");
        Ok(updated)
    }

    /// Where a doe currently stands in her breeding cycle.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] for an unknown rabbit, or a storage
    /// error from the repository.
    pub async fn breeding_state(
        &self,
        farm_id: FarmId,
        doe: &str,
    ) -> Result<BreedingState, FarmError> {
        let doe = load_rabbit(&self.rabbits, farm_id, doe).await?;
        self.state_of(&doe).await
    }

    /// All breeding records of a doe, ordered by mating date.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] for an unknown rabbit, or a storage
    /// error from the repository.
    pub async fn breeding_history(
        &self,
        farm_id: FarmId,
        doe: &str,
    ) -> Result<Vec<BreedingRecord>, FarmError> {
        let doe = load_rabbit(&self.rabbits, farm_id, doe).await?;
        self.records.list_for_doe(farm_id, doe.id).await
    }

    /// Pregnant does within a week of their expected birth date on `today`,
    /// soonest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn due_does(&self, farm_id: FarmId, today: Date) -> Result<Vec<Rabbit>, FarmError> {
        let mut due: Vec<Rabbit> = self
            .rabbits
            .list_pregnant(farm_id)
            .await?
            .into_iter()
            .filter(|doe| BreedingState::of(doe, None).is_due(today))
            .collect();
        due.sort_by_key(|doe| doe.pregnancy.map(|p| p.expected_birth_date()));
        Ok(due)
    }

    async fn state_of(&self, doe: &Rabbit) -> Result<BreedingState, FarmError> {
        let open = self.records.find_open_for_doe(doe.farm_id, doe.id).await?;
        Ok(BreedingState::of(doe, open.as_ref()))
    }

    async fn transition(
        &self,
        doe: &Rabbit,
        event: BreedingEvent,
    ) -> Result<BreedingState, FarmError> {
        let state = self.state_of(doe).await?;
        state.apply(event).map_err(|rejected| {
            tracing::warn!(
                doe = %doe.rabbit_id,
                from = rejected.from,
                to = rejected.to,
                "breeding transition rejected"
            );
            rejected.for_doe(doe)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rabbit_service::{NewRabbit, RabbitService};
    use crate::testing::InMemoryStore;
    use chrono::NaiveDate;
    use warren_domain::error::{ConflictError, ValidationError};
    use warren_domain::rabbit::Gender;

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (FarmId, BreedingService<InMemoryStore, InMemoryStore>) {
        let store = InMemoryStore::default();
        let farm = FarmId::new();
        let rabbits = RabbitService::new(store.clone());
        for (tag, gender) in [
            ("RB-010", Gender::Female),
            ("RB-011", Gender::Female),
            ("RB-020", Gender::Male),
        ] {
            rabbits
                .register_rabbit(
                    farm,
                    NewRabbit {
                        tag: tag.to_string(),
                        name: None,
                        gender,
                    },
                )
                .await
                .unwrap();
        }
        (farm, BreedingService::new(store.clone(), store))
    }

    #[tokio::test]
    async fn should_open_record_due_after_gestation() {
        let (farm, svc) = setup().await;
        let record = svc
            .mate_doe(farm, "RB-010", Some("RB-020"), date(2025, 1, 1), None)
            .await
            .unwrap();
        assert_eq!(record.expected_birth_date, date(2025, 2, 1));
        assert!(record.is_open());
        assert_eq!(
            svc.breeding_state(farm, "RB-010").await.unwrap(),
            BreedingState::Mated {
                since: date(2025, 1, 1)
            }
        );
    }

    #[tokio::test]
    async fn should_reject_second_mating_while_record_open() {
        let (farm, svc) = setup().await;
        svc.mate_doe(farm, "RB-010", None, date(2025, 1, 1), None)
            .await
            .unwrap();

        let result = svc
            .mate_doe(farm, "RB-010", None, date(2025, 1, 5), None)
            .await;
        assert!(matches!(
            result,
            Err(FarmError::Conflict(ConflictError::OpenBreedingRecord { .. }))
        ));
        assert_eq!(svc.breeding_history(farm, "RB-010").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_buck_as_doe_and_doe_as_buck() {
        let (farm, svc) = setup().await;
        let result = svc
            .mate_doe(farm, "RB-020", None, date(2025, 1, 1), None)
            .await;
        assert!(matches!(
            result,
            Err(FarmError::Validation(ValidationError::NotADoe { .. }))
        ));

        let result = svc
            .mate_doe(farm, "RB-010", Some("RB-011"), date(2025, 1, 1), None)
            .await;
        assert!(matches!(
            result,
            Err(FarmError::Validation(ValidationError::NotABuck { .. }))
        ));
    }

    #[tokio::test]
    async fn should_confirm_pregnancy_from_mating_date() {
        let (farm, svc) = setup().await;
        svc.mate_doe(farm, "RB-010", Some("RB-020"), date(2025, 1, 1), None)
            .await
            .unwrap();

        let doe = svc.confirm_pregnancy(farm, "RB-010", None).await.unwrap();
        let pregnancy = doe.pregnancy.unwrap();
        assert_eq!(pregnancy.start_date(), date(2025, 1, 1));
        assert_eq!(pregnancy.expected_birth_date(), date(2025, 2, 1));
        assert!(matches!(
            svc.breeding_state(farm, "RB-010").await.unwrap(),
            BreedingState::Pregnant { .. }
        ));
    }

    #[tokio::test]
    async fn should_reject_confirmation_without_mating() {
        let (farm, svc) = setup().await;
        let result = svc
            .confirm_pregnancy(farm, "RB-010", Some(date(2025, 1, 1)))
            .await;
        assert!(matches!(
            result,
            Err(FarmError::Conflict(ConflictError::InvalidTransition {
                from: "available",
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn should_list_only_does_inside_due_window() {
        let (farm, svc) = setup().await;
        svc.mate_doe(farm, "RB-010", None, date(2025, 1, 1), None)
            .await
            .unwrap();
        svc.confirm_pregnancy(farm, "RB-010", None).await.unwrap();
        svc.mate_doe(farm, "RB-011", None, date(2025, 1, 20), None)
            .await
            .unwrap();
        svc.confirm_pregnancy(farm, "RB-011", None).await.unwrap();

        assert!(svc.due_does(farm, date(2025, 1, 24)).await.unwrap().is_empty());

        let due = svc.due_does(farm, date(2025, 1, 25)).await.unwrap();
        let tags: Vec<&str> = due.iter().map(|r| r.rabbit_id.as_str()).collect();
        assert_eq!(tags, vec!["RB-010"]);

        let due = svc.due_does(farm, date(2025, 2, 14)).await.unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].rabbit_id, "RB-010");
    }
}
