//! Hutch service — placing hutches in rows and housing rabbits in them.

use warren_domain::capacity::{LevelLayout, layout};
use warren_domain::error::{ConflictError, FarmError, NotFoundError, ValidationError};
use warren_domain::hutch::{Hutch, HutchId};
use warren_domain::id::FarmId;
use warren_domain::level::Level;
use warren_domain::occupancy::{check_admission, check_vacant};
use warren_domain::rabbit::Rabbit;
use warren_domain::removal::HutchRemovalRecord;
use warren_domain::row::Row;
use warren_domain::time::now;

use crate::ports::{HutchRepository, RabbitRepository, RemovalHistoryRepository, RowRepository};
use crate::services::rabbit_service::load_rabbit;

/// Input for [`HutchService::add_hutch`].
#[derive(Debug, Clone, Default)]
pub struct NewHutch {
    /// Defaults to the row's first level.
    pub level: Option<Level>,
    pub position: u32,
    pub size: Option<String>,
    pub material: Option<String>,
    pub features: Vec<String>,
}

/// Application service for hutches and their occupants.
pub struct HutchService<R, H, B, L> {
    rows: R,
    hutches: H,
    rabbits: B,
    history: L,
}

impl<R, H, B, L> HutchService<R, H, B, L>
where
    R: RowRepository,
    H: HutchRepository,
    B: RabbitRepository,
    L: RemovalHistoryRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(rows: R, hutches: H, rabbits: B, history: L) -> Self {
        Self {
            rows,
            hutches,
            rabbits,
            history,
        }
    }

    /// Place a new hutch in a row.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] when the level is not one of the row's
    /// levels or the position is zero, [`ConflictError::CapacityExceeded`] when
    /// the row is full, [`ConflictError::DuplicateHutch`] when the coordinate
    /// was ever used, [`FarmError::NotFound`] for an unknown row, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, request), fields(farm_id = %farm_id))]
    pub async fn add_hutch(
        &self,
        farm_id: FarmId,
        row_name: &str,
        request: NewHutch,
    ) -> Result<Hutch, FarmError> {
        let row = self.load_row(farm_id, row_name).await?;

        let mut builder = Hutch::builder(&row).position(request.position);
        if let Some(level) = request.level {
            builder = builder.level(level);
        }
        if let Some(size) = request.size {
            builder = builder.size(size);
        }
        if let Some(material) = request.material {
            builder = builder.material(material);
        }
        for feature in request.features {
            builder = builder.feature(feature);
        }
        let hutch = builder.build()?;

        let active = self.hutches.count_active(farm_id, &row.name).await?;
        if active >= row.capacity {
            tracing::warn!(row = %row.name, active, capacity = row.capacity, "row is full");
            return Err(ConflictError::CapacityExceeded {
                row: row.name,
                capacity: row.capacity,
            }
            .into());
        }

        let created = self
            .hutches
            .create(hutch, row.capacity)
            .await
            .inspect_err(|err| {
                if matches!(err, FarmError::Conflict(_)) {
                    tracing::warn!(error = %err, "hutch rejected by store");
                }
            })?;
        tracing::info!(hutch = %created.id, "hutch added");
        Ok(created)
    }

    /// Soft-delete an empty hutch.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::OccupiedHutch`] when rabbits still live there,
    /// [`FarmError::NotFound`] when the hutch does not exist or is already
    /// removed, or a storage error from the repository.
    #[tracing::instrument(skip(self), fields(farm_id = %farm_id, hutch = %id))]
    pub async fn remove_hutch(&self, farm_id: FarmId, id: &HutchId) -> Result<Hutch, FarmError> {
        let mut hutch = self.load_active_hutch(farm_id, id).await?;
        let occupants = self.rabbits.list_by_hutch(farm_id, &hutch.id).await?;
        check_vacant(&hutch, &occupants).inspect_err(|_| {
            tracing::warn!(occupants = occupants.len(), "hutch is occupied");
        })?;

        self.hutches.soft_delete(farm_id, &hutch.id).await?;
        hutch.is_deleted = true;
        tracing::info!("hutch removed");
        Ok(hutch)
    }

    /// Append an entry to a hutch's removal history.
    ///
    /// Entries may be recorded for removed hutches too.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRemovalReason`] for a blank reason,
    /// [`FarmError::NotFound`] for an unknown hutch or rabbit, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, reason, notes), fields(farm_id = %farm_id, hutch = %id))]
    pub async fn record_removal_history(
        &self,
        farm_id: FarmId,
        id: &HutchId,
        rabbit: &str,
        reason: &str,
        notes: Option<String>,
    ) -> Result<HutchRemovalRecord, FarmError> {
        let hutch = self.load_hutch(farm_id, id).await?;
        let rabbit = load_rabbit(&self.rabbits, farm_id, rabbit).await?;
        let entry = HutchRemovalRecord::new(&hutch, &rabbit, reason, notes, now())?;

        let entry = self.history.append(entry).await?;
        tracing::info!(rabbit = %entry.rabbit_tag, reason = %entry.reason, "removal recorded");
        Ok(entry)
    }

    /// The removal history of a hutch, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn removal_history(
        &self,
        farm_id: FarmId,
        id: &HutchId,
    ) -> Result<Vec<HutchRemovalRecord>, FarmError> {
        self.history.list_for_hutch(farm_id, id).await
    }

    /// The rabbits currently housed in a hutch.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] for an unknown hutch, or a storage
    /// error from the repository.
    pub async fn occupants_of(
        &self,
        farm_id: FarmId,
        id: &HutchId,
    ) -> Result<Vec<Rabbit>, FarmError> {
        let hutch = self.load_hutch(farm_id, id).await?;
        self.rabbits.list_by_hutch(farm_id, &hutch.id).await
    }

    /// Move a rabbit into a hutch.
    ///
    /// A rabbit leaving another hutch gets a `moved` entry in that hutch's
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::HutchFull`] when the hutch already holds two
    /// rabbits, [`ConflictError::IncompatibleOccupants`] when the resident has
    /// the same gender, [`FarmError::NotFound`] when the hutch is unknown or
    /// removed or the rabbit is unknown, or a storage error from the repository.
    #[tracing::instrument(skip(self), fields(farm_id = %farm_id, hutch = %id))]
    pub async fn assign_rabbit(
        &self,
        farm_id: FarmId,
        id: &HutchId,
        rabbit: &str,
    ) -> Result<Rabbit, FarmError> {
        let hutch = self.load_active_hutch(farm_id, id).await?;
        let mut rabbit = load_rabbit(&self.rabbits, farm_id, rabbit).await?;
        if rabbit.hutch_name.as_ref() == Some(&hutch.id) {
            return Ok(rabbit);
        }

        let occupants = self.rabbits.list_by_hutch(farm_id, &hutch.id).await?;
        check_admission(&hutch, &occupants, &rabbit).inspect_err(|err| {
            tracing::warn!(rabbit = %rabbit.rabbit_id, error = %err, "rabbit not admitted");
        })?;

        let previous = rabbit.hutch_name.replace(hutch.id.clone());
        let rabbit = self.rabbits.update(rabbit).await?;
        if let Some(previous) = previous
            && let Some(old) = self.hutches.get_by_id(farm_id, &previous).await?
        {
            let entry = HutchRemovalRecord::new(
                &old,
                &rabbit,
                "moved",
                Some(format!("moved to {}", hutch.id)),
                now(),
            )?;
            self.history.append(entry).await?;
        }
        tracing::info!(rabbit = %rabbit.rabbit_id, "rabbit assigned");
        Ok(rabbit)
    }

    /// Take a rabbit out of its hutch and record why.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotInHutch`] when the rabbit does not live
    /// in `id`, [`ValidationError::EmptyRemovalReason`] for a blank reason,
    /// [`FarmError::NotFound`] for an unknown hutch or rabbit, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, reason, notes), fields(farm_id = %farm_id, hutch = %id))]
    pub async fn release_rabbit(
        &self,
        farm_id: FarmId,
        id: &HutchId,
        rabbit: &str,
        reason: &str,
        notes: Option<String>,
    ) -> Result<HutchRemovalRecord, FarmError> {
        let hutch = self.load_hutch(farm_id, id).await?;
        let mut rabbit = load_rabbit(&self.rabbits, farm_id, rabbit).await?;
        if rabbit.hutch_name.as_ref() != Some(&hutch.id) {
            return Err(ValidationError::NotInHutch {
                rabbit_id: rabbit.rabbit_id,
                hutch_id: hutch.id.to_string(),
            }
            .into());
        }
        let entry = HutchRemovalRecord::new(&hutch, &rabbit, reason, notes, now())?;

        rabbit.hutch_name = None;
        self.rabbits.update(rabbit).await?;
        let entry = self.history.append(entry).await?;
        tracing::info!(rabbit = %entry.rabbit_tag, reason = %entry.reason, "rabbit released");
        Ok(entry)
    }

    /// The non-deleted hutches of a row, by level then position.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] for an unknown row, or a storage error
    /// from the repository.
    pub async fn list_hutches(
        &self,
        farm_id: FarmId,
        row_name: &str,
    ) -> Result<Vec<Hutch>, FarmError> {
        let row = self.load_row(farm_id, row_name).await?;
        self.hutches.list_by_row(farm_id, &row.name).await
    }

    /// Planned hutches per level next to the ones already placed.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] for an unknown row, or a storage error
    /// from the repository.
    pub async fn hutch_layout(
        &self,
        farm_id: FarmId,
        row_name: &str,
    ) -> Result<Vec<LevelLayout>, FarmError> {
        let row = self.load_row(farm_id, row_name).await?;
        let hutches = self.hutches.list_by_row(farm_id, &row.name).await?;
        Ok(layout(&row.distribution()?, &hutches))
    }

    async fn load_row(&self, farm_id: FarmId, name: &str) -> Result<Row, FarmError> {
        self.rows.get_by_name(farm_id, name).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Row",
                id: name.to_string(),
            }
            .into()
        })
    }

    async fn load_hutch(&self, farm_id: FarmId, id: &HutchId) -> Result<Hutch, FarmError> {
        self.hutches.get_by_id(farm_id, id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Hutch",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn load_active_hutch(&self, farm_id: FarmId, id: &HutchId) -> Result<Hutch, FarmError> {
        let hutch = self.load_hutch(farm_id, id).await?;
        if hutch.is_deleted {
            return Err(NotFoundError {
                entity: "Hutch",
                id: id.to_string(),
            }
            .into());
        }
        Ok(hutch)
    }
}
