use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, FarmError};
use crate::id::{BreedingRecordId, FarmId, RabbitId};
use crate::rabbit::Rabbit;
use crate::time::{Date, Timestamp, gestation_end, gestation_start};

/// One mating-to-birth cycle of a doe.
///
/// A record is *open* until `actual_birth_date` is set. A doe has at most one
/// open record at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingRecord {
    pub id: BreedingRecordId,
    pub farm_id: FarmId,
    pub doe_id: RabbitId,
    pub buck_id: Option<RabbitId>,
    pub mating_date: Date,
    pub expected_birth_date: Date,
    pub actual_birth_date: Option<Date>,
    pub number_of_kits: u32,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl BreedingRecord {
    /// Open a record for `doe` mated with `buck` on `mating_date`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `doe` is not female or `buck` is not male.
    pub fn open(
        doe: &Rabbit,
        buck: Option<&Rabbit>,
        mating_date: Date,
        notes: Option<String>,
    ) -> Result<Self, FarmError> {
        doe.ensure_doe()?;
        if let Some(buck) = buck {
            buck.ensure_buck()?;
        }
        Ok(Self {
            id: BreedingRecordId::new(),
            farm_id: doe.farm_id,
            doe_id: doe.id,
            buck_id: buck.map(|b| b.id),
            mating_date,
            expected_birth_date: gestation_end(mating_date),
            actual_birth_date: None,
            number_of_kits: 0,
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: crate::time::now(),
        })
    }

    /// Open a record for a birth that had no recorded mating.
    ///
    /// The mating date is back-dated one gestation period before `birth_date`.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn backdated(
        doe: &Rabbit,
        buck: Option<&Rabbit>,
        birth_date: Date,
        notes: Option<String>,
    ) -> Result<Self, FarmError> {
        Self::open(doe, buck, gestation_start(birth_date), notes)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.actual_birth_date.is_none()
    }

    /// Name `buck` as the sire of this cycle.
    ///
    /// A record without a buck takes this one; a record that already names a
    /// buck only accepts the same rabbit.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `buck` is not male, or
    /// [`ConflictError::BuckMismatch`] when the record names another buck.
    pub fn settle_buck(&mut self, buck: &Rabbit) -> Result<(), FarmError> {
        buck.ensure_buck()?;
        match self.buck_id {
            None => self.buck_id = Some(buck.id),
            Some(recorded) if recorded == buck.id => {}
            Some(recorded) => {
                return Err(ConflictError::BuckMismatch {
                    doe_id: self.doe_id.to_string(),
                    recorded: recorded.to_string(),
                    given: buck.rabbit_id.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Close the record with the litter born on `actual_birth_date`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidTransition`] if the record is already closed.
    pub fn close(&mut self, actual_birth_date: Date, number_of_kits: u32) -> Result<(), FarmError> {
        if !self.is_open() {
            return Err(ConflictError::InvalidTransition {
                doe_id: self.doe_id.to_string(),
                from: "delivered",
                to: "delivered",
            }
            .into());
        }
        self.actual_birth_date = Some(actual_birth_date);
        self.number_of_kits = number_of_kits;
        Ok(())
    }
}
