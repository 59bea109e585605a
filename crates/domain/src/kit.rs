//! Kit — one offspring of a litter, tied to a breeding record.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{BreedingRecordId, FarmId, KitId, RabbitId};
use crate::rabbit::Gender;
use crate::time::{Date, Timestamp};

/// Whether a kit was alive at recording time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KitStatus {
    Alive,
    Dead,
}

impl std::fmt::Display for KitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alive => f.write_str("alive"),
            Self::Dead => f.write_str("dead"),
        }
    }
}

impl std::str::FromStr for KitStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alive" => Ok(Self::Alive),
            "dead" => Ok(Self::Dead),
            _ => Err(ValidationError::UnknownKitStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A recorded offspring. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kit {
    pub id: KitId,
    pub farm_id: FarmId,
    pub breeding_record_id: BreedingRecordId,
    pub kit_number: String,
    pub birth_weight: Option<f64>,
    pub gender: Option<Gender>,
    pub color: Option<String>,
    pub status: KitStatus,
    pub parent_male_id: Option<RabbitId>,
    pub parent_female_id: RabbitId,
    pub actual_birth_date: Date,
    pub created_at: Timestamp,
}

impl Kit {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == KitStatus::Alive
    }
}
