//! Rabbit — an animal on the farm, optionally housed in a hutch.

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, ValidationError};
use crate::hutch::HutchId;
use crate::id::{FarmId, RabbitId};
use crate::time::{Date, Timestamp, gestation_end};

/// Biological sex of a rabbit or kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The gender a breeding partner must have.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => f.write_str("male"),
            Self::Female => f.write_str("female"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "buck" => Ok(Self::Male),
            "female" | "f" | "doe" => Ok(Self::Female),
            _ => Err(ValidationError::InvalidGender {
                value: s.to_string(),
            }),
        }
    }
}

/// An ongoing pregnancy. The expected birth date is always the start date
/// plus the gestation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pregnancy {
    start_date: Date,
    expected_birth_date: Date,
}

impl Pregnancy {
    /// A pregnancy that started on `start_date`.
    #[must_use]
    pub fn starting(start_date: Date) -> Self {
        Self {
            start_date,
            expected_birth_date: gestation_end(start_date),
        }
    }

    /// Rebuild a pregnancy from its stored flag/date representation.
    ///
    /// Returns `Ok(None)` when the doe is not pregnant.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InconsistentPregnancy`] when the stored
    /// dates do not describe a gestation period.
    pub fn from_stored(
        is_pregnant: bool,
        start_date: Option<Date>,
        expected_birth_date: Option<Date>,
    ) -> Result<Option<Self>, ValidationError> {
        match (is_pregnant, start_date) {
            (false, _) | (true, None) => Ok(None),
            (true, Some(start)) => {
                let pregnancy = Self::starting(start);
                match expected_birth_date {
                    Some(expected) if expected != pregnancy.expected_birth_date => {
                        Err(ValidationError::InconsistentPregnancy { start, expected })
                    }
                    _ => Ok(Some(pregnancy)),
                }
            }
        }
    }

    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    #[must_use]
    pub fn expected_birth_date(&self) -> Date {
        self.expected_birth_date
    }
}

/// A rabbit. `rabbit_id` is the farm-visible tag (e.g. `RB-010`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rabbit {
    pub id: RabbitId,
    pub farm_id: FarmId,
    pub rabbit_id: String,
    pub name: Option<String>,
    pub gender: Gender,
    pub hutch_name: Option<HutchId>,
    pub pregnancy: Option<Pregnancy>,
    pub total_litters: u32,
    pub total_kits: u32,
    pub created_at: Timestamp,
}

impl Rabbit {
    /// Create a builder for constructing a [`Rabbit`].
    #[must_use]
    pub fn builder() -> RabbitBuilder {
        RabbitBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] when the tag is blank or a buck
    /// carries a pregnancy.
    pub fn validate(&self) -> Result<(), FarmError> {
        if self.rabbit_id.trim().is_empty() {
            return Err(ValidationError::EmptyTag.into());
        }
        if self.gender == Gender::Male && self.pregnancy.is_some() {
            return Err(ValidationError::PregnantBuck.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn is_doe(&self) -> bool {
        self.gender == Gender::Female
    }

    #[must_use]
    pub fn is_pregnant(&self) -> bool {
        self.pregnancy.is_some()
    }

    /// Require this rabbit to be a doe.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotADoe`] for bucks.
    pub fn ensure_doe(&self) -> Result<(), FarmError> {
        if self.is_doe() {
            Ok(())
        } else {
            Err(ValidationError::NotADoe {
                rabbit_id: self.rabbit_id.clone(),
            }
            .into())
        }
    }

    /// Require this rabbit to be a buck.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotABuck`] for does.
    pub fn ensure_buck(&self) -> Result<(), FarmError> {
        if self.is_doe() {
            Err(ValidationError::NotABuck {
                rabbit_id: self.rabbit_id.clone(),
            }
            .into())
        } else {
            Ok(())
        }
    }
}

/// Step-by-step builder for [`Rabbit`].
#[derive(Debug, Default)]
pub struct RabbitBuilder {
    id: Option<RabbitId>,
    farm_id: Option<FarmId>,
    rabbit_id: Option<String>,
    name: Option<String>,
    gender: Option<Gender>,
    hutch_name: Option<HutchId>,
    pregnancy: Option<Pregnancy>,
    created_at: Option<Timestamp>,
}

impl RabbitBuilder {
    #[must_use]
    pub fn id(mut self, id: RabbitId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn farm_id(mut self, farm_id: FarmId) -> Self {
        self.farm_id = Some(farm_id);
        self
    }

    #[must_use]
    pub fn rabbit_id(mut self, rabbit_id: impl Into<String>) -> Self {
        self.rabbit_id = Some(rabbit_id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    #[must_use]
    pub fn hutch_name(mut self, hutch_name: HutchId) -> Self {
        self.hutch_name = Some(hutch_name);
        self
    }

    #[must_use]
    pub fn pregnancy(mut self, pregnancy: Pregnancy) -> Self {
        self.pregnancy = Some(pregnancy);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder, validate, and return a [`Rabbit`].
    ///
    /// Gender defaults to female.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] if the tag is missing or a buck is
    /// given a pregnancy.
    pub fn build(self) -> Result<Rabbit, FarmError> {
        let rabbit = Rabbit {
            id: self.id.unwrap_or_default(),
            farm_id: self.farm_id.unwrap_or_default(),
            rabbit_id: self.rabbit_id.map(|t| t.trim().to_string()).unwrap_or_default(),
            name: self.name,
            gender: self.gender.unwrap_or(Gender::Female),
            hutch_name: self.hutch_name,
            pregnancy: self.pregnancy,
            total_litters: 0,
            total_kits: 0,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        rabbit.validate()?;
        Ok(rabbit)
    }
}
