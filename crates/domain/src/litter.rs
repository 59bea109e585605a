//! Litter input and validation.
//!
//! A litter arrives as raw user input ([`LitterInput`]). It is validated as a
//! whole into a [`Litter`] before anything is written; the first problem found
//! is reported and no kit is created.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::breeding::BreedingRecord;
use crate::error::{FarmError, ValidationError};
use crate::id::KitId;
use crate::kit::{Kit, KitStatus};
use crate::rabbit::Gender;
use crate::time::{Date, parse_date};

/// One kit as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KitInput {
    pub kit_number: String,
    pub status: String,
    pub birth_weight: Option<String>,
    pub gender: Option<Gender>,
    pub color: Option<String>,
}

impl KitInput {
    #[must_use]
    pub fn new(kit_number: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kit_number: kit_number.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_weight(mut self, birth_weight: impl Into<String>) -> Self {
        self.birth_weight = Some(birth_weight.into());
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A litter as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LitterInput {
    pub actual_birth_date: String,
    pub kits: Vec<KitInput>,
    pub notes: Option<String>,
}

/// A kit that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidKit {
    pub kit_number: String,
    pub status: KitStatus,
    pub birth_weight: Option<f64>,
    pub gender: Option<Gender>,
    pub color: Option<String>,
}

/// A validated litter, ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Litter {
    pub actual_birth_date: Date,
    pub kits: Vec<ValidKit>,
    pub notes: Option<String>,
}

impl LitterInput {
    /// Validate the whole litter.
    ///
    /// Checks, in order: the birth date parses; there is at least one kit;
    /// each kit has a number and a status of `alive` or `dead`; each given
    /// birth weight is a number above zero; kit numbers are unique.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] naming the first offending field and kit.
    pub fn validate(&self) -> Result<Litter, FarmError> {
        let actual_birth_date =
            parse_date(&self.actual_birth_date).ok_or_else(|| ValidationError::InvalidBirthDate {
                value: self.actual_birth_date.clone(),
            })?;
        if self.kits.is_empty() {
            return Err(ValidationError::EmptyLitter.into());
        }

        let kits = self
            .kits
            .iter()
            .enumerate()
            .map(|(index, input)| validate_kit(index + 1, input))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(kits.len());
        if let Some(duplicate) = kits.iter().find(|kit| !seen.insert(kit.kit_number.as_str())) {
            return Err(ValidationError::DuplicateKitNumber {
                kit_number: duplicate.kit_number.clone(),
            }
            .into());
        }

        Ok(Litter {
            actual_birth_date,
            kits,
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
        })
    }
}

fn validate_kit(index: usize, input: &KitInput) -> Result<ValidKit, ValidationError> {
    let kit_number = input.kit_number.trim();
    if kit_number.is_empty() {
        return Err(ValidationError::MissingKitField {
            index,
            field: "kit_number",
        });
    }
    if input.status.trim().is_empty() {
        return Err(ValidationError::MissingKitField {
            index,
            field: "status",
        });
    }
    let status = input
        .status
        .parse::<KitStatus>()
        .map_err(|_| ValidationError::InvalidKitStatus {
            kit_number: kit_number.to_string(),
            value: input.status.clone(),
        })?;

    let birth_weight = match input.birth_weight.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w > 0.0)
                .ok_or_else(|| ValidationError::InvalidBirthWeight {
                    kit_number: kit_number.to_string(),
                    value: raw.to_string(),
                })?,
        ),
    };

    Ok(ValidKit {
        kit_number: kit_number.to_string(),
        status,
        birth_weight,
        gender: input.gender,
        color: input
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string),
    })
}

impl Litter {
    /// Number of kits in the litter.
    #[must_use]
    pub fn size(&self) -> u32 {
        u32::try_from(self.kits.len()).unwrap_or(u32::MAX)
    }

    /// Create one [`Kit`] per validated entry, attached to `record` and its
    /// parents.
    #[must_use]
    pub fn into_kits(self, record: &BreedingRecord) -> Vec<Kit> {
        let created_at = crate::time::now();
        self.kits
            .into_iter()
            .map(|kit| Kit {
                id: KitId::new(),
                farm_id: record.farm_id,
                breeding_record_id: record.id,
                kit_number: kit.kit_number,
                birth_weight: kit.birth_weight,
                gender: kit.gender,
                color: kit.color,
                status: kit.status,
                parent_male_id: record.buck_id,
                parent_female_id: record.doe_id,
                actual_birth_date: self.actual_birth_date,
                created_at,
            })
            .collect()
    }
}
