//! Row — a named lane of hutches divided into levels.
//!
//! A row's capacity bounds how many non-deleted hutches it may hold. Capacity
//! only ever grows, and only in steps of at most [`MAX_EXPANSION`] hutches.

mod naming;

pub use naming::{ROW_NAME_POOL, resolve_row_name};

use serde::{Deserialize, Serialize};

use crate::capacity::{HutchDistribution, distribute_hutches};
use crate::error::{ConflictError, FarmError, ValidationError};
use crate::id::FarmId;
use crate::level::{Level, generate_levels};
use crate::time::Timestamp;

/// Largest capacity increase a single expansion may request.
pub const MAX_EXPANSION: u32 = 20;

/// A named lane of caging infrastructure on a farm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub farm_id: FarmId,
    pub name: String,
    pub description: Option<String>,
    pub capacity: u32,
    pub levels: Vec<Level>,
    pub created_at: Timestamp,
}

impl Row {
    /// Create a builder for constructing a [`Row`].
    #[must_use]
    pub fn builder() -> RowBuilder {
        RowBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - `capacity` is zero ([`ValidationError::ZeroCapacity`])
    /// - there are no levels, or more than 26 ([`ValidationError::InvalidLevelCount`])
    pub fn validate(&self) -> Result<(), FarmError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.capacity == 0 {
            return Err(ValidationError::ZeroCapacity.into());
        }
        if self.levels.is_empty() || self.levels.len() > crate::level::MAX_LEVELS {
            return Err(ValidationError::InvalidLevelCount {
                count: self.levels.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether `level` is one of this row's tiers.
    #[must_use]
    pub fn has_level(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// Planned hutches per level for the current capacity.
    ///
    /// # Errors
    ///
    /// Fails only if the row's level list violates its invariants.
    pub fn distribution(&self) -> Result<HutchDistribution, FarmError> {
        distribute_hutches(self.capacity, self.levels.len())
    }

    /// Grow capacity by `additional` hutches and return the step applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidExpansion`] when `additional` is not in
    /// `1..=MAX_EXPANSION` or the grown capacity would not fit in a `u32`;
    /// capacity is left untouched.
    pub fn expand(&mut self, additional: i64) -> Result<u32, FarmError> {
        let step = expansion_step(additional)?;
        self.capacity = self.capacity.checked_add(step).ok_or_else(|| {
            FarmError::from(ConflictError::InvalidExpansion {
                requested: additional.to_string(),
            })
        })?;
        Ok(step)
    }
}

/// Check a requested capacity increase and return it as a step.
fn expansion_step(additional: i64) -> Result<u32, FarmError> {
    u32::try_from(additional)
        .ok()
        .filter(|step| (1..=MAX_EXPANSION).contains(step))
        .ok_or_else(|| {
            ConflictError::InvalidExpansion {
                requested: additional.to_string(),
            }
            .into()
        })
}

/// Parse a user-entered expansion amount.
///
/// # Errors
///
/// Returns [`ConflictError::InvalidExpansion`] when `raw` is not an integer;
/// range and overflow checks happen in [`Row::expand`].
pub fn parse_expansion(raw: &str) -> Result<i64, FarmError> {
    raw.trim().parse::<i64>().map_err(|_| {
        ConflictError::InvalidExpansion {
            requested: raw.to_string(),
        }
        .into()
    })
}

/// Step-by-step builder for [`Row`].
#[derive(Debug, Default)]
pub struct RowBuilder {
    farm_id: Option<FarmId>,
    name: Option<String>,
    description: Option<String>,
    capacity: Option<u32>,
    level_count: Option<usize>,
    created_at: Option<Timestamp>,
}

impl RowBuilder {
    #[must_use]
    pub fn farm_id(mut self, farm_id: FarmId) -> Self {
        self.farm_id = Some(farm_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn level_count(mut self, level_count: usize) -> Self {
        self.level_count = Some(level_count);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder, validate, and return a [`Row`].
    ///
    /// Levels default to a single level `A`.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] if the name is missing, capacity is
    /// zero, or the level count is outside `1..=26`.
    pub fn build(self) -> Result<Row, FarmError> {
        let row = Row {
            farm_id: self.farm_id.unwrap_or_default(),
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            capacity: self.capacity.unwrap_or_default(),
            levels: generate_levels(self.level_count.unwrap_or(1))?,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        row.validate()?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mars() -> Row {
        Row::builder()
            .name("Mars")
            .capacity(9)
            .level_count(3)
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_row_with_named_levels() {
        let row = mars();
        let letters: String = row.levels.iter().map(|l| l.letter()).collect();
        assert_eq!(row.name, "Mars");
        assert_eq!(letters, "ABC");
        assert!(row.description.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_is_blank() {
        let result = Row::builder().name("  ").capacity(4).build();
        assert!(matches!(
            result,
            Err(FarmError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_capacity_is_zero() {
        let result = Row::builder().name("Venus").build();
        assert!(matches!(
            result,
            Err(FarmError::Validation(ValidationError::ZeroCapacity))
        ));
    }

    #[test]
    fn should_distribute_capacity_over_levels() {
        let distribution = mars().distribution().unwrap();
        let counts: Vec<u32> = distribution.iter().map(|(_, c)| c).collect();
        assert_eq!(counts, vec![3, 3, 3]);
    }

    #[test]
    fn should_expand_capacity_within_bounds() {
        let mut row = mars();
        assert_eq!(row.expand(1).unwrap(), 1);
        assert_eq!(row.capacity, 10);
        assert_eq!(row.expand(20).unwrap(), 20);
        assert_eq!(row.capacity, 30);
    }

    #[test]
    fn should_reject_expansion_when_capacity_would_overflow() {
        let mut row = Row::builder()
            .name("Mars")
            .capacity(u32::MAX)
            .build()
            .unwrap();
        let result = row.expand(1);
        assert!(matches!(
            result,
            Err(FarmError::Conflict(ConflictError::InvalidExpansion { .. }))
        ));
        assert_eq!(row.capacity, u32::MAX);
    }

    #[test]
    fn should_reject_expansion_above_ceiling() {
        let mut row = mars();
        let result = row.expand(21);
        assert!(matches!(
            result,
            Err(FarmError::Conflict(ConflictError::InvalidExpansion { .. }))
        ));
        assert_eq!(row.capacity, 9);
    }

    #[test]
    fn should_reject_non_positive_expansion() {
        let mut row = mars();
        assert!(row.expand(0).is_err());
        assert!(row.expand(-1).is_err());
        assert_eq!(row.capacity, 9);
    }

    #[test]
    fn should_reject_non_integer_expansion_text() {
        assert!(matches!(
            parse_expansion("2.5"),
            Err(FarmError::Conflict(ConflictError::InvalidExpansion { .. }))
        ));
        assert_eq!(parse_expansion(" 5 ").unwrap(), 5);
    }

    #[test]
    fn should_report_known_levels() {
        let row = mars();
        assert!(row.has_level(Level::from_index(2).unwrap()));
        assert!(!row.has_level(Level::from_index(3).unwrap()));
    }
}
