//! Hutch — an individual caging unit at a (row, level, position) coordinate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, ValidationError};
use crate::id::FarmId;
use crate::level::Level;
use crate::row::Row;
use crate::time::Timestamp;

/// Composed hutch name, `{row}-{level}{position}` (e.g. `Mars-A1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HutchId(String);

impl HutchId {
    /// Compose the id of the hutch at `level`/`position` in `row_name`.
    #[must_use]
    pub fn compose(row_name: &str, level: Level, position: u32) -> Self {
        Self(format!("{row_name}-{level}{position}"))
    }

    /// Split the id back into `(row_name, level, position)`.
    ///
    /// Row names may themselves contain `-`, so the split happens at the last one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedHutchId`] when the id does not
    /// follow the composed form.
    pub fn parts(&self) -> Result<(&str, Level, u32), ValidationError> {
        let malformed = || ValidationError::MalformedHutchId {
            value: self.0.clone(),
        };
        let (row, slot) = self.0.rsplit_once('-').ok_or_else(malformed)?;
        let mut chars = slot.chars();
        let level = chars
            .next()
            .and_then(|c| Level::try_from(c).ok())
            .ok_or_else(malformed)?;
        let digits = chars.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let position = digits.parse::<u32>().map_err(|_| malformed())?;
        if row.is_empty() || position == 0 {
            return Err(malformed());
        }
        Ok((row, level, position))
    }

    /// Borrow the id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HutchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for HutchId {
    type Err = ValidationError;

    /// Parses and rewrites into the composed form, so `Mars-a01` reads as `Mars-A1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = Self(s.trim().to_string());
        let (row, level, position) = raw.parts()?;
        Ok(Self::compose(row, level, position))
    }
}

/// A caging unit. Occupancy is not stored here; it is derived from the
/// rabbits whose `hutch_name` references this hutch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hutch {
    pub id: HutchId,
    pub farm_id: FarmId,
    pub row_name: String,
    pub level: Level,
    pub position: u32,
    pub size: String,
    pub material: String,
    pub features: BTreeSet<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
}

impl Hutch {
    /// Start building a hutch placed in `row`.
    #[must_use]
    pub fn builder(row: &Row) -> HutchBuilder {
        HutchBuilder {
            farm_id: row.farm_id,
            row_name: row.name.clone(),
            row_levels: row.levels.clone(),
            level: None,
            position: None,
            size: None,
            material: None,
            features: BTreeSet::new(),
            created_at: None,
        }
    }
}

/// Step-by-step builder for [`Hutch`].
#[derive(Debug)]
pub struct HutchBuilder {
    farm_id: FarmId,
    row_name: String,
    row_levels: Vec<Level>,
    level: Option<Level>,
    position: Option<u32>,
    size: Option<String>,
    material: Option<String>,
    features: BTreeSet<String>,
    created_at: Option<Timestamp>,
}

impl HutchBuilder {
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    #[must_use]
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        let feature = feature.into();
        if !feature.trim().is_empty() {
            self.features.insert(feature.trim().to_string());
        }
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder and return a [`Hutch`] with its composed id.
    ///
    /// Size defaults to `medium` and material to `wire`.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] when the level is not one of the
    /// row's levels or the position is zero.
    pub fn build(self) -> Result<Hutch, FarmError> {
        let level = self
            .level
            .or_else(|| self.row_levels.first().copied())
            .ok_or(ValidationError::InvalidLevelCount { count: 0 })?;
        if !self.row_levels.contains(&level) {
            return Err(ValidationError::UnknownLevel {
                row: self.row_name,
                level: level.letter(),
            }
            .into());
        }
        let position = self.position.unwrap_or(1);
        if position == 0 {
            return Err(ValidationError::ZeroPosition.into());
        }

        Ok(Hutch {
            id: HutchId::compose(&self.row_name, level, position),
            farm_id: self.farm_id,
            row_name: self.row_name,
            level,
            position,
            size: self.size.unwrap_or_else(|| "medium".to_string()),
            material: self.material.unwrap_or_else(|| "wire".to_string()),
            features: self.features,
            is_deleted: false,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        })
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

    fn level(letter: char) -> Level {
        Level::try_from(letter).unwrap()
    }

    #[test]
    fn should_compose_id_from_row_level_and_position() {
        let hutch = Hutch::builder(&mars())
            .level(level('A'))
            .position(1)
            .build()
            .unwrap();
        assert_eq!(hutch.id.as_str(), "Mars-A1");
        assert_eq!(hutch.row_name, "Mars");
        assert!(!hutch.is_deleted);
    }

    #[test]
    fn should_reconstruct_parts_from_id() {
        let id = HutchId::compose("Row-17", level('C'), 12);
        let (row, lvl, position) = id.parts().unwrap();
        assert_eq!(row, "Row-17");
        assert_eq!(lvl, level('C'));
        assert_eq!(position, 12);
    }

    #[test]
    fn should_reject_level_outside_row() {
        let result = Hutch::builder(&mars()).level(level('D')).position(1).build();
        assert!(matches!(
            result,
            Err(FarmError::Validation(ValidationError::UnknownLevel { level: 'D', .. }))
        ));
    }

    #[test]
    fn should_reject_position_zero() {
        let result = Hutch::builder(&mars()).level(level('B')).position(0).build();
        assert!(matches!(
            result,
            Err(FarmError::Validation(ValidationError::ZeroPosition))
        ));
    }

    #[test]
    fn should_collect_distinct_features() {
        let hutch = Hutch::builder(&mars())
            .feature("nest box")
            .feature("nest box")
            .feature("  ")
            .feature("water bottle")
            .build()
            .unwrap();
        assert_eq!(hutch.features.len(), 2);
        assert_eq!(hutch.size, "medium");
        assert_eq!(hutch.material, "wire");
    }

    #[test]
    fn should_parse_valid_id_and_reject_malformed() {
        assert!("Mars-B3".parse::<HutchId>().is_ok());
        assert!("Mars".parse::<HutchId>().is_err());
        assert!("Mars-3B".parse::<HutchId>().is_err());
        assert!("Mars-A0".parse::<HutchId>().is_err());
        assert!("Mars-A+1".parse::<HutchId>().is_err());
        assert!("Mars-A".parse::<HutchId>().is_err());
    }

    #[test]
    fn should_parse_lowercase_level_into_stored_form() {
        let id: HutchId = " Mars-a01 ".parse().unwrap();
        assert_eq!(id, HutchId::compose("Mars", level('A'), 1));
        assert_eq!(id.as_str(), "Mars-A1");
    }
}
