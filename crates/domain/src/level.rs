//! Levels — the vertical tiers of a row, named `A`, `B`, `C`, …

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, ValidationError};

/// Highest number of levels a row can have (`A` through `Z`).
pub const MAX_LEVELS: usize = 26;

/// A vertical tier within a row, identified by an uppercase letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Level(char);

impl Level {
    /// The level at zero-based `index` (`0` is `A`), if it exists.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        let offset = u8::try_from(index).ok().filter(|i| usize::from(*i) < MAX_LEVELS)?;
        Some(Self(char::from(b'A' + offset)))
    }

    /// The letter identifying this level.
    #[must_use]
    pub fn letter(self) -> char {
        self.0
    }
}

impl TryFrom<char> for Level {
    type Error = ValidationError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let upper = value.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper))
        } else {
            Err(ValidationError::InvalidLevel { value })
        }
    }
}

impl From<Level> for char {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(ValidationError::InvalidLevel {
                value: s.chars().next().unwrap_or(' '),
            }),
        }
    }
}

/// Name `count` levels as consecutive letters starting at `A`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidLevelCount`] when `count` is zero or
/// larger than [`MAX_LEVELS`]; the naming never wraps past `Z`.
pub fn generate_levels(count: usize) -> Result<Vec<Level>, FarmError> {
    if count == 0 || count > MAX_LEVELS {
        return Err(ValidationError::InvalidLevelCount { count }.into());
    }
    Ok((0..count).filter_map(Level::from_index).collect())
}
