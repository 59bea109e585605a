//! Capacity distribution — how a row's hutch capacity spreads over its levels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FarmError;
use crate::hutch::Hutch;
use crate::level::{Level, generate_levels};

/// Planned number of hutches per level, ordered `A`, `B`, `C`, …
///
/// Advisory only: hutches are created one at a time with
/// `add_hutch`, this merely seeds the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HutchDistribution(BTreeMap<Level, u32>);

impl HutchDistribution {
    /// Planned hutch count for `level`, zero when the level is unknown.
    #[must_use]
    pub fn count_for(&self, level: Level) -> u32 {
        self.0.get(&level).copied().unwrap_or(0)
    }

    /// Sum over all levels. Always equals the distributed capacity.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Iterate over `(level, count)` pairs in level order.
    pub fn iter(&self) -> impl Iterator<Item = (Level, u32)> + '_ {
        self.0.iter().map(|(level, count)| (*level, *count))
    }
}

/// Split `capacity` as evenly as possible over `level_count` levels.
///
/// Every level gets `capacity / level_count`; the first
/// `capacity % level_count` levels get one more.
///
/// # Errors
///
/// Returns a validation error when `level_count` is outside `1..=26`.
pub fn distribute_hutches(
    capacity: u32,
    level_count: usize,
) -> Result<HutchDistribution, FarmError> {
    let levels = generate_levels(level_count)?;
    // level_count <= 26, the cast cannot truncate
    #[allow(clippy::cast_possible_truncation)]
    let divisor = level_count as u32;
    let base = capacity / divisor;
    let remainder = (capacity % divisor) as usize;

    let counts = levels
        .into_iter()
        .enumerate()
        .map(|(index, level)| (level, base + u32::from(index < remainder)))
        .collect();
    Ok(HutchDistribution(counts))
}

/// Planned versus materialised hutches on one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: Level,
    pub planned: u32,
    pub active: u32,
}

/// Pair a distribution with the non-deleted hutches actually placed.
///
/// Deleted hutches and hutches on levels outside the distribution are ignored.
#[must_use]
pub fn layout(distribution: &HutchDistribution, hutches: &[Hutch]) -> Vec<LevelLayout> {
    distribution
        .iter()
        .map(|(level, planned)| {
            let active = hutches
                .iter()
                .filter(|h| !h.is_deleted && h.level == level)
                .count();
            LevelLayout {
                level,
                planned,
                active: u32::try_from(active).unwrap_or(u32::MAX),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(distribution: &HutchDistribution) -> Vec<(char, u32)> {
        distribution.iter().map(|(l, c)| (l.letter(), c)).collect()
    }

    #[test]
    fn should_split_evenly_when_capacity_divides() {
        let distribution = distribute_hutches(9, 3).unwrap();
        assert_eq!(letters(&distribution), vec![('A', 3), ('B', 3), ('C', 3)]);
    }

    #[test]
    fn should_give_remainder_to_earliest_levels() {
        let distribution = distribute_hutches(11, 4).unwrap();
        assert_eq!(
            letters(&distribution),
            vec![('A', 3), ('B', 3), ('C', 3), ('D', 2)]
        );
    }

    #[test]
    fn should_allow_levels_with_no_hutches() {
        let distribution = distribute_hutches(2, 5).unwrap();
        assert_eq!(
            letters(&distribution),
            vec![('A', 1), ('B', 1), ('C', 0), ('D', 0), ('E', 0)]
        );
    }

    #[test]
    fn should_always_sum_to_capacity() {
        for capacity in 0..=120 {
            for level_count in 1..=26 {
                let distribution = distribute_hutches(capacity, level_count).unwrap();
                assert_eq!(distribution.total(), capacity, "{capacity}/{level_count}");
            }
        }
    }

    #[test]
    fn should_differ_by_at_most_one_between_levels() {
        for capacity in 0..=60 {
            for level_count in 1..=26 {
                let distribution = distribute_hutches(capacity, level_count).unwrap();
                let counts: Vec<u32> = distribution.iter().map(|(_, c)| c).collect();
                let remainder = capacity as usize % level_count;
                let base = capacity / level_count as u32;
                for (index, count) in counts.iter().enumerate() {
                    let expected = if index < remainder { base + 1 } else { base };
                    assert_eq!(*count, expected);
                }
            }
        }
    }

    #[test]
    fn should_reject_zero_levels() {
        assert!(distribute_hutches(10, 0).is_err());
    }

    #[test]
    fn should_return_zero_for_unknown_level() {
        let distribution = distribute_hutches(4, 2).unwrap();
        let z = Level::from_index(25).unwrap();
        assert_eq!(distribution.count_for(z), 0);
    }

    #[test]
    fn should_count_active_hutches_per_level() {
        let row = crate::row::Row::builder()
            .name("Mars")
            .capacity(9)
            .level_count(3)
            .build()
            .unwrap();
        let a1 = Hutch::builder(&row).position(1).build().unwrap();
        let mut a2 = Hutch::builder(&row).position(2).build().unwrap();
        a2.is_deleted = true;
        let c1 = Hutch::builder(&row)
            .level(Level::from_index(2).unwrap())
            .position(1)
            .build()
            .unwrap();

        let levels = layout(&row.distribution().unwrap(), &[a1, a2, c1]);
        let active: Vec<(char, u32, u32)> = levels
            .iter()
            .map(|l| (l.level.letter(), l.planned, l.active))
            .collect();
        assert_eq!(active, vec![('A', 3, 1), ('B', 3, 0), ('C', 3, 1)]);
    }
}
