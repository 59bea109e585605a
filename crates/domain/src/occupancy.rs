//! Occupancy rules for hutches.
//!
//! A hutch holds at most two rabbits and, when it holds two, they form a
//! breeding pair (one doe, one buck). A hutch can only be removed when empty.

use crate::error::{ConflictError, FarmError};
use crate::hutch::Hutch;
use crate::rabbit::Rabbit;

/// Most rabbits a single hutch may hold.
pub const MAX_OCCUPANTS: usize = 2;

/// Check that `candidate` may move into `hutch`, given its current occupants.
///
/// A rabbit already housed in the hutch is not counted twice.
///
/// # Errors
///
/// - [`ConflictError::HutchFull`] when the hutch already holds two rabbits
/// - [`ConflictError::IncompatibleOccupants`] when the resident has the same gender
pub fn check_admission(
    hutch: &Hutch,
    occupants: &[Rabbit],
    candidate: &Rabbit,
) -> Result<(), FarmError> {
    let others: Vec<&Rabbit> = occupants.iter().filter(|r| r.id != candidate.id).collect();
    if others.len() >= MAX_OCCUPANTS {
        return Err(ConflictError::HutchFull {
            id: hutch.id.to_string(),
        }
        .into());
    }
    if others.iter().any(|resident| resident.gender == candidate.gender) {
        return Err(ConflictError::IncompatibleOccupants {
            id: hutch.id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Check that `hutch` has no occupants and may be removed.
///
/// # Errors
///
/// Returns [`ConflictError::OccupiedHutch`] when any rabbit is housed there.
pub fn check_vacant(hutch: &Hutch, occupants: &[Rabbit]) -> Result<(), FarmError> {
    if occupants.is_empty() {
        Ok(())
    } else {
        Err(ConflictError::OccupiedHutch {
            id: hutch.id.to_string(),
            occupants: occupants.len(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::rabbit::Gender;
    use crate::row::Row;

    fn hutch() -> Hutch {
        let row = Row::builder()
            .name("Earth")
            .capacity(4)
            .level_count(2)
            .build()
            .unwrap();
        Hutch::builder(&row)
            .level(Level::from_index(0).unwrap())
            .position(1)
            .build()
            .unwrap()
    }

    fn rabbit(tag: &str, gender: Gender) -> Rabbit {
        Rabbit::builder()
            .rabbit_id(tag)
            .gender(gender)
            .build()
            .unwrap()
    }

    #[test]
    fn should_admit_into_empty_hutch() {
        let candidate = rabbit("RB-010", Gender::Female);
        assert!(check_admission(&hutch(), &[], &candidate).is_ok());
    }

    #[test]
    fn should_admit_opposite_gender_as_pair() {
        let doe = rabbit("RB-010", Gender::Female);
        let buck = rabbit("RB-020", Gender::Male);
        assert!(check_admission(&hutch(), &[doe], &buck).is_ok());
    }

    #[test]
    fn should_reject_same_gender_pair() {
        let doe = rabbit("RB-010", Gender::Female);
        let other = rabbit("RB-011", Gender::Female);
        assert!(matches!(
            check_admission(&hutch(), &[doe], &other),
            Err(FarmError::Conflict(ConflictError::IncompatibleOccupants { .. }))
        ));
    }

    #[test]
    fn should_reject_third_occupant() {
        let doe = rabbit("RB-010", Gender::Female);
        let buck = rabbit("RB-020", Gender::Male);
        let third = rabbit("RB-030", Gender::Male);
        assert!(matches!(
            check_admission(&hutch(), &[doe, buck], &third),
            Err(FarmError::Conflict(ConflictError::HutchFull { .. }))
        ));
    }

    #[test]
    fn should_not_count_candidate_already_inside() {
        let doe = rabbit("RB-010", Gender::Female);
        let buck = rabbit("RB-020", Gender::Male);
        assert!(check_admission(&hutch(), &[doe, buck.clone()], &buck).is_ok());
    }

    #[test]
    fn should_report_occupant_count_when_not_vacant() {
        let doe = rabbit("RB-010", Gender::Female);
        let result = check_vacant(&hutch(), &[doe]);
        assert!(matches!(
            result,
            Err(FarmError::Conflict(ConflictError::OccupiedHutch { occupants: 1, .. }))
        ));
        assert!(check_vacant(&hutch(), &[]).is_ok());
    }
}
