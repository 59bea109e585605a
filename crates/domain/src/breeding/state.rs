use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, FarmError};
use crate::rabbit::{Pregnancy, Rabbit};
use crate::time::{DUE_WINDOW_DAYS, Date};

use super::BreedingRecord;

/// Where a doe stands in her breeding cycle.
///
/// Persisted only as the doe's pregnancy flag and dates plus her open
/// [`BreedingRecord`]; `Delivered` is transient and resolves to `Available`
/// through [`BreedingEvent::Release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BreedingState {
    Available,
    Mated { since: Date },
    Pregnant { since: Date, due: Date },
    Delivered { at: Date },
}

/// Something that happened to a doe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreedingEvent {
    Mate { on: Date },
    ConfirmPregnancy { since: Date },
    Deliver { on: Date },
    Release,
}

/// An event that does not apply in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl InvalidTransition {
    /// Turn the rejected transition into an error about `doe`.
    ///
    /// Mating a doe that is already mid-cycle means she still has an open
    /// record and is reported as such.
    #[must_use]
    pub fn for_doe(self, doe: &Rabbit) -> FarmError {
        let doe_id = doe.rabbit_id.clone();
        let conflict = if self.to == "mated" {
            ConflictError::OpenBreedingRecord { doe_id }
        } else {
            ConflictError::InvalidTransition {
                doe_id,
                from: self.from,
                to: self.to,
            }
        };
        conflict.into()
    }
}

impl BreedingState {
    /// Derive the state of `doe` from her stored pregnancy and open record.
    #[must_use]
    pub fn of(doe: &Rabbit, open_record: Option<&BreedingRecord>) -> Self {
        if let Some(pregnancy) = doe.pregnancy {
            return Self::Pregnant {
                since: pregnancy.start_date(),
                due: pregnancy.expected_birth_date(),
            };
        }
        match open_record.filter(|r| r.is_open() && r.doe_id == doe.id) {
            Some(record) => Self::Mated {
                since: record.mating_date,
            },
            None => Self::Available,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Mated { .. } => "mated",
            Self::Pregnant { .. } => "pregnant",
            Self::Delivered { .. } => "delivered",
        }
    }

    /// Advance the state machine.
    ///
    /// ```text
    /// Available --Mate--> Mated --ConfirmPregnancy--> Pregnant
    /// Available | Mated | Pregnant --Deliver--> Delivered --Release--> Available
    /// ```
    ///
    /// Delivering from `Available` covers births recorded without a prior mating.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any other combination.
    pub fn apply(self, event: BreedingEvent) -> Result<Self, InvalidTransition> {
        match (self, event) {
            (Self::Available, BreedingEvent::Mate { on }) => Ok(Self::Mated { since: on }),
            (Self::Mated { .. }, BreedingEvent::ConfirmPregnancy { since }) => {
                let pregnancy = Pregnancy::starting(since);
                Ok(Self::Pregnant {
                    since,
                    due: pregnancy.expected_birth_date(),
                })
            }
            (
                Self::Available | Self::Mated { .. } | Self::Pregnant { .. },
                BreedingEvent::Deliver { on },
            ) => Ok(Self::Delivered { at: on }),
            (Self::Delivered { .. }, BreedingEvent::Release) => Ok(Self::Available),
            (from, event) => Err(InvalidTransition {
                from: from.name(),
                to: event.target(),
            }),
        }
    }

    /// The pregnancy a doe in this state carries, if any.
    #[must_use]
    pub fn pregnancy(&self) -> Option<Pregnancy> {
        match self {
            Self::Pregnant { since, .. } => Some(Pregnancy::starting(*since)),
            _ => None,
        }
    }

    /// Whether the doe is within the due window on `today`.
    ///
    /// Derived only, used for alerting.
    #[must_use]
    pub fn is_due(&self, today: Date) -> bool {
        match self {
            Self::Pregnant { due, .. } => {
                let window_start = due
                    .checked_sub_days(chrono::Days::new(DUE_WINDOW_DAYS))
                    .unwrap_or(*due);
                today >= window_start
            }
            _ => false,
        }
    }
}

impl BreedingEvent {
    fn target(self) -> &'static str {
        match self {
            Self::Mate { .. } => "mated",
            Self::ConfirmPregnancy { .. } => "pregnant",
            Self::Deliver { .. } => "delivered",
            Self::Release => "available",
        }
    }
}
