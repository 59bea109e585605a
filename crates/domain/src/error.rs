//! Common error types used across the workspace.
//!
//! Every layer returns [`FarmError`]. Input problems are reported as
//! [`ValidationError`] before anything is written, business-rule violations
//! against current state as [`ConflictError`], and failures of the backing
//! store are carried verbatim in [`FarmError::Storage`].

/// Top-level error returned by domain logic, services and adapters.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Malformed or missing input, caught before any mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("rabbit tag must not be empty")]
    EmptyTag,

    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    #[error("level count must be between 1 and 26, got {count}")]
    InvalidLevelCount { count: usize },

    #[error("{value:?} is not a valid level")]
    InvalidLevel { value: char },

    #[error("level {level} does not exist in row {row}")]
    UnknownLevel { row: String, level: char },

    #[error("hutch position must be at least 1")]
    ZeroPosition,

    #[error("{value:?} is not a valid {kind} id")]
    MalformedId { kind: &'static str, value: String },

    #[error("hutch id {value:?} is not of the form ROW-LEVELPOSITION")]
    MalformedHutchId { value: String },

    #[error("{value:?} is not a valid gender")]
    InvalidGender { value: String },

    #[error("rabbit {rabbit_id} is not a doe")]
    NotADoe { rabbit_id: String },

    #[error("rabbit {rabbit_id} is not a buck")]
    NotABuck { rabbit_id: String },

    #[error("bucks cannot carry a pregnancy")]
    PregnantBuck,

    #[error("expected birth date {expected} does not match a gestation starting {start}")]
    InconsistentPregnancy {
        start: chrono::NaiveDate,
        expected: chrono::NaiveDate,
    },

    #[error("birth date {value:?} is not a valid YYYY-MM-DD date")]
    InvalidBirthDate { value: String },

    #[error("a litter must contain at least one kit")]
    EmptyLitter,

    #[error("kit #{index}: {field} is required")]
    MissingKitField { index: usize, field: &'static str },

    #[error("{value:?} is not a kit status, expected alive or dead")]
    UnknownKitStatus { value: String },

    #[error("kit {kit_number}: status {value:?} must be alive or dead")]
    InvalidKitStatus { kit_number: String, value: String },

    #[error("kit {kit_number}: birth weight {value:?} must be a number greater than zero")]
    InvalidBirthWeight { kit_number: String, value: String },

    #[error("kit number {kit_number} appears more than once in the litter")]
    DuplicateKitNumber { kit_number: String },

    #[error("removal reason must not be empty")]
    EmptyRemovalReason,

    #[error("rabbit {rabbit_id} is not in hutch {hutch_id}")]
    NotInHutch { rabbit_id: String, hutch_id: String },
}

/// A business rule rejected the operation against current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("a row named {name:?} already exists")]
    DuplicateName { name: String },

    #[error("hutch {id} already exists")]
    DuplicateHutch { id: String },

    #[error("row {row} is at its capacity of {capacity} hutches; expand the row first")]
    CapacityExceeded { row: String, capacity: u32 },

    #[error("hutch {id} still holds {occupants} rabbit(s); remove them first")]
    OccupiedHutch { id: String, occupants: usize },

    #[error("capacity can only grow by 1 to 20 hutches at a time, within the capacity limit, got {requested:?}")]
    InvalidExpansion { requested: String },

    #[error("a rabbit tagged {rabbit_id:?} already exists")]
    DuplicateRabbit { rabbit_id: String },

    #[error("hutch {id} already holds two rabbits")]
    HutchFull { id: String },

    #[error("hutch {id} can only pair a doe with a buck")]
    IncompatibleOccupants { id: String },

    #[error("doe {doe_id} already has an open breeding record")]
    OpenBreedingRecord { doe_id: String },

    #[error("doe {doe_id} was mated with {recorded}, not {given}")]
    BuckMismatch {
        doe_id: String,
        recorded: String,
        given: String,
    },

    #[error("doe {doe_id} cannot move from {from} to {to}")]
    InvalidTransition {
        doe_id: String,
        from: &'static str,
        to: &'static str,
    },
}

/// A referenced entity does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
