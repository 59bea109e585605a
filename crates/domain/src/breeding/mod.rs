//! Breeding — the mating-to-birth cycle of a doe.
//!
//! A [`BreedingRecord`] documents one cycle. A doe's position in the cycle is
//! the [`BreedingState`], derived from her stored pregnancy and her open
//! record, and advanced only through [`BreedingState::apply`].

mod record;
mod state;

pub use record::BreedingRecord;
pub use state::{BreedingEvent, BreedingState, InvalidTransition};
