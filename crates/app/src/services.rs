//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod breeding_service;
pub mod hutch_service;
pub mod litter_service;
pub mod rabbit_service;
pub mod row_service;
