//! # warren-domain
//!
//! Pure domain model for the warren rabbit-farm manager.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, dates and gestation
//! - Define the **layout**: rows, their levels, and the hutches placed in them
//! - Partition a row's capacity over its levels and name rows and hutches
//! - Define **rabbits** and the occupancy rules of a hutch
//! - Define the **breeding cycle**: breeding records and the doe state machine
//! - Validate **litters** and create **kits**
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod breeding;
pub mod capacity;
pub mod hutch;
pub mod kit;
pub mod level;
pub mod litter;
pub mod occupancy;
pub mod rabbit;
pub mod removal;
pub mod row;
