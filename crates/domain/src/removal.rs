//! Hutch removal history — an append-only ledger of rabbits leaving hutches.

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, ValidationError};
use crate::hutch::{Hutch, HutchId};
use crate::id::{FarmId, RabbitId, RemovalRecordId};
use crate::rabbit::Rabbit;
use crate::time::Timestamp;

/// One entry in a hutch's removal history.
///
/// Only entries with a `removed_at` are reported as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HutchRemovalRecord {
    pub id: RemovalRecordId,
    pub farm_id: FarmId,
    pub hutch_id: HutchId,
    pub rabbit_id: RabbitId,
    pub rabbit_tag: String,
    pub reason: String,
    pub notes: Option<String>,
    pub removed_at: Option<Timestamp>,
    pub recorded_at: Timestamp,
}

impl HutchRemovalRecord {
    /// Record `rabbit` leaving `hutch` at `removed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRemovalReason`] when `reason` is blank.
    pub fn new(
        hutch: &Hutch,
        rabbit: &Rabbit,
        reason: impl Into<String>,
        notes: Option<String>,
        removed_at: Timestamp,
    ) -> Result<Self, FarmError> {
        let reason = reason.into().trim().to_string();
        if reason.is_empty() {
            return Err(ValidationError::EmptyRemovalReason.into());
        }
        Ok(Self {
            id: RemovalRecordId::new(),
            farm_id: hutch.farm_id,
            hutch_id: hutch.id.clone(),
            rabbit_id: rabbit.id,
            rabbit_tag: rabbit.rabbit_id.clone(),
            reason,
            notes: notes.filter(|n| !n.trim().is_empty()),
            removed_at: Some(removed_at),
            recorded_at: crate::time::now(),
        })
    }

    /// Whether this entry records an actual removal.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.removed_at.is_some()
    }
}
