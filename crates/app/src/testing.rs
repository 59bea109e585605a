//! In-memory port implementations shared by the service tests.
//!
//! One cloneable store implements every repository trait over a single
//! mutex-guarded state, enforcing the same conflicts as the real store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use warren_domain::breeding::BreedingRecord;
use warren_domain::error::{ConflictError, FarmError, NotFoundError};
use warren_domain::hutch::{Hutch, HutchId};
use warren_domain::id::{BreedingRecordId, FarmId, RabbitId};
use warren_domain::kit::Kit;
use warren_domain::rabbit::Rabbit;
use warren_domain::removal::HutchRemovalRecord;
use warren_domain::row::Row;

use crate::ports::{
    BreedingRecordRepository, Delivery, HutchRepository, KitRepository, RabbitRepository,
    RemovalHistoryRepository, RowRepository,
};

#[derive(Default)]
struct State {
    rows: Vec<Row>,
    hutches: Vec<Hutch>,
    rabbits: HashMap<RabbitId, Rabbit>,
    records: Vec<BreedingRecord>,
    kits: Vec<Kit>,
    removals: Vec<HutchRemovalRecord>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn kit_count(&self) -> usize {
        self.state.lock().unwrap().kits.len()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }
}

impl RowRepository for InMemoryStore {
    async fn create(&self, row: Row) -> Result<Row, FarmError> {
        let mut state = self.state.lock().unwrap();
        if state
            .rows
            .iter()
            .any(|r| r.farm_id == row.farm_id && r.name == row.name)
        {
            return Err(ConflictError::DuplicateName { name: row.name }.into());
        }
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn get_by_name(&self, farm_id: FarmId, name: &str) -> Result<Option<Row>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .iter()
            .find(|r| r.farm_id == farm_id && r.name == name)
            .cloned())
    }

    async fn list(&self, farm_id: FarmId) -> Result<Vec<Row>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .iter()
            .filter(|r| r.farm_id == farm_id)
            .cloned()
            .collect())
    }

    async fn increase_capacity(
        &self,
        farm_id: FarmId,
        name: &str,
        additional: u32,
    ) -> Result<Row, FarmError> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.farm_id == farm_id && r.name == name)
            .ok_or_else(|| NotFoundError {
                entity: "Row",
                id: name.to_string(),
            })?;
        row.capacity = row.capacity.checked_add(additional).ok_or_else(|| {
            ConflictError::InvalidExpansion {
                requested: additional.to_string(),
            }
        })?;
        Ok(row.clone())
    }
}

impl HutchRepository for InMemoryStore {
    async fn create(&self, hutch: Hutch, capacity: u32) -> Result<Hutch, FarmError> {
        let mut state = self.state.lock().unwrap();
        if state
            .hutches
            .iter()
            .any(|h| h.farm_id == hutch.farm_id && h.id == hutch.id)
        {
            return Err(ConflictError::DuplicateHutch {
                id: hutch.id.to_string(),
            }
            .into());
        }
        let active = state
            .hutches
            .iter()
            .filter(|h| h.farm_id == hutch.farm_id && h.row_name == hutch.row_name && !h.is_deleted)
            .count();
        if active >= capacity as usize {
            return Err(ConflictError::CapacityExceeded {
                row: hutch.row_name,
                capacity,
            }
            .into());
        }
        state.hutches.push(hutch.clone());
        Ok(hutch)
    }

    async fn get_by_id(&self, farm_id: FarmId, id: &HutchId) -> Result<Option<Hutch>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .hutches
            .iter()
            .find(|h| h.farm_id == farm_id && &h.id == id)
            .cloned())
    }

    async fn list_by_row(&self, farm_id: FarmId, row_name: &str) -> Result<Vec<Hutch>, FarmError> {
        let state = self.state.lock().unwrap();
        let mut hutches: Vec<Hutch> = state
            .hutches
            .iter()
            .filter(|h| h.farm_id == farm_id && h.row_name == row_name && !h.is_deleted)
            .cloned()
            .collect();
        hutches.sort_by_key(|h| (h.level, h.position));
        Ok(hutches)
    }

    async fn count_active(&self, farm_id: FarmId, row_name: &str) -> Result<u32, FarmError> {
        let hutches = HutchRepository::list_by_row(self, farm_id, row_name).await?;
        Ok(u32::try_from(hutches.len()).unwrap())
    }

    async fn soft_delete(&self, farm_id: FarmId, id: &HutchId) -> Result<(), FarmError> {
        let mut state = self.state.lock().unwrap();
        let hutch = state
            .hutches
            .iter_mut()
            .find(|h| h.farm_id == farm_id && &h.id == id)
            .ok_or_else(|| NotFoundError {
                entity: "Hutch",
                id: id.to_string(),
            })?;
        hutch.is_deleted = true;
        Ok(())
    }
}

impl RabbitRepository for InMemoryStore {
    async fn create(&self, rabbit: Rabbit) -> Result<Rabbit, FarmError> {
        let mut state = self.state.lock().unwrap();
        if state
            .rabbits
            .values()
            .any(|r| r.farm_id == rabbit.farm_id && r.rabbit_id == rabbit.rabbit_id)
        {
            return Err(ConflictError::DuplicateRabbit {
                rabbit_id: rabbit.rabbit_id,
            }
            .into());
        }
        state.rabbits.insert(rabbit.id, rabbit.clone());
        Ok(rabbit)
    }

    async fn get_by_id(&self, farm_id: FarmId, id: RabbitId) -> Result<Option<Rabbit>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state.rabbits.get(&id).filter(|r| r.farm_id == farm_id).cloned())
    }

    async fn find_by_tag(&self, farm_id: FarmId, tag: &str) -> Result<Option<Rabbit>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rabbits
            .values()
            .find(|r| r.farm_id == farm_id && r.rabbit_id == tag)
            .cloned())
    }

    async fn list_by_hutch(
        &self,
        farm_id: FarmId,
        hutch_id: &HutchId,
    ) -> Result<Vec<Rabbit>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rabbits
            .values()
            .filter(|r| r.farm_id == farm_id && r.hutch_name.as_ref() == Some(hutch_id))
            .cloned()
            .collect())
    }

    async fn list_pregnant(&self, farm_id: FarmId) -> Result<Vec<Rabbit>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rabbits
            .values()
            .filter(|r| r.farm_id == farm_id && r.is_pregnant())
            .cloned()
            .collect())
    }

    async fn update(&self, rabbit: Rabbit) -> Result<Rabbit, FarmError> {
        let mut state = self.state.lock().unwrap();
        state.rabbits.insert(rabbit.id, rabbit.clone());
        Ok(rabbit)
    }
}

impl BreedingRecordRepository for InMemoryStore {
    async fn open(&self, record: BreedingRecord) -> Result<BreedingRecord, FarmError> {
        let mut state = self.state.lock().unwrap();
        if state
            .records
            .iter()
            .any(|r| r.doe_id == record.doe_id && r.is_open())
        {
            return Err(ConflictError::OpenBreedingRecord {
                doe_id: record.doe_id.to_string(),
            }
            .into());
        }
        state.records.push(record.clone());
        Ok(record)
    }

    async fn get_by_id(
        &self,
        farm_id: FarmId,
        id: BreedingRecordId,
    ) -> Result<Option<BreedingRecord>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .iter()
            .find(|r| r.farm_id == farm_id && r.id == id)
            .cloned())
    }

    async fn find_open_for_doe(
        &self,
        farm_id: FarmId,
        doe_id: RabbitId,
    ) -> Result<Option<BreedingRecord>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .iter()
            .find(|r| r.farm_id == farm_id && r.doe_id == doe_id && r.is_open())
            .cloned())
    }

    async fn list_for_doe(
        &self,
        farm_id: FarmId,
        doe_id: RabbitId,
    ) -> Result<Vec<BreedingRecord>, FarmError> {
        let state = self.state.lock().unwrap();
        let mut records: Vec<BreedingRecord> = state
            .records
            .iter()
            .filter(|r| r.farm_id == farm_id && r.doe_id == doe_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.mating_date);
        Ok(records)
    }

    async fn record_delivery(&self, delivery: Delivery) -> Result<Delivery, FarmError> {
        let mut state = self.state.lock().unwrap();
        if delivery.record_is_new {
            if state
                .records
                .iter()
                .any(|r| r.doe_id == delivery.record.doe_id && r.is_open())
            {
                return Err(ConflictError::OpenBreedingRecord {
                    doe_id: delivery.doe.rabbit_id.clone(),
                }
                .into());
            }
            state.records.push(delivery.record.clone());
        } else {
            let stored = state
                .records
                .iter_mut()
                .find(|r| r.id == delivery.record.id && r.is_open())
                .ok_or_else(|| ConflictError::InvalidTransition {
                    doe_id: delivery.doe.rabbit_id.clone(),
                    from: "delivered",
                    to: "delivered",
                })?;
            *stored = delivery.record.clone();
        }
        state.rabbits.insert(delivery.doe.id, delivery.doe.clone());
        state.kits.extend(delivery.kits.iter().cloned());
        Ok(delivery)
    }
}

impl KitRepository for InMemoryStore {
    async fn list_for_record(
        &self,
        farm_id: FarmId,
        breeding_record_id: BreedingRecordId,
    ) -> Result<Vec<Kit>, FarmError> {
        let state = self.state.lock().unwrap();
        let mut kits: Vec<Kit> = state
            .kits
            .iter()
            .filter(|k| k.farm_id == farm_id && k.breeding_record_id == breeding_record_id)
            .cloned()
            .collect();
        kits.sort_by(|a, b| a.kit_number.cmp(&b.kit_number));
        Ok(kits)
    }
}

impl RemovalHistoryRepository for InMemoryStore {
    async fn append(&self, entry: HutchRemovalRecord) -> Result<HutchRemovalRecord, FarmError> {
        let mut state = self.state.lock().unwrap();
        state.removals.push(entry.clone());
        Ok(entry)
    }

    async fn list_for_hutch(
        &self,
        farm_id: FarmId,
        hutch_id: &HutchId,
    ) -> Result<Vec<HutchRemovalRecord>, FarmError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .removals
            .iter()
            .filter(|e| e.farm_id == farm_id && &e.hutch_id == hutch_id && e.is_removal())
            .cloned()
            .collect())
    }
}
