//! Wiring of the `SQLite` repositories into the services, and dispatch of
//! parsed commands to them.

use anyhow::Result;
use serde_json::{Value, json};

use warren_adapter_storage_sqlite_sqlx::pool::Database;
use warren_adapter_storage_sqlite_sqlx::{
    SqliteBreedingRecordRepository, SqliteHutchRepository, SqliteKitRepository,
    SqliteRabbitRepository, SqliteRemovalHistoryRepository, SqliteRowRepository,
};
use warren_app::cache::InMemorySnapshotCache;
use warren_app::services::breeding_service::BreedingService;
use warren_app::services::hutch_service::{HutchService, NewHutch};
use warren_app::services::litter_service::LitterService;
use warren_app::services::rabbit_service::{NewRabbit, RabbitService};
use warren_app::services::row_service::{NewRow, RowService};
use warren_domain::id::FarmId;
use warren_domain::litter::LitterInput;
use warren_domain::time::today;

use crate::cli::{
    BreedingCommand, Command, HutchCommand, LitterCommand, RabbitCommand, RecordLitter,
    RowCommand,
};

/// Every service, backed by one `SQLite` database.
pub struct Services {
    pub rows: RowService<SqliteRowRepository, InMemorySnapshotCache>,
    pub hutches: HutchService<
        SqliteRowRepository,
        SqliteHutchRepository,
        SqliteRabbitRepository,
        SqliteRemovalHistoryRepository,
    >,
    pub rabbits: RabbitService<SqliteRabbitRepository>,
    pub breeding: BreedingService<SqliteRabbitRepository, SqliteBreedingRecordRepository>,
    pub litters:
        LitterService<SqliteRabbitRepository, SqliteBreedingRecordRepository, SqliteKitRepository>,
}

impl Services {
    /// Construct repositories over the database pool and inject them.
    #[must_use]
    pub fn wire(db: &Database) -> Self {
        let pool = db.pool();
        Self {
            rows: RowService::new(
                SqliteRowRepository::new(pool.clone()),
                InMemorySnapshotCache::new(),
            ),
            hutches: HutchService::new(
                SqliteRowRepository::new(pool.clone()),
                SqliteHutchRepository::new(pool.clone()),
                SqliteRabbitRepository::new(pool.clone()),
                SqliteRemovalHistoryRepository::new(pool.clone()),
            ),
            rabbits: RabbitService::new(SqliteRabbitRepository::new(pool.clone())),
            breeding: BreedingService::new(
                SqliteRabbitRepository::new(pool.clone()),
                SqliteBreedingRecordRepository::new(pool.clone()),
            ),
            litters: LitterService::new(
                SqliteRabbitRepository::new(pool.clone()),
                SqliteBreedingRecordRepository::new(pool.clone()),
                SqliteKitRepository::new(pool.clone()),
            ),
        }
    }
}

/// Run one command for `farm_id` and return what it produced as JSON.
///
/// # Errors
///
/// Returns the service error of the command, or a serialization error.
pub async fn dispatch(services: &Services, farm_id: FarmId, command: Command) -> Result<Value> {
    match command {
        Command::Row(command) => row(services, farm_id, command).await,
        Command::Hutch(command) => hutch(services, farm_id, command).await,
        Command::Rabbit(command) => rabbit(services, farm_id, command).await,
        Command::Breeding(command) => breeding(services, farm_id, command).await,
        Command::Litter(command) => litter(services, farm_id, command).await,
    }
}

async fn row(services: &Services, farm_id: FarmId, command: RowCommand) -> Result<Value> {
    let value = match command {
        RowCommand::Create {
            name,
            capacity,
            levels,
            description,
        } => {
            let request = NewRow {
                name,
                capacity,
                level_count: levels,
                description,
            };
            let row = services.rows.create_row(farm_id, request).await?;
            let distribution = row.distribution()?;
            json!({ "row": row, "distribution": distribution })
        }
        RowCommand::Expand { name, amount } => {
            let row = services
                .rows
                .expand_capacity_from_input(farm_id, &name, &amount)
                .await?;
            serde_json::to_value(row)?
        }
        RowCommand::List => serde_json::to_value(services.rows.list_rows(farm_id).await?)?,
        RowCommand::Layout { name } => {
            serde_json::to_value(services.hutches.hutch_layout(farm_id, &name).await?)?
        }
    };
    Ok(value)
}

async fn hutch(services: &Services, farm_id: FarmId, command: HutchCommand) -> Result<Value> {
    let hutches = &services.hutches;
    let value = match command {
        HutchCommand::Add {
            row,
            level,
            position,
            size,
            material,
            features,
        } => {
            let request = NewHutch {
                level,
                position,
                size,
                material,
                features,
            };
            serde_json::to_value(hutches.add_hutch(farm_id, &row, request).await?)?
        }
        HutchCommand::Remove { id } => {
            serde_json::to_value(hutches.remove_hutch(farm_id, &id).await?)?
        }
        HutchCommand::List { row } => {
            serde_json::to_value(hutches.list_hutches(farm_id, &row).await?)?
        }
        HutchCommand::Occupants { id } => {
            serde_json::to_value(hutches.occupants_of(farm_id, &id).await?)?
        }
        HutchCommand::History { id } => {
            serde_json::to_value(hutches.removal_history(farm_id, &id).await?)?
        }
    };
    Ok(value)
}

async fn rabbit(services: &Services, farm_id: FarmId, command: RabbitCommand) -> Result<Value> {
    let value = match command {
        RabbitCommand::Add { tag, gender, name } => {
            let request = NewRabbit { tag, name, gender };
            serde_json::to_value(services.rabbits.register_rabbit(farm_id, request).await?)?
        }
        RabbitCommand::Assign { rabbit, hutch } => serde_json::to_value(
            services
                .hutches
                .assign_rabbit(farm_id, &hutch, &rabbit)
                .await?,
        )?,
        RabbitCommand::Release {
            rabbit,
            hutch,
            reason,
            notes,
        } => serde_json::to_value(
            services
                .hutches
                .release_rabbit(farm_id, &hutch, &rabbit, &reason, notes)
                .await?,
        )?,
        RabbitCommand::Show { rabbit } => {
            serde_json::to_value(services.rabbits.get_rabbit(farm_id, &rabbit).await?)?
        }
    };
    Ok(value)
}

async fn breeding(services: &Services, farm_id: FarmId, command: BreedingCommand) -> Result<Value> {
    let breeding = &services.breeding;
    let value = match command {
        BreedingCommand::Mate {
            doe,
            buck,
            date,
            notes,
        } => {
            let record = breeding
                .mate_doe(farm_id, &doe, buck.as_deref(), date.unwrap_or_else(today), notes)
                .await?;
            serde_json::to_value(record)?
        }
        BreedingCommand::Confirm { doe, since } => {
            serde_json::to_value(breeding.confirm_pregnancy(farm_id, &doe, since).await?)?
        }
        BreedingCommand::Status { doe } => {
            serde_json::to_value(breeding.breeding_state(farm_id, &doe).await?)?
        }
        BreedingCommand::History { doe } => {
            serde_json::to_value(breeding.breeding_history(farm_id, &doe).await?)?
        }
        BreedingCommand::Due { on } => {
            serde_json::to_value(breeding.due_does(farm_id, on.unwrap_or_else(today)).await?)?
        }
    };
    Ok(value)
}

async fn litter(services: &Services, farm_id: FarmId, command: LitterCommand) -> Result<Value> {
    match command {
        LitterCommand::Record(RecordLitter {
            doe,
            buck,
            born,
            kits,
            notes,
        }) => {
            let input = LitterInput {
                actual_birth_date: born,
                kits,
                notes,
            };
            let outcome = services
                .litters
                .record_litter(farm_id, &doe, buck.as_deref(), &input)
                .await?;
            Ok(json!({
                "breeding_record_id": outcome.breeding_record_id,
                "created_kits": outcome.created_kits,
            }))
        }
        LitterCommand::Kits { record } => Ok(serde_json::to_value(
            services.litters.list_kits(farm_id, record).await?,
        )?),
    }
}
