//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use warren_domain::hutch::HutchId;
use warren_domain::id::{BreedingRecordId, FarmId};
use warren_domain::level::Level;
use warren_domain::litter::KitInput;
use warren_domain::rabbit::Gender;
use warren_domain::time::Date;

#[derive(Parser)]
#[command(name = "warren")]
#[command(about = "Rabbit farm rows, hutches, breeding and litters")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Configuration file
    #[arg(short, long, default_value = "warren.toml")]
    pub config: PathBuf,
    /// Act on this farm instead of the configured one
    #[arg(long)]
    pub farm: Option<FarmId>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rows and their capacity
    #[command(subcommand)]
    Row(RowCommand),
    /// Hutches and who lives in them
    #[command(subcommand)]
    Hutch(HutchCommand),
    /// Rabbit registration and housing
    #[command(subcommand)]
    Rabbit(RabbitCommand),
    /// Mating and pregnancy
    #[command(subcommand)]
    Breeding(BreedingCommand),
    /// Births and kits
    #[command(subcommand)]
    Litter(LitterCommand),
}

#[derive(Subcommand)]
pub enum RowCommand {
    /// Create a row; a name is picked from the pool when omitted
    Create {
        #[arg(short, long)]
        name: Option<String>,
        /// Total number of hutches the row may hold
        #[arg(short, long)]
        capacity: u32,
        /// Number of vertical levels (1-26)
        #[arg(short, long, default_value_t = 1)]
        levels: usize,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Grow a row's capacity by 1 to 20 hutches
    Expand {
        name: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List the farm's rows
    List,
    /// Planned and placed hutches per level
    Layout { name: String },
}

#[derive(Subcommand)]
pub enum HutchCommand {
    /// Place a hutch in a row
    Add {
        row: String,
        /// Level letter; defaults to the row's first level
        #[arg(short, long)]
        level: Option<Level>,
        #[arg(short, long, default_value_t = 1)]
        position: u32,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        material: Option<String>,
        /// Feature (repeatable)
        #[arg(long = "feature")]
        features: Vec<String>,
    },
    /// Soft-delete an empty hutch
    Remove { id: HutchId },
    /// Active hutches of a row
    List { row: String },
    /// Rabbits currently housed in a hutch
    Occupants { id: HutchId },
    /// Rabbits that left a hutch, oldest first
    History { id: HutchId },
}

#[derive(Subcommand)]
pub enum RabbitCommand {
    /// Register a rabbit
    Add {
        tag: String,
        #[arg(short, long)]
        gender: Gender,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Move a rabbit into a hutch
    Assign { rabbit: String, hutch: HutchId },
    /// Take a rabbit out of its hutch
    Release {
        rabbit: String,
        hutch: HutchId,
        #[arg(short, long)]
        reason: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a rabbit by tag or id
    Show { rabbit: String },
}

#[derive(Subcommand)]
pub enum BreedingCommand {
    /// Record a mating
    Mate {
        doe: String,
        #[arg(short, long)]
        buck: Option<String>,
        /// Mating date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<Date>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Confirm a mated doe is pregnant
    Confirm {
        doe: String,
        /// Pregnancy start (YYYY-MM-DD), the mating date when omitted
        #[arg(long)]
        since: Option<Date>,
    },
    /// Where a doe stands in her cycle
    Status { doe: String },
    /// Breeding records of a doe
    History { doe: String },
    /// Pregnant does due within a week
    Due {
        /// Reference date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        on: Option<Date>,
    },
}

#[derive(Subcommand)]
pub enum LitterCommand {
    /// Record a delivery and its kits
    Record(RecordLitter),
    /// Kits of one breeding record
    Kits { record: BreedingRecordId },
}

#[derive(Args)]
pub struct RecordLitter {
    pub doe: String,
    #[arg(short, long)]
    pub buck: Option<String>,
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub born: String,
    /// Kit as NUMBER:STATUS[:WEIGHT[:GENDER[:COLOR]]] (repeatable)
    #[arg(short, long = "kit", value_parser = parse_kit, required = true)]
    pub kits: Vec<KitInput>,
    #[arg(long)]
    pub notes: Option<String>,
}

/// Parse `NUMBER:STATUS[:WEIGHT[:GENDER[:COLOR]]]`; empty fields are skipped.
///
/// Only the shape is checked here, the litter validation owns the rules.
fn parse_kit(raw: &str) -> Result<KitInput, String> {
    let mut fields = raw.splitn(5, ':').map(str::trim);
    let number = fields.next().unwrap_or_default();
    let Some(status) = fields.next() else {
        return Err(format!("expected NUMBER:STATUS, got {raw:?}"));
    };

    let mut kit = KitInput::new(number, status);
    if let Some(weight) = fields.next().filter(|w| !w.is_empty()) {
        kit = kit.with_weight(weight);
    }
    if let Some(gender) = fields.next().filter(|g| !g.is_empty()) {
        kit = kit.with_gender(gender.parse::<Gender>().map_err(|err| err.to_string())?);
    }
    if let Some(color) = fields.next().filter(|c| !c.is_empty()) {
        kit = kit.with_color(color);
    }
    Ok(kit)
}
