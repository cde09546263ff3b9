use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "landeddev CLI: landed cost, sell price and courier quotes", long_about = None)]
pub struct Cli {
    /// JSON config (settings, container, couriers). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Per-run overrides on top of the config file.
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// target margin, percent of sell price
    #[arg(long)]
    pub margin: Option<f64>,
    /// marketplace fee, percent of sell price
    #[arg(long)]
    pub fee: Option<f64>,
    /// fixed cost per order
    #[arg(long = "fixed-cost")]
    pub fixed_cost: Option<f64>,
    /// foreign currency units per local unit
    #[arg(long)]
    pub fx: Option<f64>,
    /// price ending: round, .99, .95 or .49
    #[arg(long)]
    pub ending: Option<String>,
    /// freight cost of one container
    #[arg(long = "container-cost")]
    pub container_cost: Option<f64>,
}

#[derive(Args)]
pub struct ParcelArgs {
    #[arg(long, default_value_t = 0.0)]
    pub length: f64,
    #[arg(long, default_value_t = 0.0)]
    pub width: f64,
    #[arg(long, default_value_t = 0.0)]
    pub height: f64,
    /// carton weight in kg
    #[arg(long, default_value_t = 0.0)]
    pub weight: f64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price a single product
    Quote {
        /// unit cost in foreign currency
        #[arg(long)]
        cost: f64,
        /// units per carton
        #[arg(long, default_value_t = 1)]
        pack: u32,
        #[command(flatten)]
        parcel: ParcelArgs,
        #[arg(long)]
        sku: Option<String>,
        /// how many alternative couriers to list
        #[arg(long, default_value_t = 3)]
        alternatives: usize,
    },

    /// Rank the couriers that can take a parcel
    Couriers {
        #[command(flatten)]
        parcel: ParcelArgs,
    },

    /// Price every row of a comma/tab separated file
    Bulk {
        input: PathBuf,
        /// write the CSV export to this path
        #[arg(long)]
        out: Option<PathBuf>,
        /// write the CSV export under its dated default name in the current directory
        #[arg(long)]
        export: bool,
        /// order, margin-asc, margin-desc or price
        #[arg(long, default_value = "order")]
        sort: String,
        /// print only the sell prices, one per line
        #[arg(long)]
        prices: bool,
        /// fail when any row is unpriced, unshippable or lacks freight data
        #[arg(long)]
        strict: bool,
    },

    /// Print the active courier table
    Rules,

    /// Write the default config as JSON
    InitConfig { out: PathBuf },
}
