pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use landed_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let calc = handlers::load_calculator(cli.config.as_deref(), &cli.overrides)?;
    match cli.command {
        Commands::Quote {
            cost,
            pack,
            parcel,
            sku,
            alternatives,
        } => handlers::handle_quote(&calc, cost, pack, &parcel, sku, alternatives),
        Commands::Couriers { parcel } => handlers::handle_couriers(&calc, &parcel),
        Commands::Bulk {
            input,
            out,
            export,
            sort,
            prices,
            strict,
        } => handlers::handle_bulk(&calc, input, out, export, &sort, prices, strict),
        Commands::Rules => handlers::handle_rules(&calc),
        Commands::InitConfig { out } => handlers::handle_init_config(out),
    }
}
