pub mod migrate;
pub mod stats;

use crate::Config;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: migrate::MigrateAction,
    },
    /// Print summary statistics over all stored blogs
    Stats,
}

pub async fn handle_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Migrate { action } => migrate::handle_migrate_command(action, config).await,
        Commands::Stats => stats::handle_stats_command(config).await,
    }
}
