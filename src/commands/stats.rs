use crate::Config;
use crate::aggregator;
use crate::database::{DatabaseManager, DatabaseManagerImpl};
use tracing::info;

pub async fn handle_stats_command(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db_manager = DatabaseManagerImpl::new_from_config(config).await?;
    let records = db_manager.blogs().all_records().await?;
    info!(blogs = records.len(), "Summarizing stored blogs");

    let summary = aggregator::summarize(&records);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
