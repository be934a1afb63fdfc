use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{error, info};

mod console;
mod error;
mod models;
mod persistence;
mod services;
mod table;

use common::config::AppConfig;
use common::database::{self, DatabaseConfig};

use crate::{console::ConsoleUi, persistence::MySqlGateway, services::AppServices};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = AppConfig::resolve_path(std::env::args().nth(1));
    let config = AppConfig::load(&config_path)?;

    // Initialize logging; the guard flushes the log file on drop
    let _log_guard = common::logging::init_logging(&config.meta)?;

    info!(config = %config_path, "Starting volunteer event coordination");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from(&config.database);
    let pool = database::init_pool(&db_config)
        .await
        .context("failed to create the MySQL connection pool")?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        database::close_pool(&pool).await;
        anyhow::bail!("Failed to connect to database");
    }

    let services = AppServices::new(MySqlGateway::new(pool.clone()));
    let mut console = ConsoleUi::new(
        services,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    let outcome = console.run().await;
    if let Err(e) = &outcome {
        error!("Console terminated: {}", e);
    }

    database::close_pool(&pool).await;
    info!("Volunteer event coordination stopped");

    outcome.context("console I/O failed")
}
