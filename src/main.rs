use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use log::info;
use std::sync::Arc;

use trade_journal::cli::Cli;
use trade_journal::config::Config;
use trade_journal::db::Database;
use trade_journal::logging;
use trade_journal::security::AuthManager;
use trade_journal::store::MongoStore;
use trade_journal::web::WebServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.debug);

    info!("Starting trade journal server...");

    // Load configuration
    let config_path = cli.config.unwrap_or_else(|| "config/config.toml".into());
    let config = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {:?}: {}", config_path, e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    info!("Configuration loaded successfully.");

    // Connect the document store
    let store = MongoStore::connect(&config.database).await?;
    let db = Arc::new(Database::new(Arc::new(store)));
    info!("Record store initialized.");

    let auth = Arc::new(AuthManager::new(
        db.accounts.clone(),
        Duration::hours(config.session.ttl_hours),
    ));

    let server = WebServer::new(db, auth);
    server
        .start(&config.server.host, config.server.port)
        .await?;

    Ok(())
}
