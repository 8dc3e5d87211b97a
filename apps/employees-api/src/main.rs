use axum_helpers::server::{create_production_app, health_router};
use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod seed;
mod state;

use config::Config;
use state::AppState;

#[derive(Parser)]
#[command(name = "employees-api")]
#[command(about = "HTTP API over the employees MongoDB collection")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Replace all employees with the sample data set
    Seed,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // Must complete before any request can violate the unique index
    api::employees::init_indexes(&db).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Seed => seed::run(&db).await,
        Commands::Serve => {
            serve(AppState {
                config,
                mongo_client,
                db,
            })
            .await
        }
    }
}

async fn serve(state: AppState) -> eyre::Result<()> {
    let api_routes = api::routes(&state);

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(state.config.app));

    info!("Starting Employees API with graceful shutdown (30s timeout)");

    let AppState {
        config,
        mongo_client,
        ..
    } = state;

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Employees API shutdown complete");
    Ok(())
}
