//! Arbor Server — pluggable publishing API
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use arbor_core::config::AppConfig;
use arbor_core::error::AppError;

use arbor_api::state::ApiState;
use arbor_graph::context::create_context_factory;
use arbor_graph::schema::create_schema;
use arbor_graph::store::ContentStore;
use arbor_plugin::manager::PluginManager;
use plugin_readtime::ReadtimePlugin;

#[tokio::main]
async fn main() {
    let env = std::env::var("ARBOR_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Arbor v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(config);

    // ── Step 1: Install plugins, then seal the registration phase ──
    let manager = Arc::new(PluginManager::new(config.clone()));
    manager.install(Arc::new(ReadtimePlugin::new())).await?;
    manager.seal();

    // ── Step 2: Build the schema through the schema extension points ──
    let schema = Arc::new(create_schema(manager.filters(), manager.context()).await?);
    tracing::info!(schema = ?schema, "Schema built and decorated");

    // ── Step 3: Compose the per-request context factory ──
    let store = Arc::new(ContentStore::seeded());
    let contexts = create_context_factory(manager.filters(), manager.context(), store).await?;

    // ── Step 4: Assemble routes through the route extension points ──
    let state = ApiState {
        config: config.clone(),
        schema,
        contexts,
        plugins: manager,
    };
    let app = arbor_api::build_router(state).await?;

    // ── Step 5: Serve ──
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, devel = config.server.devel, "Listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("server error: {e}")))?;

    Ok(())
}
