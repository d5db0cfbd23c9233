//! Patient consent registry server.
//!
//! Wires the in-memory data store, the local signing oracle, and the REST
//! API together and serves them.

use std::sync::Arc;

use api_rest::AppState;
use pcr_core::{CoreConfig, LocalKeySigner, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the PCR server.
///
/// # Environment Variables
/// - `PCR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PCR_SEED_PATH`: optional JSON seed dataset loaded at startup
/// - `PCR_ORACLE_ADDRESS`: wallet address the local signing oracle binds to
///   (a fresh address is generated when unset)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or seed dataset is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pcr_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PCR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = CoreConfig::from_env_values(
        std::env::var("PCR_SEED_PATH").ok(),
        std::env::var("PCR_ORACLE_ADDRESS").ok(),
    )?;

    let store = match cfg.seed_path() {
        Some(path) => {
            tracing::info!("-- Loading seed data from {}", path.display());
            MemoryStore::from_seed_file(path)?
        }
        None => MemoryStore::new(),
    };

    let signer = match cfg.oracle_address() {
        Some(address) => LocalKeySigner::new(address.clone()),
        None => LocalKeySigner::generate(),
    };
    tracing::info!("++ Oracle signing address: {}", signer.address());

    let state = AppState::new(Arc::new(store), Arc::new(signer));

    tracing::info!("++ Starting PCR REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(state)).await?;

    Ok(())
}
