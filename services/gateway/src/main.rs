mod error;
mod handlers;
mod models;
mod rate_limit;
mod router;
mod state;
mod store;

use provider_stats::AggregatorConfig;
use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting claims gateway service");

    let config = aggregator_config_from_env()?;
    tracing::info!(
        epsilon = config.epsilon,
        delta = config.delta,
        max_candidates = config.max_candidates,
        "provider rankings configured"
    );

    // Initialize application state; the sketch and tracker live for the
    // process lifetime
    let state = AppState::new(config).map_err(|e| anyhow::anyhow!(e))?;

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = std::env::var("CLAIMS_BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Sketch accuracy and candidate capacity from the environment, with the
/// documented (ε = 0.001, δ = 0.01, K = 10) defaults.
fn aggregator_config_from_env() -> Result<AggregatorConfig, anyhow::Error> {
    let defaults = AggregatorConfig::default();
    Ok(AggregatorConfig {
        epsilon: env_parse("SKETCH_EPSILON", defaults.epsilon)?,
        delta: env_parse("SKETCH_DELTA", defaults.delta)?,
        max_candidates: env_parse("TOP_PROVIDERS_K", defaults.max_candidates)?,
    })
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value for {key}: '{raw}'")),
        Err(_) => Ok(default),
    }
}
