use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use carpool_server::backend::{BackendClient, BackendConfig};
use carpool_server::cache::{CacheConfig, CachedGeocoder};
use carpool_server::config::{AppConfig, DirectionsSource};
use carpool_server::directions::{
    DirectionsClient, DirectionsConfig, DirectionsProvider, MockDirections,
};
use carpool_server::geocode::{NominatimClient, NominatimConfig};
use carpool_server::planner::PlannerConfig;
use carpool_server::store::{CoordinateStore, StoreConfig};
use carpool_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Create directions provider
    let directions = match &config.directions {
        DirectionsSource::Live { api_key } => {
            DirectionsProvider::Live(DirectionsClient::new(DirectionsConfig::new(api_key))?)
        }
        DirectionsSource::Mock { path } => DirectionsProvider::Mock(MockDirections::from_path(path)?),
    };

    // Create cached geocoder
    let nominatim = NominatimClient::new(
        NominatimConfig::new()
            .with_base_url(&config.nominatim_url)
            .with_user_agent(&config.user_agent),
    )?;
    let geocoder = CachedGeocoder::new(nominatim, &CacheConfig::default());

    // Create backend client
    let backend = BackendClient::new(
        BackendConfig::new(&config.csrf_token, &config.session_cookie)
            .with_base_url(&config.backend_url),
    )?;

    let store = CoordinateStore::new(StoreConfig::new(&config.store_dir));
    let planner = PlannerConfig::default().with_tolerance(config.match_tolerance);

    // Build app state
    let state = AppState::new(directions, geocoder, backend, store, planner);

    let static_dir = config.static_dir.to_string_lossy();
    let app = create_router(state, &static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "Carpool server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
