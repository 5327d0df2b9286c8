//! Application state for the web layer.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::cache::CachedGeocoder;
use crate::directions::DirectionsProvider;
use crate::geocode::NominatimClient;
use crate::planner::PlannerConfig;
use crate::store::CoordinateStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Route optimizer (live or recorded)
    pub directions: Arc<DirectionsProvider>,

    /// Cached Nominatim client
    pub geocoder: Arc<CachedGeocoder<NominatimClient>>,

    /// Carpool backend client
    pub backend: Arc<BackendClient>,

    /// Per-session trip state
    pub store: Arc<CoordinateStore>,

    /// Ride planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        directions: DirectionsProvider,
        geocoder: CachedGeocoder<NominatimClient>,
        backend: BackendClient,
        store: CoordinateStore,
        config: PlannerConfig,
    ) -> Self {
        Self {
            directions: Arc::new(directions),
            geocoder: Arc::new(geocoder),
            backend: Arc::new(backend),
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}
