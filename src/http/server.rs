//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, metrics)
//! - Bind server to listener
//! - Stop on the shutdown broadcast, draining in-flight requests

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::admin;
use crate::config::ServiceConfig;
use crate::http::request::with_request_layers;
use crate::http::response::timeout_as_json;
use crate::http::{system, university, visa};
use crate::observability::metrics;
use crate::university::{Catalog, UniversityStore};
use crate::visa::{FsVisaSource, VisaLoader};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub visa: VisaLoader,
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServiceConfig>,
    pub started_at: Instant,
}

impl AppState {
    /// State backed by the data directories named in `config`.
    pub fn from_config(config: ServiceConfig) -> Self {
        let visa = VisaLoader::new(Arc::new(FsVisaSource::new(&config.data.visa_dir)));
        let catalog = Catalog::new(UniversityStore::new(
            &config.data.university_dir,
            config.data.aggregation,
        ));
        Self::new(config, visa, catalog)
    }

    pub fn new(config: ServiceConfig, visa: VisaLoader, catalog: Catalog) -> Self {
        Self {
            visa,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the API.
pub struct ApiServer {
    router: Router,
    state: AppState,
}

impl ApiServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_state(AppState::from_config(config))
    }

    pub fn with_state(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = Arc::clone(&state.config);

        let mut routes = Router::new()
            .route("/", get(system::root))
            .route("/health", get(system::health))
            .route("/api/visa/types", get(visa::get_visa_types))
            .route("/api/visa/{visa_type}/countries", get(visa::get_visa_countries))
            .route("/api/visa/{visa_type}/{country}", get(visa::get_visa_info))
            .route("/api/university/countries", get(university::get_countries))
            .route("/api/university/country/{country_name}", get(university::get_country))
            .route("/api/university/search", get(university::search))
            .route("/api/university/top", get(university::top))
            .route("/api/university/regions", get(university::get_regions));

        if config.admin.enabled {
            routes = routes.merge(admin::router(state.clone()));
        }

        let mut router = routes
            .route_layer(middleware::from_fn(metrics::track_requests))
            .fallback(system::fallback)
            .method_not_allowed_fallback(system::method_not_allowed)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(timeout_as_json));

        if config.cors.enabled {
            router = router.layer(CorsLayer::permissive());
        }

        with_request_layers(router)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin = self.state.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
