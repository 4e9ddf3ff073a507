use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment, StorageBackend};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::DocumentStore;
use crate::handlers::{categories, root};
use crate::services::CategoryService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        let categories = CategoryService::new(
            store.clone(),
            config.database.collection.clone(),
            Some(config.observer_timeout()),
        );

        Self {
            categories: Arc::new(categories),
            store,
        }
    }

    /// Connect the configured store and wire the services on top of it
    pub async fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        let store = DatabaseManager::connect(&config.database).await?;
        Ok(Self::new(store, config))
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .merge(category_routes())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/sync/create", post(categories::bulk_create))
        .route(
            "/categories/:id",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Bind the configured address and serve until the process stops
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    if config.environment == Environment::Production && config.database.backend == StorageBackend::Memory {
        tracing::warn!("Production environment is using the in-memory store; data will not survive restarts");
    }

    let state = AppState::from_config(config).await?;
    let router = app(state, config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        "Category service listening on http://{} ({:?}, {:?} storage)",
        bind_addr,
        config.environment,
        config.database.backend
    );

    axum::serve(listener, router).await?;
    Ok(())
}
