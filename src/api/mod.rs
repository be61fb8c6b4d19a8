// HTTP surface: thin JSON routes over the indexer
pub mod error;     // ApiError -> { error } responses
pub mod handlers;  // one handler per route
pub mod params;    // account/chain/limit parsing

use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Settings;
use crate::indexer::Indexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl From<&Settings> for Limits {
    fn from(s: &Settings) -> Self {
        Self { default_limit: s.default_limit, max_limit: s.max_limit }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub indexer: Arc<dyn Indexer>,
    pub limits: Limits,
    /// Unix seconds; loans accrue interest up to this instant.
    pub clock: fn() -> u64,
}

impl AppState {
    pub fn new(indexer: Arc<dyn Indexer>, limits: Limits) -> Self {
        Self { indexer, limits, clock: unix_now }
    }

    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn router(state: AppState, cors_allow_origin: &str) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/markets", get(handlers::markets))
        .route("/api/positions", get(handlers::positions))
        .route("/api/loans", get(handlers::loans))
        .route("/api/history", get(handlers::history))
        .layer(cors_layer(cors_allow_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows any origin, otherwise a comma-separated origin list.
pub fn cors_layer(allow_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if allow_origin.trim() == "*" {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allow_origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
