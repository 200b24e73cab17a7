//! Read-only HTTP front end over the generated artifacts.

use crate::engine::generate;
use crate::error::BeaconError;
use crate::handlers;
use crate::options::BeaconConfig;
use crate::output::Artifacts;
use crate::vcs::VersionControl;
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Shared, immutable handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BeaconConfig>,
    pub vcs: Arc<dyn VersionControl>,
}

impl AppState {
    pub fn new(config: BeaconConfig, vcs: Arc<dyn VersionControl>) -> Self {
        Self {
            config: Arc::new(config),
            vcs,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/", get(handlers::healthz))
        .route("/healthz", get(handlers::healthz))
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/snapshot.json", get(handlers::get_snapshot_json))
        .route("/digest", get(handlers::get_digest))
        .route("/digest.json", get(handlers::get_digest_json))
        .route("/guide", get(handlers::get_guide))
        .route("/ai", get(handlers::get_guide))
        .route("/version", get(handlers::get_version))
        .route("/runtime", get(handlers::get_runtime))
        .route(
            "/changes-since-checkpoint",
            get(handlers::get_changes_since_checkpoint),
        )
        .layer(cors)
        .with_state(state)
}

/// Applies the auto-provision policy.
///
/// When the snapshot artifact is missing and `auto_generate_on_missing` is
/// set, runs the generator and returns the written artifacts. Otherwise only
/// logs a hint.
pub fn provision(state: &AppState) -> Result<Option<Artifacts>, BeaconError> {
    let snapshot = state.config.snapshot_path();
    if snapshot.exists() {
        return Ok(None);
    }
    if !state.config.auto_generate_on_missing {
        tracing::info!(
            "{} not found; run `beacon generate` or restart with --auto-generate",
            snapshot.display()
        );
        return Ok(None);
    }
    tracing::info!("{} not found; generating", snapshot.display());
    generate(&state.config, state.vcs.as_ref()).map(Some)
}

/// Provisions artifacts if configured, then serves until the listener fails.
pub async fn serve(state: AppState) -> Result<(), BeaconError> {
    let provisioning = state.clone();
    tokio::task::spawn_blocking(move || provision(&provisioning))
        .await
        .map_err(|e| BeaconError::Server(std::io::Error::other(e)))??;
    let addr = state.config.bind_addr.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| BeaconError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(
        "serving {} on http://{}",
        state.config.root.display(),
        addr
    );
    axum::serve(listener, router(state))
        .await
        .map_err(BeaconError::Server)
}
