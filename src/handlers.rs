//! HTTP handlers.
//!
//! Every handler re-reads its artifact from disk; nothing is cached between
//! requests. Git facts are fetched on the blocking pool and degrade to
//! `null` when unavailable.

use crate::codec;
use crate::error::BeaconError;
use crate::runtime::{RuntimeInfo, now_utc};
use crate::server::AppState;
use crate::vcs::{ChangeEntry, VersionControl};
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

pub const FALLBACK_GUIDE: &str = "# Integration Guide\n\
- Treat the snapshot and digest as ground truth.\n\
- If you need a file, ask for its exact repo path.\n\
- Provide full-file replacements only.\n";

const YAML: &str = "text/yaml; charset=utf-8";
const MARKDOWN: &str = "text/markdown; charset=utf-8";

/// Error body returned to clients: `{error, reason}`.
#[derive(Debug)]
pub struct ApiError(pub BeaconError);

impl From<BeaconError> for ApiError {
    fn from(err: BeaconError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            BeaconError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        let body = json!({
            "error": self.0.to_string(),
            "reason": self.0.reason(),
        });
        (status, Json(body)).into_response()
    }
}

fn text(media_type: &'static str, body: String) -> Response {
    ([(header::CONTENT_TYPE, media_type)], body).into_response()
}

/// Reads an artifact, mapping absence to [`BeaconError::NotFound`] with a
/// root-relative path.
async fn read_artifact(root: &Path, path: &Path) -> Result<String, BeaconError> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(String::from_utf8_lossy(&raw).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BeaconError::NotFound(
            path.strip_prefix(root).unwrap_or(path).to_path_buf(),
        )),
        Err(e) => Err(BeaconError::io(path, e)),
    }
}

/// Runs a version-control query off the async workers.
async fn query_vcs<T, F>(state: &AppState, query: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn VersionControl) -> Option<T> + Send + 'static,
{
    let vcs = Arc::clone(&state.vcs);
    match tokio::task::spawn_blocking(move || query(vcs.as_ref())).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("version control query failed: {}", e);
            None
        }
    }
}

pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    tracing::debug!("GET /healthz");
    let commit = query_vcs(&state, |vcs| vcs.current_commit()).await;
    Json(json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "commit": commit.map(|c| c.short),
        "generated_at": now_utc(),
    }))
}

pub async fn get_snapshot(State(state): State<AppState>) -> Result<Response, ApiError> {
    tracing::debug!("GET /snapshot");
    let body = read_artifact(&state.config.root, &state.config.snapshot_path()).await?;
    Ok(text(YAML, body))
}

pub async fn get_snapshot_json(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    tracing::debug!("GET /snapshot.json");
    let body = read_artifact(&state.config.root, &state.config.snapshot_path()).await?;
    let document = codec::decode(&body)?;
    if !document.is_object() {
        return Err(BeaconError::parse(1, "top level of the snapshot is not a mapping").into());
    }
    Ok(Json(document))
}

pub async fn get_digest(State(state): State<AppState>) -> Result<Response, ApiError> {
    tracing::debug!("GET /digest");
    let body = read_artifact(&state.config.root, &state.config.digest_path()).await?;
    Ok(text(MARKDOWN, body))
}

pub async fn get_digest_json(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    tracing::debug!("GET /digest.json");
    let markdown = read_artifact(&state.config.root, &state.config.digest_path()).await?;
    Ok(Json(json!({ "markdown": markdown })))
}

pub async fn get_guide(State(state): State<AppState>) -> Result<Response, ApiError> {
    tracing::debug!("GET /guide");
    match read_artifact(&state.config.root, &state.config.guide_path()).await {
        Ok(body) => Ok(text(MARKDOWN, body)),
        Err(BeaconError::NotFound(_)) => Ok(text(MARKDOWN, FALLBACK_GUIDE.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_version(State(state): State<AppState>) -> Json<Value> {
    tracing::debug!("GET /version");
    let commit = query_vcs(&state, |vcs| vcs.current_commit()).await;
    let (full, short) = match commit {
        Some(c) => (Some(c.full), Some(c.short)),
        None => (None, None),
    };
    Json(json!({
        "commit": full,
        "short": short,
        "generated_at": now_utc(),
    }))
}

pub async fn get_runtime(State(state): State<AppState>) -> Json<RuntimeInfo> {
    tracing::debug!("GET /runtime");
    Json(RuntimeInfo::collect(&state.config))
}

#[derive(Debug, Serialize)]
pub struct ChangesSinceCheckpoint {
    pub checkpoint: Option<String>,
    pub range: Option<String>,
    pub entries: Vec<ChangeEntry>,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub async fn get_changes_since_checkpoint(
    State(state): State<AppState>,
) -> Json<ChangesSinceCheckpoint> {
    tracing::debug!("GET /changes-since-checkpoint");
    let Some(tag) = query_vcs(&state, |vcs| vcs.latest_checkpoint_tag()).await else {
        return Json(ChangesSinceCheckpoint {
            checkpoint: None,
            range: None,
            entries: Vec::new(),
            raw: String::new(),
            note: Some(format!(
                "no checkpoint tag matching `{}` found",
                state.config.checkpoint_pattern
            )),
        });
    };
    let range = format!("{tag}..HEAD");
    let query_tag = tag.clone();
    let changes = query_vcs(&state, move |vcs| vcs.changes_since(&query_tag)).await;
    Json(match changes {
        Some(changes) => ChangesSinceCheckpoint {
            checkpoint: Some(tag),
            range: Some(range),
            entries: changes.entries,
            raw: changes.raw,
            note: None,
        },
        None => ChangesSinceCheckpoint {
            note: Some(format!("diff against `{tag}` is unavailable")),
            checkpoint: Some(tag),
            range: Some(range),
            entries: Vec::new(),
            raw: String::new(),
        },
    })
}
