//! HTTP API: the suggestion endpoint and the static frontend.

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
};
use outfit_core::{Config, SuggestionOrchestrator};
use percent_encoding::percent_decode_str;
use tracing::{debug, info, instrument, warn};

/// API server state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SuggestionOrchestrator>,
    pub static_dir: Arc<PathBuf>,
}

/// Creates the API router.
pub fn create_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/suggest", post(suggest))
        .fallback(static_file)
        .with_state(state);

    let router = if cors {
        router.layer(middleware::from_fn(cors_headers))
    } else {
        router
    };

    router.layer(middleware::from_fn(log_request))
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let orchestrator = Arc::new(SuggestionOrchestrator::from_config(config)?);
    let state = AppState {
        orchestrator,
        static_dir: Arc::new(config.server.static_dir.clone()),
    };

    if !config.server.static_dir.is_dir() {
        warn!(
            static_dir = %config.server.static_dir.display(),
            "static directory does not exist, only /suggest will answer"
        );
    }

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state, config.server.cors))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for Ctrl-C");
    }
    info!("shutting down");
}

/// Run the pipeline on the raw body; stage failures become plain-text errors.
#[instrument(skip_all)]
async fn suggest(State(state): State<AppState>, body: Bytes) -> Response {
    match state.orchestrator.handle_json(&body).await {
        Ok(outcome) => {
            match serde_json::to_string(&outcome.trace) {
                Ok(trace) => debug!(%trace, "suggestion trace"),
                Err(err) => warn!(%err, "could not serialize suggestion trace"),
            }
            (StatusCode::OK, Json(outcome.response)).into_response()
        }
        Err(err) => {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            warn!(%status, error = %err, "suggestion failed");
            (status, err.public_message()).into_response()
        }
    }
}

/// Serve a file below the static directory for any other path.
async fn static_file(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(path) = resolve_static_path(&state.static_dir, uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(contents) => ([(header::CONTENT_TYPE, content_type(&path))], contents).into_response(),
        Err(err) => {
            debug!(path = %path.display(), %err, "static file not served");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Maps a URL path into `root`; `None` for anything that could escape it.
///
/// Segments are percent-decoded first, and each decoded segment must be a single
/// plain path component.
fn resolve_static_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let mut path = root.to_path_buf();

    for segment in relative.split('/').filter(|segment| !segment.is_empty()) {
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        let mut components = Path::new(decoded.as_ref()).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => path.push(part),
            _ => return None,
        }
    }

    if relative.is_empty() || relative.ends_with('/') {
        path.push("index.html");
    }

    Some(path)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let res = next.run(req).await;

    info!(
        %method,
        %path,
        status = res.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    res
}

async fn cors_headers(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = res.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    res
}
