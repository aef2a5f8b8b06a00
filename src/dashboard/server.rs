use axum::{
    routing::get,
    Router,
    response::{IntoResponse, Response},
    extract::State,
    http::{header, StatusCode},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tracing::{error, info};

use crate::error::DashboardError;
use crate::render::{render, Layout, CONTENT_TYPE};
use crate::stats::Stats;

/// Frozen snapshot plus the canvas it is drawn on. Cheap to clone.
#[derive(Clone)]
pub struct DashboardState {
    pub stats: Arc<Stats>,
    pub layout: Arc<Layout>,
}

impl DashboardState {
    pub fn new(stats: Stats, layout: Layout) -> Self {
        Self {
            stats: Arc::new(stats),
            layout: Arc::new(layout),
        }
    }
}

pub fn build_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(get_svg))
        .route("/api/stats", get(get_stats))
        .layer(CompressionLayer::new())
        .with_state(state)
}

pub async fn start_dashboard_server(
    state: DashboardState,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<(), DashboardError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| DashboardError::Bind { addr, source })?;
    serve(listener, state, shutdown).await
}

/// Serve on an already bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: DashboardState,
    shutdown: CancellationToken,
) -> Result<(), DashboardError> {
    if let Ok(addr) = listener.local_addr() {
        info!("[Dashboard] SVG available at http://{}", addr);
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(DashboardError::Serve)
}

// Every request renders again from the same frozen snapshot.
async fn get_svg(State(state): State<DashboardState>) -> Response {
    match render(&state.stats, &state.layout) {
        Ok(svg) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], svg).into_response(),
        Err(e) => {
            error!("[Dashboard] Render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn get_stats(State(state): State<DashboardState>) -> impl IntoResponse {
    axum::Json(state.stats.as_ref().clone())
}
