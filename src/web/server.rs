//! Web server for the interactive explorer
//!
//! Provides an HTTP server using Axum to serve the explorer page
//! and JSON API endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::clustering::WeightedEdge;
use crate::config::ExplorerConfig;
use crate::fuzzy_graph::FuzzyGraph;
use crate::render::GraphRenderer;

use super::routes;

/// Shared application state
pub struct AppState {
    /// Graph served by `GET /api/graph`
    pub graph: FuzzyGraph,
    /// Similarity edges clustered by `GET /api/clusters`
    pub clustering_edges: Vec<WeightedEdge>,
    pub default_threshold: f64,
    /// Chosen once at startup
    pub renderer: Box<dyn GraphRenderer>,
}

impl AppState {
    pub fn from_config(config: &ExplorerConfig, renderer: Box<dyn GraphRenderer>) -> Self {
        Self {
            graph: config.graph(),
            clustering_edges: config.clustering.edges(),
            default_threshold: config.clustering.threshold,
            renderer,
        }
    }
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_browser: true,
        }
    }
}

/// Assemble the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(routes::static_routes())
        .with_state(Arc::new(state))
}

/// Start the web server and serve the explorer
pub async fn start_server(
    state: AppState,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(renderer = state.renderer.name(), "building router");
    let app = app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", config.port);
    eprintln!("Starting web server at {}", url);

    if config.open_browser {
        eprintln!("Opening browser...");
        if let Err(e) = open::that(&url) {
            eprintln!("Warning: Could not open browser: {}", e);
            eprintln!("Please open {} manually", url);
        }
    }

    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, app).await?;

    Ok(())
}
