//! HTTP routes for the web explorer
//!
//! Provides API endpoints for the four computations, diagram rendering and
//! static file serving. Impossible inputs answer `422 Unprocessable Entity`.

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error};

use super::graph::{self, FuzzyGraphPayload};
use super::server::AppState;
use crate::clustering::{self, THRESHOLD_RANGE};
use crate::composition::CompositionBuilder;
use crate::fuzzy_graph::FuzzyGraph;
use crate::membership::{DEFAULT_HEIGHT, HEIGHT_RANGE};
use crate::render::{Diagram, render_or_fallback};
use crate::report::{CompositionReport, MembershipReport, ValidationReport};

/// Embedded static assets
#[derive(RustEmbed)]
#[folder = "web-assets/"]
struct Assets;

/// Slider ranges and capabilities for the frontend
#[derive(Serialize)]
struct FrontendConfig {
    height_range: [f64; 2],
    default_height: f64,
    threshold_range: [f64; 2],
    default_threshold: f64,
    renderer: RendererInfo,
}

/// Which renderer was selected at startup
#[derive(Serialize)]
struct RendererInfo {
    name: &'static str,
    native: bool,
}

#[derive(Deserialize)]
struct MembershipQuery {
    height: Option<f64>,
}

#[derive(Deserialize)]
struct ThresholdQuery {
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct CompositionQuery {
    support: Option<f64>,
    opposition: Option<f64>,
    abstention: Option<f64>,
}

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/config", get(get_config))
        .route("/api/renderer", get(get_renderer))
        .route("/api/membership", get(get_membership))
        .route("/api/graph", get(get_graph))
        .route("/api/graph/validate", post(validate_graph))
        .route("/api/clusters", get(get_clusters))
        .route("/api/composition", get(get_composition))
        .route("/api/diagram/graph", get(get_graph_diagram))
        .route("/api/diagram/clusters", get(get_cluster_diagram))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Create static file routes
pub fn static_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index_html))
        .route("/{*path}", get(static_handler))
}

fn unprocessable(error: impl Display) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({"error": error.to_string()})),
    )
        .into_response()
}

fn internal_error(error: impl Display) -> Response {
    error!(error = %error, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": error.to_string()})),
    )
        .into_response()
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// GET /api/config - Returns frontend configuration
async fn get_config(State(state): State<Arc<AppState>>) -> Json<FrontendConfig> {
    Json(FrontendConfig {
        height_range: [*HEIGHT_RANGE.start(), *HEIGHT_RANGE.end()],
        default_height: DEFAULT_HEIGHT,
        threshold_range: [*THRESHOLD_RANGE.start(), *THRESHOLD_RANGE.end()],
        default_threshold: state.default_threshold,
        renderer: renderer_info(&state),
    })
}

fn renderer_info(state: &AppState) -> RendererInfo {
    RendererInfo {
        name: state.renderer.name(),
        native: state.renderer.is_native(),
    }
}

/// GET /api/renderer - Returns the diagram capability
async fn get_renderer(State(state): State<Arc<AppState>>) -> Json<RendererInfo> {
    Json(renderer_info(&state))
}

/// GET /api/membership?height= - Membership in the fuzzy set of tall people
async fn get_membership(Query(query): Query<MembershipQuery>) -> Json<MembershipReport> {
    Json(MembershipReport::new(query.height.unwrap_or(DEFAULT_HEIGHT)))
}

fn graph_payload(fuzzy: FuzzyGraph) -> Response {
    match ValidationReport::new(fuzzy) {
        Ok(report) => {
            let data = graph::fuzzy_graph_to_graph(&report.graph, &report.violations);
            Json(FuzzyGraphPayload {
                report,
                graph: data,
            })
            .into_response()
        }
        Err(e) => unprocessable(e),
    }
}

/// GET /api/graph - The configured fuzzy graph and its validation
async fn get_graph(State(state): State<Arc<AppState>>) -> Response {
    graph_payload(state.graph.clone())
}

/// POST /api/graph/validate - Validate a fuzzy graph sent by the page
async fn validate_graph(Json(fuzzy): Json<FuzzyGraph>) -> Response {
    debug!(
        vertices = fuzzy.vertices.len(),
        edges = fuzzy.edges.len(),
        "validating submitted graph"
    );
    graph_payload(fuzzy)
}

/// GET /api/clusters?threshold= - Threshold clustering of the similarity edges
async fn get_clusters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThresholdQuery>,
) -> Json<graph::ClusteringPayload> {
    let threshold = query.threshold.unwrap_or(state.default_threshold);
    let partition = clustering::partition(&state.clustering_edges, threshold);
    Json(graph::partition_payload(partition))
}

/// GET /api/composition - Complete a picture fuzzy value
async fn get_composition(Query(query): Query<CompositionQuery>) -> Response {
    let built = CompositionBuilder::new()
        .support(query.support.unwrap_or(0.0))
        .and_then(|b| b.opposition(query.opposition.unwrap_or(0.0)))
        .and_then(|b| b.abstention(query.abstention.unwrap_or(0.0)))
        .and_then(|b| b.build().map(|value| (b, value)));

    match built {
        Ok((builder, value)) => Json(CompositionReport::new(&builder, value)).into_response(),
        Err(e) => unprocessable(e),
    }
}

/// Render off the async runtime; Graphviz is an external process
async fn render_diagram(state: Arc<AppState>, diagram: Diagram) -> Response {
    let task =
        tokio::task::spawn_blocking(move || render_or_fallback(state.renderer.as_ref(), &diagram));

    match task.await {
        Ok(Ok(rendered)) => Json(rendered).into_response(),
        Ok(Err(e)) => internal_error(e),
        Err(e) => internal_error(e),
    }
}

/// GET /api/diagram/graph - Rendered fuzzy graph (SVG or instructions)
async fn get_graph_diagram(State(state): State<Arc<AppState>>) -> Response {
    let violations = match state.graph.validate() {
        Ok(violations) => violations,
        Err(e) => return unprocessable(e),
    };
    let diagram = Diagram::from_fuzzy_graph(&state.graph, &violations);
    render_diagram(state, diagram).await
}

/// GET /api/diagram/clusters?threshold= - Rendered clustering diagram
async fn get_cluster_diagram(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThresholdQuery>,
) -> Response {
    let threshold = query.threshold.unwrap_or(state.default_threshold);
    let diagram = Diagram::from_partition(&clustering::partition(
        &state.clustering_edges,
        threshold,
    ));
    render_diagram(state, diagram).await
}

/// GET / - Serve index.html
async fn index_html() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// Static file handler for embedded assets
async fn static_handler(
    axum::extract::Path(path): axum::extract::Path<String>,
) -> impl IntoResponse {
    let path = path.trim_start_matches('/');

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::DEFAULT_THRESHOLD;
    use crate::config::ExplorerConfig;
    use crate::render::FallbackInstructionsRenderer;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::from_config(
            &ExplorerConfig::default(),
            Box::new(FallbackInstructionsRenderer),
        ))
    }

    #[tokio::test]
    async fn test_membership_endpoint() {
        let Json(report) = get_membership(Query(MembershipQuery {
            height: Some(185.0),
        }))
        .await;
        assert!((report.degree - 0.9).abs() < 1e-12);

        let Json(report) = get_membership(Query(MembershipQuery { height: None })).await;
        assert_eq!(report.height, DEFAULT_HEIGHT);
    }

    #[tokio::test]
    async fn test_composition_endpoint() {
        let ok = get_composition(Query(CompositionQuery {
            support: Some(0.5),
            opposition: Some(0.2),
            abstention: Some(0.1),
        }))
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let rejected = get_composition(Query(CompositionQuery {
            support: Some(0.6),
            opposition: Some(0.5),
            abstention: None,
        }))
        .await;
        assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_validate_endpoint_reports_missing_vertex() {
        let graph = FuzzyGraph::demo().with_edge("A", "Z", 0.1);
        let response = validate_graph(Json(graph)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = validate_graph(Json(FuzzyGraph::demo())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_clusters_endpoint_uses_default_threshold() {
        let Json(payload) =
            get_clusters(State(state()), Query(ThresholdQuery { threshold: None })).await;
        assert_eq!(payload.report.threshold, DEFAULT_THRESHOLD);
        assert_eq!(payload.report.clusters.len(), 3);
    }

    #[tokio::test]
    async fn test_diagram_endpoint_falls_back() {
        let response = get_graph_diagram(State(state())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let Json(info) = get_renderer(State(state())).await;
        assert!(!info.native);
        assert_eq!(info.name, "fallback-instructions");
    }
}
