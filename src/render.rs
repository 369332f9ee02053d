//! Diagram rendering with an optional Graphviz dependency
//!
//! Diagrams are described once as a [`Diagram`] and turned into Graphviz DOT.
//! Whether that DOT can become an image depends on the `dot` executable being
//! installed, so rendering is a capability chosen once at startup:
//!
//! - [`NativeRenderer`] pipes DOT through Graphviz and returns SVG
//! - [`FallbackInstructionsRenderer`] returns installation guidance instead
//!
//! A missing Graphviz is never fatal; see [`render_or_fallback`].

use std::fmt::Write as _;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clustering::Partition;
use crate::fuzzy_graph::{FuzzyGraph, Violation};

/// Executable probed when no other command is configured
pub const DEFAULT_GRAPHVIZ_COMMAND: &str = "dot";

/// Where users can download Graphviz
pub const GRAPHVIZ_DOWNLOAD_URL: &str = "https://graphviz.org/download/";

/// Errors that can occur while rendering a diagram
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Graphviz executable '{command}' is not available")]
    OptionalDependencyUnavailable { command: String },

    #[error("Graphviz exited with {status}: {stderr}")]
    GraphvizFailed { status: String, stderr: String },

    #[error("Failed to talk to Graphviz: {0}")]
    IoError(#[from] io::Error),
}

/// A node to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
}

/// An edge to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    /// Drawn in red, e.g. a rule violation
    pub highlight: bool,
}

/// Renderer-independent description of an undirected diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub title: String,
    pub node_fill: String,
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl Diagram {
    /// Vertices labelled with σ, edges with μ; edges in `violations` are
    /// highlighted.
    pub fn from_fuzzy_graph(graph: &FuzzyGraph, violations: &[Violation]) -> Self {
        let nodes = graph
            .vertices
            .iter()
            .map(|(id, sigma)| DiagramNode {
                id: id.clone(),
                label: format!("{} (σ={:.2})", id, sigma),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .enumerate()
            .map(|(i, edge)| DiagramEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: format!("μ={:.2}", edge.strength),
                highlight: violations.iter().any(|v| v.index == i),
            })
            .collect();

        Self {
            title: "Fuzzy Graph".to_string(),
            node_fill: "lightblue".to_string(),
            nodes,
            edges,
        }
    }

    /// Only kept edges are drawn; every node is, so cut-off objects show up
    /// as singleton clusters.
    pub fn from_partition(partition: &Partition) -> Self {
        let nodes = partition
            .nodes
            .iter()
            .map(|id| DiagramNode {
                id: id.clone(),
                label: id.clone(),
            })
            .collect();

        let edges = partition
            .kept
            .iter()
            .map(|edge| DiagramEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: format!("{:.2}", edge.weight),
                highlight: false,
            })
            .collect();

        Self {
            title: "Maximum Spanning Tree".to_string(),
            node_fill: "lightcoral".to_string(),
            nodes,
            edges,
        }
    }

    /// Graphviz DOT source for an undirected graph
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(dot, "graph {{");
        let _ = writeln!(dot, "  label={};", quote(&self.title));
        let _ = writeln!(
            dot,
            "  node [shape=circle, style=filled, fillcolor={}, fontcolor=black];",
            quote(&self.node_fill)
        );
        let _ = writeln!(dot, "  edge [fontcolor=darkgreen];");

        for node in &self.nodes {
            let _ = writeln!(dot, "  {} [label={}];", quote(&node.id), quote(&node.label));
        }

        for edge in &self.edges {
            let color = if edge.highlight { ", color=red" } else { "" };
            let _ = writeln!(
                dot,
                "  {} -- {} [label={}{}];",
                quote(&edge.source),
                quote(&edge.target),
                quote(&edge.label),
                color
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Output of a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Rendered {
    /// An SVG image produced by Graphviz
    Svg(String),
    /// Markdown explaining how to enable diagrams
    Instructions(String),
}

/// A strategy for turning diagrams into something displayable
pub trait GraphRenderer: Send + Sync {
    /// Short identifier shown in logs and the API
    fn name(&self) -> &'static str;

    /// Whether this renderer produces real images
    fn is_native(&self) -> bool;

    fn render(&self, diagram: &Diagram) -> Result<Rendered, RenderError>;
}

/// Renders through the Graphviz `dot` executable
#[derive(Debug, Clone)]
pub struct NativeRenderer {
    command: String,
}

impl NativeRenderer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Check that `command -V` runs, returning a renderer if it does
    pub fn probe(command: &str) -> Result<Self, RenderError> {
        let status = Command::new(command)
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| spawn_error(command, e))?;

        if status.success() {
            Ok(Self::new(command))
        } else {
            Err(RenderError::OptionalDependencyUnavailable {
                command: command.to_string(),
            })
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

fn spawn_error(command: &str, error: io::Error) -> RenderError {
    if error.kind() == io::ErrorKind::NotFound {
        RenderError::OptionalDependencyUnavailable {
            command: command.to_string(),
        }
    } else {
        RenderError::IoError(error)
    }
}

impl GraphRenderer for NativeRenderer {
    fn name(&self) -> &'static str {
        "graphviz"
    }

    fn is_native(&self) -> bool {
        true
    }

    fn render(&self, diagram: &Diagram) -> Result<Rendered, RenderError> {
        let mut child = Command::new(&self.command)
            .arg("-Tsvg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&self.command, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(diagram.to_dot().as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(RenderError::GraphvizFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(bytes = output.stdout.len(), "rendered diagram with graphviz");
        Ok(Rendered::Svg(
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }
}

/// Stands in for Graphviz when it is not installed
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackInstructionsRenderer;

impl FallbackInstructionsRenderer {
    pub fn instructions() -> String {
        format!(
            "## Graph Visualization Disabled\n\
             \n\
             Diagrams need the Graphviz `dot` executable.\n\
             \n\
             **Step 1: Install Graphviz** for your operating system from \
             the official download page: {url}\n\
             \n\
             **Step 2: Restart** the explorer. If `dot` is installed somewhere \
             unusual, point `renderer.graphviz_command` in `.fuzzy-explorer.toml` \
             at it.\n",
            url = GRAPHVIZ_DOWNLOAD_URL
        )
    }
}

impl GraphRenderer for FallbackInstructionsRenderer {
    fn name(&self) -> &'static str {
        "fallback-instructions"
    }

    fn is_native(&self) -> bool {
        false
    }

    fn render(&self, _diagram: &Diagram) -> Result<Rendered, RenderError> {
        Ok(Rendered::Instructions(Self::instructions()))
    }
}

/// Pick a renderer by probing for Graphviz once
pub fn detect_renderer(command: &str) -> Box<dyn GraphRenderer> {
    match NativeRenderer::probe(command) {
        Ok(native) => {
            info!(command, "graphviz available, rendering diagrams natively");
            Box::new(native)
        }
        Err(e) => {
            warn!(error = %e, "graphviz unavailable, showing installation instructions");
            Box::new(FallbackInstructionsRenderer)
        }
    }
}

/// Render, degrading to installation instructions if Graphviz has gone
/// missing since startup. Other failures are returned.
pub fn render_or_fallback(
    renderer: &dyn GraphRenderer,
    diagram: &Diagram,
) -> Result<Rendered, RenderError> {
    match renderer.render(diagram) {
        Err(RenderError::OptionalDependencyUnavailable { command }) => {
            warn!(command, "graphviz disappeared, falling back to instructions");
            FallbackInstructionsRenderer.render(diagram)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{car_similarity_edges, partition};

    const MISSING_COMMAND: &str = "fuzzy-explorer-no-such-graphviz";

    #[test]
    fn test_fuzzy_graph_dot() {
        let graph = FuzzyGraph::new()
            .with_vertex("A", 0.9)
            .with_vertex("B", 0.8)
            .with_vertex("C", 1.0)
            .with_edge("A", "B", 0.95)
            .with_edge("B", "C", 0.6);
        let violations = graph.validate().unwrap();
        let dot = Diagram::from_fuzzy_graph(&graph, &violations).to_dot();

        assert!(dot.starts_with("graph {"));
        assert!(dot.contains("\"A\" [label=\"A (σ=0.90)\"];"));
        assert!(dot.contains("\"B\" -- \"C\" [label=\"μ=0.60\"];"));
        assert!(dot.contains("\"A\" -- \"B\" [label=\"μ=0.95\", color=red];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_only_violating_parallel_edge_highlighted() {
        let graph = FuzzyGraph::new()
            .with_vertex("A", 0.9)
            .with_vertex("B", 0.8)
            .with_edge("A", "B", 0.5)
            .with_edge("A", "B", 0.95);
        let violations = graph.validate().unwrap();
        let diagram = Diagram::from_fuzzy_graph(&graph, &violations);

        assert!(!diagram.edges[0].highlight);
        assert!(diagram.edges[1].highlight);
    }

    #[test]
    fn test_partition_diagram_keeps_isolated_nodes() {
        let diagram = Diagram::from_partition(&partition(&car_similarity_edges(), 0.9));
        assert_eq!(diagram.nodes.len(), 10);
        assert!(diagram.edges.is_empty());
        assert!(diagram.to_dot().contains("\"G10\" [label=\"G10\"];"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"say "hi"\"#), r#""say \"hi\"\\""#);
    }

    #[test]
    fn test_fallback_renderer() {
        let rendered = FallbackInstructionsRenderer
            .render(&Diagram::from_fuzzy_graph(&FuzzyGraph::demo(), &[]))
            .unwrap();
        match rendered {
            Rendered::Instructions(text) => assert!(text.contains(GRAPHVIZ_DOWNLOAD_URL)),
            other => panic!("expected instructions, got {other:?}"),
        }
    }

    #[test]
    fn test_detect_without_graphviz_falls_back() {
        let renderer = detect_renderer(MISSING_COMMAND);
        assert_eq!(renderer.name(), "fallback-instructions");
        assert!(!renderer.is_native());
    }

    #[test]
    fn test_missing_executable_is_optional_dependency_error() {
        let err = NativeRenderer::new(MISSING_COMMAND)
            .render(&Diagram::from_fuzzy_graph(&FuzzyGraph::demo(), &[]))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::OptionalDependencyUnavailable { .. }
        ));
    }

    #[test]
    fn test_render_or_fallback_recovers() {
        let native = NativeRenderer::new(MISSING_COMMAND);
        let rendered =
            render_or_fallback(&native, &Diagram::from_fuzzy_graph(&FuzzyGraph::demo(), &[]))
                .unwrap();
        assert!(matches!(rendered, Rendered::Instructions(_)));
    }

    #[test]
    fn test_rendered_json_shape() {
        let json = serde_json::to_value(Rendered::Svg("<svg/>".to_string())).unwrap();
        assert_eq!(json["kind"], "svg");
        assert_eq!(json["content"], "<svg/>");
    }
}
