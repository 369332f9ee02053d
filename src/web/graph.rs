//! Graph data structures for web visualization
//!
//! Converts fuzzy graphs and threshold partitions to a JSON-serializable
//! graph format drawn by the explorer page.

use serde::Serialize;

use crate::clustering::Partition;
use crate::fuzzy_graph::{FuzzyGraph, Violation};
use crate::report::{ClusteringReport, ValidationReport};

/// Complete graph data for visualization
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// A node in the drawn graph
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Existence degree σ, if the node carries one
    pub value: Option<f64>,
    /// Index of the cluster this node belongs to
    pub cluster: Option<usize>,
}

/// How an edge should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    /// Obeys `μ <= min(σ(u), σ(v))`
    Valid,
    /// Breaks the fuzzy graph rule
    Violation,
    /// Survived the similarity threshold
    Kept,
    /// Weaker than the similarity threshold
    Cut,
}

/// An edge in the drawn graph
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub value: f64,
    pub status: EdgeStatus,
}

/// Fuzzy graph drawing plus its validation report
#[derive(Debug, Clone, Serialize)]
pub struct FuzzyGraphPayload {
    pub report: ValidationReport,
    pub graph: GraphData,
}

/// Cluster drawing plus its clustering report
#[derive(Debug, Clone, Serialize)]
pub struct ClusteringPayload {
    pub report: ClusteringReport,
    pub graph: GraphData,
}

/// Convert a fuzzy graph to GraphData, marking violating edges
pub fn fuzzy_graph_to_graph(graph: &FuzzyGraph, violations: &[Violation]) -> GraphData {
    let nodes = graph
        .vertices
        .iter()
        .map(|(id, sigma)| Node {
            id: id.clone(),
            label: format!("{} (σ={:.2})", id, sigma),
            value: Some(*sigma),
            cluster: None,
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .enumerate()
        .map(|(i, edge)| {
            let status = if violations.iter().any(|v| v.index == i) {
                EdgeStatus::Violation
            } else {
                EdgeStatus::Valid
            };
            Edge {
                id: format!("e{}", i),
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: format!("μ={:.2}", edge.strength),
                value: edge.strength,
                status,
            }
        })
        .collect();

    GraphData { nodes, edges }
}

/// Convert a clustering report to GraphData: every node, kept and cut edges
pub fn clustering_to_graph(report: &ClusteringReport) -> GraphData {
    let cluster_of = |node: &str| {
        report
            .clusters
            .iter()
            .position(|members| members.iter().any(|m| m == node))
    };

    let nodes = report
        .nodes
        .iter()
        .map(|id| Node {
            id: id.clone(),
            label: id.clone(),
            value: None,
            cluster: cluster_of(id.as_str()),
        })
        .collect();

    let kept = report.kept.iter().map(|e| (e, EdgeStatus::Kept));
    let cut = report.cut.iter().map(|e| (e, EdgeStatus::Cut));

    let edges = kept
        .chain(cut)
        .enumerate()
        .map(|(i, (edge, status))| Edge {
            id: format!("e{}", i),
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: format!("{:.2}", edge.weight),
            value: edge.weight,
            status,
        })
        .collect();

    GraphData { nodes, edges }
}

/// Build the payload for a partition
pub fn partition_payload(partition: Partition) -> ClusteringPayload {
    let report = ClusteringReport::from(partition);
    let graph = clustering_to_graph(&report);
    ClusteringPayload { report, graph }
}
