//! Report generation for the command-line shell
//!
//! Each computation has a serializable report type, a human-readable writer
//! and a JSON writer. The web API returns the same report types.

use std::collections::BTreeSet;
use std::io::{self, Write};

use serde::Serialize;

use crate::clustering::{Partition, WeightedEdge};
use crate::composition::{Component, CompositionBuilder, PictureFuzzyValue};
use crate::fuzzy_graph::{FuzzyGraph, GraphError, Violation};
use crate::membership;

const BAR_WIDTH: usize = 20;

/// Membership of one height in the fuzzy set of tall people
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipReport {
    pub height: f64,
    pub degree: f64,
}

impl MembershipReport {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            degree: membership::score(height),
        }
    }
}

/// Strength of connectedness between two vertices; `None` when unconnected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connectedness {
    pub from: String,
    pub to: String,
    pub strength: Option<f64>,
}

/// Validation outcome together with the graph's size measures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub graph: FuzzyGraph,
    pub violations: Vec<Violation>,
    pub valid: bool,
    pub order: f64,
    pub size: f64,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectedness: Option<Connectedness>,
}

impl ValidationReport {
    pub fn new(graph: FuzzyGraph) -> Result<Self, GraphError> {
        let violations = graph.validate()?;
        Ok(Self {
            valid: violations.is_empty(),
            order: graph.order(),
            size: graph.size(),
            complete: graph.is_complete(),
            connectedness: None,
            violations,
            graph,
        })
    }

    /// Attach the strength of connectedness between `from` and `to`
    pub fn with_connectedness(mut self, from: &str, to: &str) -> Result<Self, GraphError> {
        let strength = self.graph.strength_of_connectedness(from, to)?;
        self.connectedness = Some(Connectedness {
            from: from.to_string(),
            to: to.to_string(),
            strength,
        });
        Ok(self)
    }
}

/// Threshold partition plus the clusters it produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringReport {
    pub threshold: f64,
    pub kept: Vec<WeightedEdge>,
    pub cut: Vec<WeightedEdge>,
    pub nodes: BTreeSet<String>,
    pub clusters: Vec<Vec<String>>,
}

impl From<Partition> for ClusteringReport {
    fn from(partition: Partition) -> Self {
        let clusters = partition.clusters();
        Self {
            threshold: partition.threshold,
            kept: partition.kept,
            cut: partition.cut,
            nodes: partition.nodes,
            clusters,
        }
    }
}

/// A completed picture fuzzy value with the slider caps that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionReport {
    #[serde(flatten)]
    pub value: PictureFuzzyValue,
    /// Hesitation if abstention were folded into refusal (intuitionistic view)
    pub hesitation: f64,
    pub opposition_cap: f64,
    pub abstention_cap: f64,
}

impl CompositionReport {
    pub fn new(builder: &CompositionBuilder, value: PictureFuzzyValue) -> Self {
        Self {
            hesitation: value.abstention + value.refusal,
            opposition_cap: builder.cap(Component::Opposition),
            abstention_cap: builder.cap(Component::Abstention),
            value,
        }
    }
}

/// Write any report as pretty-printed JSON
pub fn write_json<T: Serialize, W: Write>(report: &T, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report).map_err(io::Error::other)?;
    writeln!(writer)
}

fn progress_bar(degree: f64) -> String {
    let filled = (degree.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn write_membership<W: Write>(report: &MembershipReport, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Fuzzy Set: Tall People")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(
        writer,
        "A person with a height of {} cm has a membership value of {:.2}",
        report.height, report.degree
    )?;
    writeln!(writer, "{} {:.2}", progress_bar(report.degree), report.degree)?;
    Ok(())
}

pub fn write_validation<W: Write>(report: &ValidationReport, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Fuzzy Graph Validation")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer)?;

    writeln!(writer, "Vertices:")?;
    for (id, sigma) in &report.graph.vertices {
        writeln!(writer, "  {:<8} σ = {:.2}", id, sigma)?;
    }
    writeln!(writer, "Edges:")?;
    for edge in &report.graph.edges {
        writeln!(writer, "  {:<8} μ = {:.2}", edge.id(), edge.strength)?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "Order: {:.2} | Size: {:.2} | Complete: {}",
        report.order,
        report.size,
        if report.complete { "yes" } else { "no" }
    )?;
    writeln!(writer)?;

    if report.valid {
        writeln!(writer, "✓ This is a valid fuzzy graph!")?;
    } else {
        for violation in &report.violations {
            writeln!(writer, "✗ Rule Violation: {}", violation)?;
        }
    }

    if let Some(c) = &report.connectedness {
        match c.strength {
            Some(value) => writeln!(
                writer,
                "Strength of connectedness {}-{}: {:.2}",
                c.from, c.to, value
            )?,
            None => writeln!(writer, "{} and {} are not connected", c.from, c.to)?,
        }
    }
    Ok(())
}

fn write_edges<W: Write>(title: &str, edges: &[WeightedEdge], writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{} ({}):", title, edges.len())?;
    for edge in edges {
        writeln!(
            writer,
            "  {:>4} -- {:<4} {:.2}",
            edge.source, edge.target, edge.weight
        )?;
    }
    Ok(())
}

pub fn write_clustering<W: Write>(report: &ClusteringReport, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Threshold Clustering (α = {:.2})", report.threshold)?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(
        writer,
        "By cutting all connections weaker than {:.2}, {} objects separate into {} cluster(s).",
        report.threshold,
        report.nodes.len(),
        report.clusters.len()
    )?;
    writeln!(writer)?;

    write_edges("Kept", &report.kept, writer)?;
    write_edges("Cut", &report.cut, writer)?;
    writeln!(writer)?;

    writeln!(writer, "Clusters:")?;
    for (i, cluster) in report.clusters.iter().enumerate() {
        writeln!(writer, "  {}. {{{}}}", i + 1, cluster.join(", "))?;
    }
    Ok(())
}

pub fn write_forest<W: Write>(forest: &[WeightedEdge], writer: &mut W) -> io::Result<()> {
    let total: f64 = forest.iter().map(|e| e.weight).sum();
    writeln!(writer, "Maximum Spanning Forest (total weight {:.2})", total)?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    write_edges("Edges", forest, writer)
}

pub fn write_composition<W: Write>(report: &CompositionReport, writer: &mut W) -> io::Result<()> {
    let value = &report.value;
    writeln!(writer, "Picture Fuzzy Value")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer, "Support (Yes):         {:.2}", value.support)?;
    writeln!(
        writer,
        "Opposition (No):       {:.2}  (max {:.2})",
        value.opposition, report.opposition_cap
    )?;
    writeln!(
        writer,
        "Abstention (Neutral):  {:.2}  (max {:.2})",
        value.abstention, report.abstention_cap
    )?;
    writeln!(writer, "Refusal:               {:.2}", value.refusal)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Intuitionistic view: hesitation = {:.2}",
        report.hesitation
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{DEFAULT_THRESHOLD, car_similarity_edges, partition};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_membership_report() {
        let report = MembershipReport::new(175.0);
        let text = render(|w| write_membership(&report, w));
        assert!(text.contains("height of 175 cm has a membership value of 0.60"));
        assert!(text.contains("████████████░░░░░░░░"));
    }

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "░".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(1.0), format!("[{}]", "█".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_valid_graph_report() {
        let report = ValidationReport::new(FuzzyGraph::demo()).unwrap();
        assert!(report.valid);
        let text = render(|w| write_validation(&report, w));
        assert!(text.contains("valid fuzzy graph"));
        assert!(text.contains("Order: 2.70 | Size: 1.80"));
    }

    #[test]
    fn test_invalid_graph_report() {
        let graph = FuzzyGraph::new()
            .with_vertex("A", 0.9)
            .with_vertex("B", 0.8)
            .with_edge("A", "B", 0.95);
        let report = ValidationReport::new(graph).unwrap();
        assert!(!report.valid);
        let text = render(|w| write_validation(&report, w));
        assert!(text.contains("Rule Violation: Edge A-B (0.95) is stronger than min(A, B) = 0.80"));
    }

    #[test]
    fn test_connectedness_in_text_and_json() {
        let report = ValidationReport::new(FuzzyGraph::demo())
            .and_then(|r| r.with_connectedness("A", "C"))
            .unwrap();

        let text = render(|w| write_validation(&report, w));
        assert!(text.contains("Strength of connectedness A-C: 0.60"));

        let json = render(|w| write_json(&report, w));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["connectedness"]["from"], "A");
        assert_eq!(value["connectedness"]["to"], "C");
        assert_eq!(value["connectedness"]["strength"], 0.6);
    }

    #[test]
    fn test_connectedness_omitted_unless_requested() {
        let report = ValidationReport::new(FuzzyGraph::demo()).unwrap();
        let json = render(|w| write_json(&report, w));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("connectedness").is_none());
    }

    #[test]
    fn test_unknown_connectedness_vertex() {
        let report = ValidationReport::new(FuzzyGraph::demo()).unwrap();
        assert!(matches!(
            report.with_connectedness("A", "Z"),
            Err(GraphError::UnknownVertex(_))
        ));
    }

    #[test]
    fn test_clustering_report() {
        let report = ClusteringReport::from(partition(&car_similarity_edges(), DEFAULT_THRESHOLD));
        assert_eq!(report.clusters.len(), 3);
        let text = render(|w| write_clustering(&report, w));
        assert!(text.contains("10 objects separate into 3 cluster(s)"));
        assert!(text.contains("Kept (7):"));
        assert!(text.contains("Cut (2):"));
        assert!(text.contains("{G4, G9}"));
    }

    #[test]
    fn test_composition_report_json() {
        let builder = CompositionBuilder::new()
            .support(0.5)
            .and_then(|b| b.opposition(0.2))
            .and_then(|b| b.abstention(0.1))
            .unwrap();
        let report = CompositionReport::new(&builder, builder.build().unwrap());

        let text = render(|w| write_composition(&report, w));
        assert!(text.contains("Refusal:               0.20"));

        let json = render(|w| write_json(&report, w));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["support"], 0.5);
        assert_eq!(value["opposition_cap"], 0.5);
        assert!(value["refusal"].as_f64().unwrap() > 0.19);
    }
}
