//! Fuzzy graph data structures and validation
//!
//! A fuzzy graph `G = (σ, μ)` assigns every vertex an existence degree `σ(v)`
//! and every edge a strength degree `μ(u, v)`, both in `[0, 1]`. The one rule
//! every fuzzy graph must obey:
//!
//! ```text
//! μ(u, v) <= min(σ(u), σ(v))
//! ```
//!
//! A relationship can never be stronger than the entities it links. Graphs
//! that break the rule are still representable here so that the explorer can
//! show *why* they are invalid; [`validate`] reports the offending edges.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised by fuzzy graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Edge {edge} references undeclared vertex '{vertex}'")]
    MissingVertex { edge: String, vertex: String },

    #[error("Unknown vertex '{0}'")]
    UnknownVertex(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// A vertex with its existence degree σ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    pub existence: f64,
}

impl Vertex {
    pub fn new(id: impl Into<String>, existence: f64) -> Self {
        Self {
            id: id.into(),
            existence,
        }
    }
}

/// An undirected edge with its strength degree μ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub strength: f64,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, strength: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strength,
        }
    }

    /// Identifier in declaration order, e.g. `A-B`
    pub fn id(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }

    /// Whether this edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// An edge whose strength exceeds the weaker of its endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Position of the edge in the edge list
    pub index: usize,
    /// Edge identifier (`source-target`)
    pub edge: String,
    pub source: String,
    pub target: String,
    /// The edge strength μ
    pub strength: f64,
    /// `min(σ(source), σ(target))`
    pub bound: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge {} ({:.2}) is stronger than min({}, {}) = {:.2}",
            self.edge, self.strength, self.source, self.target, self.bound
        )
    }
}

/// Check every edge against `μ(u, v) <= min(σ(u), σ(v))`.
///
/// Violations are reported in edge order. An empty result means the graph is
/// valid; a graph without edges is trivially valid. The first edge that names
/// a vertex missing from `vertices` fails the whole check.
pub fn validate(
    vertices: &BTreeMap<String, f64>,
    edges: &[Edge],
) -> Result<Vec<Violation>, GraphError> {
    let mut violations = Vec::new();

    for (index, edge) in edges.iter().enumerate() {
        let existence = |vertex: &str| {
            vertices
                .get(vertex)
                .copied()
                .ok_or_else(|| GraphError::MissingVertex {
                    edge: edge.id(),
                    vertex: vertex.to_string(),
                })
        };

        let bound = existence(&edge.source)?.min(existence(&edge.target)?);
        if edge.strength > bound {
            violations.push(Violation {
                index,
                edge: edge.id(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                strength: edge.strength,
                bound,
            });
        }
    }

    debug!(
        vertices = vertices.len(),
        edges = edges.len(),
        violations = violations.len(),
        "validated fuzzy graph"
    );

    Ok(violations)
}

/// A fuzzy graph: existence degrees per vertex plus weighted edges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuzzyGraph {
    #[serde(default)]
    pub vertices: BTreeMap<String, f64>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FuzzyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three-vertex graph the explorer starts with
    pub fn demo() -> Self {
        Self::new()
            .with_vertex("A", 0.9)
            .with_vertex("B", 0.8)
            .with_vertex("C", 1.0)
            .with_edge("A", "B", 0.7)
            .with_edge("B", "C", 0.6)
            .with_edge("A", "C", 0.5)
    }

    /// Build the complete fuzzy graph over `vertices`: every pair is joined
    /// with the strongest edge the rule allows.
    pub fn complete(vertices: BTreeMap<String, f64>) -> Self {
        let mut edges = Vec::new();
        for (i, (u, su)) in vertices.iter().enumerate() {
            for (v, sv) in vertices.iter().skip(i + 1) {
                edges.push(Edge::new(u.as_str(), v.as_str(), su.min(*sv)));
            }
        }

        Self { vertices, edges }
    }

    pub fn with_vertex(mut self, id: impl Into<String>, existence: f64) -> Self {
        self.add_vertex(id, existence);
        self
    }

    pub fn with_edge(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        strength: f64,
    ) -> Self {
        self.add_edge(source, target, strength);
        self
    }

    /// Insert or overwrite a vertex
    pub fn add_vertex(&mut self, id: impl Into<String>, existence: f64) {
        self.vertices.insert(id.into(), existence);
    }

    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        strength: f64,
    ) {
        self.edges.push(Edge::new(source, target, strength));
    }

    pub fn existence(&self, id: &str) -> Option<f64> {
        self.vertices.get(id).copied()
    }

    /// Vertices as owned records, in identifier order
    pub fn vertex_list(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .map(|(id, existence)| Vertex::new(id.as_str(), *existence))
            .collect()
    }

    /// Strength of the first edge joining `a` and `b`
    pub fn edge_strength(&self, a: &str, b: &str) -> Option<f64> {
        self.edges
            .iter()
            .find(|e| e.connects(a, b))
            .map(|e| e.strength)
    }

    pub fn validate(&self) -> Result<Vec<Violation>, GraphError> {
        validate(&self.vertices, &self.edges)
    }

    pub fn is_valid(&self) -> Result<bool, GraphError> {
        Ok(self.validate()?.is_empty())
    }

    /// Order: the sum of all vertex existence degrees
    pub fn order(&self) -> f64 {
        self.vertices.values().sum()
    }

    /// Size: the sum of all edge strengths
    pub fn size(&self) -> f64 {
        self.edges.iter().map(|e| e.strength).sum()
    }

    /// Strength of a path: its weakest link.
    ///
    /// Every consecutive pair must be joined by an edge of positive strength.
    pub fn path_strength(&self, path: &[&str]) -> Result<f64, GraphError> {
        if path.len() < 2 {
            return Err(GraphError::InvalidPath(format!(
                "a path needs at least two vertices, got {}",
                path.len()
            )));
        }

        for vertex in path {
            if !self.vertices.contains_key(*vertex) {
                return Err(GraphError::UnknownVertex((*vertex).to_string()));
            }
        }

        path.windows(2).try_fold(f64::INFINITY, |weakest, step| {
            match self.edge_strength(step[0], step[1]) {
                Some(mu) if mu > 0.0 => Ok(weakest.min(mu)),
                _ => Err(GraphError::InvalidPath(format!(
                    "no edge between {} and {}",
                    step[0], step[1]
                ))),
            }
        })
    }

    /// Strength of connectedness between two vertices: the strongest path,
    /// where each path counts only as much as its weakest edge.
    ///
    /// Returns `None` when the vertices are not joined by any path of
    /// positive strength, or when `a == b`.
    pub fn strength_of_connectedness(&self, a: &str, b: &str) -> Result<Option<f64>, GraphError> {
        for vertex in [a, b] {
            if !self.vertices.contains_key(vertex) {
                return Err(GraphError::UnknownVertex(vertex.to_string()));
            }
        }
        if a == b {
            return Ok(None);
        }

        // Widest-path variant of Dijkstra: settle the vertex with the best
        // bottleneck reached so far, then relax its neighbours.
        let mut best: HashMap<&str, f64> = HashMap::from([(a, f64::INFINITY)]);
        let mut settled: HashSet<&str> = HashSet::new();

        loop {
            let next = best
                .iter()
                .filter(|(v, _)| !settled.contains(*v))
                .max_by(|x, y| x.1.total_cmp(y.1))
                .map(|(v, w)| (*v, *w));

            let Some((current, width)) = next else {
                return Ok(None);
            };
            if current == b {
                return Ok(Some(width));
            }
            settled.insert(current);

            for edge in &self.edges {
                if edge.strength <= 0.0 {
                    continue;
                }
                let neighbour = if edge.source == current {
                    edge.target.as_str()
                } else if edge.target == current {
                    edge.source.as_str()
                } else {
                    continue;
                };
                if settled.contains(neighbour) || !self.vertices.contains_key(neighbour) {
                    continue;
                }

                let candidate = width.min(edge.strength);
                let entry = best.entry(neighbour).or_insert(f64::NEG_INFINITY);
                if candidate > *entry {
                    *entry = candidate;
                }
            }
        }
    }

    /// Complete: every pair of distinct vertices is as strongly connected as
    /// the rule allows, `μ(u, v) = min(σ(u), σ(v))`.
    pub fn is_complete(&self) -> bool {
        let ids: Vec<&String> = self.vertices.keys().collect();
        ids.iter().enumerate().all(|(i, u)| {
            ids[i + 1..].iter().all(|v| {
                let bound = self.vertices[*u].min(self.vertices[*v]);
                self.edge_strength(u, v) == Some(bound)
            })
        })
    }

    /// Whether every vertex and edge of `self` appears in `other` with a
    /// degree no greater than the one it has there.
    pub fn is_subgraph_of(&self, other: &FuzzyGraph) -> bool {
        let vertices_fit = self
            .vertices
            .iter()
            .all(|(id, sigma)| other.existence(id).is_some_and(|outer| *sigma <= outer));

        let edges_fit = self.edges.iter().all(|edge| {
            other
                .edge_strength(&edge.source, &edge.target)
                .is_some_and(|outer| edge.strength <= outer)
        });

        vertices_fit && edges_fit
    }
}
