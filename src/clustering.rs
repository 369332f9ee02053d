//! Threshold clustering over a weighted similarity graph
//!
//! Picture fuzzy maximum spanning tree (PFMST) clustering in miniature:
//! build the strongest skeleton connecting every object, then cut every
//! link weaker than a similarity threshold `α`. What stays connected forms
//! a cluster.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Range offered by the interactive threshold slider
pub const THRESHOLD_RANGE: RangeInclusive<f64> = 0.5..=0.9;

/// Threshold shown before the user moves the slider
pub const DEFAULT_THRESHOLD: f64 = 0.65;

/// Maximum spanning tree of the ten-car similarity example
pub const CAR_SIMILARITY_EDGES: [(&str, &str, f64); 9] = [
    ("G9", "G4", 0.87),
    ("G7", "G2", 0.83),
    ("G6", "G1", 0.82),
    ("G7", "G3", 0.81),
    ("G7", "G8", 0.74),
    ("G10", "G5", 0.76),
    ("G3", "G9", 0.64),
    ("G8", "G10", 0.69),
    ("G1", "G4", 0.64),
];

/// An undirected similarity link between two objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl WeightedEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

/// The static car dataset as owned edges
pub fn car_similarity_edges() -> Vec<WeightedEdge> {
    CAR_SIMILARITY_EDGES
        .iter()
        .map(|(u, v, w)| WeightedEdge::new(*u, *v, *w))
        .collect()
}

/// Result of splitting an edge list at a threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub threshold: f64,
    /// Edges with `weight >= threshold`, in input order
    pub kept: Vec<WeightedEdge>,
    /// Edges with `weight < threshold`, in input order
    pub cut: Vec<WeightedEdge>,
    /// Every endpoint of every input edge, kept or cut
    pub nodes: BTreeSet<String>,
}

/// Split `edges` into kept (`weight >= threshold`) and cut edges.
///
/// The node set covers both halves so that objects whose links were all cut
/// still show up as isolated clusters. A NaN threshold keeps nothing.
pub fn partition(edges: &[WeightedEdge], threshold: f64) -> Partition {
    let (kept, cut): (Vec<WeightedEdge>, Vec<WeightedEdge>) =
        edges.iter().cloned().partition(|e| e.weight >= threshold);

    let nodes = edges
        .iter()
        .flat_map(|e| [e.source.clone(), e.target.clone()])
        .collect();

    debug!(
        threshold,
        kept = kept.len(),
        cut = cut.len(),
        "partitioned similarity edges"
    );

    Partition {
        threshold,
        kept,
        cut,
        nodes,
    }
}

/// Disjoint-set forest over `0..n` with path compression and union by size
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = i;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `i` and `j`; false if they were already joined
    fn union(&mut self, i: usize, j: usize) -> bool {
        let (pi, pj) = (self.find(i), self.find(j));
        if pi == pj {
            return false;
        }
        let (small, large) = if self.size[pi] < self.size[pj] {
            (pi, pj)
        } else {
            (pj, pi)
        };
        self.parent[small] = large;
        self.size[large] += self.size[small];
        true
    }
}

fn index_nodes<'a>(nodes: impl Iterator<Item = &'a String>) -> HashMap<&'a str, usize> {
    let mut index = HashMap::new();
    for node in nodes {
        let next = index.len();
        index.entry(node.as_str()).or_insert(next);
    }
    index
}

impl Partition {
    /// Connected components of the kept edges.
    ///
    /// Every node appears in exactly one cluster. Members are sorted, and
    /// clusters are ordered by their first member.
    pub fn clusters(&self) -> Vec<Vec<String>> {
        let index = index_nodes(self.nodes.iter());
        let mut sets = DisjointSet::new(index.len());

        for edge in &self.kept {
            if let (Some(&i), Some(&j)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) {
                sets.union(i, j);
            }
        }

        let mut components: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
        for node in &self.nodes {
            let root = sets.find(index[node.as_str()]);
            components.entry(root).or_default().insert(node.clone());
        }

        let mut clusters: Vec<Vec<String>> = components
            .into_values()
            .map(|members| members.into_iter().collect())
            .collect();
        clusters.sort();
        clusters
    }
}

/// Maximum spanning forest by Kruskal's algorithm.
///
/// Edges are taken strongest first; among equal weights the earlier edge in
/// the input wins. Edges that would close a cycle are skipped.
pub fn maximum_spanning_forest(edges: &[WeightedEdge]) -> Vec<WeightedEdge> {
    let index = index_nodes(edges.iter().flat_map(|e| [&e.source, &e.target]));
    let mut sets = DisjointSet::new(index.len());

    let mut by_weight: Vec<&WeightedEdge> = edges.iter().collect();
    by_weight.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    by_weight
        .into_iter()
        .filter(|e| sets.union(index[e.source.as_str()], index[e.target.as_str()]))
        .cloned()
        .collect()
}
