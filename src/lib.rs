//! # fuzzy-explorer - Fuzzy Graphs and Picture Fuzzy Sets
//!
//! An interactive explorer for the basic machinery of fuzzy graph theory and
//! picture fuzzy sets, usable from the command line or a local web page.
//!
//! ## Overview
//!
//! Four independent computations sit behind both shells:
//!
//! 1. **Membership** - how "tall" a height is, as a degree in `[0, 1]`
//! 2. **Fuzzy graph validation** - every edge must obey
//!    `μ(u, v) <= min(σ(u), σ(v))`
//! 3. **Threshold clustering** - cut every similarity link below `α` and see
//!    which objects stay connected
//! 4. **Picture fuzzy composition** - support, opposition and abstention
//!    determine the refusal degree
//!
//! ## Usage
//!
//! ```bash
//! # Membership of a 175 cm person in the fuzzy set of tall people
//! fuzzy-explorer membership 175
//!
//! # Validate a fuzzy graph given on the command line
//! fuzzy-explorer validate --vertex A=0.9 --vertex B=0.8 --edge A:B=0.95
//!
//! # Cluster the car example at a similarity threshold
//! fuzzy-explorer cluster --threshold 0.7
//!
//! # Complete a picture fuzzy value
//! fuzzy-explorer compose --support 0.5 --opposition 0.2 --abstention 0.1
//!
//! # Start the web explorer
//! fuzzy-explorer serve
//! ```
//!
//! ## Example
//!
//! ```
//! use fuzzy_explorer::{FuzzyGraph, derive, partition, car_similarity_edges, score};
//!
//! assert_eq!(score(180.0), 0.8);
//!
//! let graph = FuzzyGraph::demo().with_edge("A", "B", 0.95);
//! assert_eq!(graph.validate().unwrap().len(), 1);
//!
//! let clusters = partition(&car_similarity_edges(), 0.65).clusters();
//! assert_eq!(clusters.len(), 3);
//!
//! assert!(derive(0.6, 0.5, 0.0).is_err());
//! ```

pub mod clustering;
pub mod composition;
pub mod config;
pub mod fuzzy_graph;
pub mod membership;
pub mod render;
pub mod report;
pub mod web;

pub use clustering::{
    CAR_SIMILARITY_EDGES, DEFAULT_THRESHOLD, Partition, THRESHOLD_RANGE, WeightedEdge,
    car_similarity_edges, maximum_spanning_forest, partition,
};
pub use composition::{
    Component, CompositionBuilder, CompositionError, PictureFuzzyValue, derive, hesitation,
};
pub use config::{
    ClusteringConfig, ConfigError, ExplorerConfig, RendererConfig, WebConfig, discover_config,
    load_config, parse_config,
};
pub use fuzzy_graph::{Edge, FuzzyGraph, GraphError, Vertex, Violation, validate};
pub use membership::{DEFAULT_HEIGHT, HEIGHT_RANGE, score};
pub use render::{
    Diagram, FallbackInstructionsRenderer, GraphRenderer, NativeRenderer, RenderError, Rendered,
    detect_renderer, render_or_fallback,
};
pub use report::{
    ClusteringReport, CompositionReport, Connectedness, MembershipReport, ValidationReport,
    write_clustering, write_composition, write_forest, write_json, write_membership,
    write_validation,
};
