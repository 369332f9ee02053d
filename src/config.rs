//! Configuration file support for fuzzy-explorer
//!
//! This module handles parsing `.fuzzy-explorer.toml` configuration files
//! that replace the built-in demo data and tune the shells.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .fuzzy-explorer.toml
//!
//! [graph]
//! # Fuzzy graph shown by `validate`, `render graph` and the web page
//! vertices = { A = 0.9, B = 0.8, C = 1.0 }
//! edges = [
//!     { source = "A", target = "B", strength = 0.7 },
//!     { source = "B", target = "C", strength = 0.6 },
//! ]
//!
//! [clustering]
//! # Similarity threshold used when none is given on the command line
//! threshold = 0.65
//!
//! # Replaces the ten-car example dataset
//! edges = [{ source = "G9", target = "G4", weight = 0.87 }]
//!
//! [renderer]
//! # Graphviz executable probed at startup
//! graphviz_command = "dot"
//!
//! [server]
//! port = 3000
//! open_browser = true
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::clustering::{DEFAULT_THRESHOLD, WeightedEdge, car_similarity_edges};
use crate::fuzzy_graph::FuzzyGraph;
use crate::render::DEFAULT_GRAPHVIZ_COMMAND;

/// File names searched for, in order of preference
pub const CONFIG_FILE_NAMES: [&str; 2] = [".fuzzy-explorer.toml", "fuzzy-explorer.toml"];

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Clustering configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringConfig {
    /// Similarity threshold α
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Weighted edges to cluster (default: the ten-car example)
    #[serde(default)]
    pub edges: Option<Vec<WeightedEdge>>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            edges: None,
        }
    }
}

impl ClusteringConfig {
    /// Configured edges, or the static car dataset
    pub fn edges(&self) -> Vec<WeightedEdge> {
        self.edges.clone().unwrap_or_else(car_similarity_edges)
    }
}

/// Renderer configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Graphviz executable to probe and run
    #[serde(default = "default_graphviz_command")]
    pub graphviz_command: String,
}

fn default_graphviz_command() -> String {
    DEFAULT_GRAPHVIZ_COMMAND.to_string()
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            graphviz_command: default_graphviz_command(),
        }
    }
}

/// Web server configuration section (`[server]`)
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open a browser tab once the server is listening
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_open_browser() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            open_browser: default_open_browser(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ExplorerConfig {
    /// Fuzzy graph to explore (default: the A/B/C demo graph)
    #[serde(default)]
    pub graph: Option<FuzzyGraph>,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub server: WebConfig,
}

fn check_degree(what: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{} must be within [0, 1], got {}",
            what, value
        )))
    }
}

impl ExplorerConfig {
    /// Configured graph, or the demo graph
    pub fn graph(&self) -> FuzzyGraph {
        self.graph.clone().unwrap_or_else(FuzzyGraph::demo)
    }

    /// Reject degrees and weights outside `[0, 1]` and non-finite thresholds.
    ///
    /// Only ranges are checked; a graph breaking the fuzzy graph rule is
    /// legitimate input for the validator.
    pub fn check(&self) -> Result<(), ConfigError> {
        if let Some(graph) = &self.graph {
            for (id, sigma) in &graph.vertices {
                check_degree(&format!("existence of vertex {}", id), *sigma)?;
            }
            for edge in &graph.edges {
                check_degree(&format!("strength of edge {}", edge.id()), edge.strength)?;
            }
        }

        if let Some(edges) = &self.clustering.edges {
            for edge in edges {
                check_degree(
                    &format!("weight of edge {}-{}", edge.source, edge.target),
                    edge.weight,
                )?;
            }
        }

        if !self.clustering.threshold.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "clustering threshold must be finite, got {}",
                self.clustering.threshold
            )));
        }

        if self.renderer.graphviz_command.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "renderer.graphviz_command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse and check configuration text
pub fn parse_config(content: &str) -> Result<ExplorerConfig, ConfigError> {
    let config: ExplorerConfig = toml::from_str(content)?;
    config.check()?;
    Ok(config)
}

/// Load configuration from an explicitly named file.
///
/// A missing or unreadable file is an error.
pub fn load_config(path: &Path) -> Result<ExplorerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Search for `.fuzzy-explorer.toml` in `start_dir` and its parents.
///
/// Finding nothing yields the defaults.
pub fn discover_config(start_dir: &Path) -> Result<ExplorerConfig, ConfigError> {
    match find_config_file(start_dir) {
        Some(path) => load_config(&path),
        None => Ok(ExplorerConfig::default()),
    }
}

/// Find the config file by searching up the directory tree
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = start_path.to_path_buf();

    loop {
        for name in &CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert!(config.graph.is_none());
        assert_eq!(config.graph(), FuzzyGraph::demo());
        assert_eq!(config.clustering.threshold, 0.65);
        assert_eq!(config.clustering.edges().len(), 9);
        assert_eq!(config.renderer.graphviz_command, "dot");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.open_browser);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [graph]
            vertices = { A = 0.9, B = 0.8 }
            edges = [{ source = "A", target = "B", strength = 0.95 }]

            [clustering]
            threshold = 0.7
            edges = [
                { source = "X", target = "Y", weight = 0.8 },
                { source = "Y", target = "Z", weight = 0.6 },
            ]

            [renderer]
            graphviz_command = "/opt/graphviz/bin/dot"

            [server]
            port = 8080
            open_browser = false
        "#;

        let config = parse_config(toml).unwrap();
        let graph = config.graph();
        assert_eq!(graph.vertices.len(), 2);
        assert_eq!(graph.validate().unwrap().len(), 1);
        assert_eq!(config.clustering.threshold, 0.7);
        assert_eq!(config.clustering.edges().len(), 2);
        assert_eq!(config.renderer.graphviz_command, "/opt/graphviz/bin/dot");
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.open_browser);
    }

    #[test]
    fn test_out_of_range_degree_rejected() {
        let toml = r#"
            [graph]
            vertices = { A = 1.2 }
        "#;
        assert!(matches!(
            parse_config(toml),
            Err(ConfigError::InvalidValue(_))
        ));

        let toml = r#"
            [clustering]
            edges = [{ source = "X", target = "Y", weight = -0.1 }]
        "#;
        assert!(matches!(
            parse_config(toml),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            parse_config("[clustering]\nthreshold = \"high\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_find_config_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(".fuzzy-explorer.toml"),
            "[clustering]\nthreshold = 0.8\n",
        )
        .unwrap();

        let config = discover_config(&nested).unwrap();
        assert_eq!(config.clustering.threshold, 0.8);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(matches!(
            parse_config("[web]\nport = 8080\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".fuzzy-explorer.toml"),
            "[clustering]\nthreshold = 0.8\n",
        )
        .unwrap();

        let result = load_config(&dir.path().join("typo.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 4000);
    }
}
