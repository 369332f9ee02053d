//! Web shell for fuzzy-explorer
//!
//! Serves a single interactive page plus a JSON API covering every demo:
//! - Membership of a height in the fuzzy set of tall people
//! - Fuzzy graph validation against `μ(u, v) <= min(σ(u), σ(v))`
//! - Threshold clustering of the car similarity tree
//! - Picture fuzzy composition with dependent slider caps
//! - Diagrams rendered by Graphviz, or installation instructions without it

pub mod graph;
pub mod routes;
pub mod server;

pub use graph::GraphData;
pub use server::{AppState, ServerConfig, app, start_server};
