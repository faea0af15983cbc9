//! gn-community-core: structural primitives for Girvan–Newman community detection.
//!
//! A pure Rust library over an undirected, unweighted adjacency graph that
//! provides edge betweenness, connected-component partitioning and Newman
//! modularity. No I/O: callers build the graph and drive any iterative
//! edge-removal loop themselves.

mod betweenness;
mod components;
mod config;
mod error;
mod graph;
mod modularity;

pub use betweenness::{
    calculate_betweenness, edge_betweenness, edge_betweenness_with, par_edge_betweenness,
    rank_edges, RankedEdge,
};
pub use components::find_communities;
pub use config::{EngineConfig, DEFAULT_PARALLEL, DEFAULT_PARALLEL_MIN_NODES};
pub use error::{Error, Result};
pub use graph::{
    Community, DegreeTable, EdgeBetweenness, EdgeKey, EdgeSet, Graph, NodeId, NodeKey,
};
pub use modularity::{calculate_modularity, module_score, partition_modularity};
