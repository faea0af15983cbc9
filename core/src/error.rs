use std::fmt::Debug;

use thiserror::Error;

/// Result alias for `gn-community-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the betweenness, component and modularity routines.
///
/// Node and edge identifiers are carried in their `Debug` rendering so the
/// error type does not depend on the graph's node type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A caller-supplied accumulator has no entry for an edge that was reached.
    #[error("edge {edge} is not registered in the betweenness accumulator")]
    UnregisteredEdge { edge: String },

    /// An adjacency list names a node that has no entry of its own.
    #[error("node {node} is referenced as a neighbor but not present in the graph")]
    UnknownNode { node: String },

    /// Modularity normalizes by 2m; undefined for m = 0.
    #[error("modularity is undefined for a graph with zero edges")]
    DegenerateModularity,

    /// A module member has no entry in the degree table.
    #[error("node {node} has no entry in the degree table")]
    MissingDegree { node: String },

    #[error("invalid config '{name}': {message}")]
    InvalidConfig {
        name: &'static str,
        message: &'static str,
    },
}

impl Error {
    pub(crate) fn unknown_node<N: Debug>(node: &N) -> Self {
        Error::UnknownNode {
            node: format!("{node:?}"),
        }
    }

    pub(crate) fn unregistered_edge<E: Debug>(edge: &E) -> Self {
        Error::UnregisteredEdge {
            edge: format!("{edge:?}"),
        }
    }

    pub(crate) fn missing_degree<N: Debug>(node: &N) -> Self {
        Error::MissingDegree {
            node: format!("{node:?}"),
        }
    }
}
