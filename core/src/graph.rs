use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default node identifier for generated and numbered graphs.
pub type NodeId = u64;

/// Anything usable as a node identifier.
///
/// `Ord` supplies the total order that canonicalizes undirected edges.
pub trait NodeKey: Clone + Eq + Hash + Ord + Debug {}

impl<T: Clone + Eq + Hash + Ord + Debug> NodeKey for T {}

/// Canonical identifier for an undirected edge: endpoints stored low, high.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey<N> {
    pub low: N,
    pub high: N,
}

impl<N: NodeKey> EdgeKey<N> {
    /// `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.
    pub fn new(a: N, b: N) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Build a key from borrowed endpoints, cloning only what is stored.
    pub fn from_refs(a: &N, b: &N) -> Self {
        if a <= b {
            Self { low: a.clone(), high: b.clone() }
        } else {
            Self { low: b.clone(), high: a.clone() }
        }
    }

    pub fn contains(&self, node: &N) -> bool {
        &self.low == node || &self.high == node
    }
}

/// Per-edge betweenness accumulator.
pub type EdgeBetweenness<N> = HashMap<EdgeKey<N>, f64>;

/// Set of canonical edge keys of a graph.
pub type EdgeSet<N> = HashSet<EdgeKey<N>>;

/// Node degree in the full graph.
pub type DegreeTable<N> = HashMap<N, usize>;

/// One connected group of nodes.
pub type Community<N> = Vec<N>;

/// Undirected, unweighted adjacency graph.
///
/// Nodes iterate in insertion order, so every traversal that walks
/// `nodes()` is deterministic for a given construction sequence.
#[derive(Debug, Clone)]
pub struct Graph<N = NodeId> {
    order: Vec<N>,
    adjacency: HashMap<N, Vec<N>>,
}

impl<N: NodeKey> Graph<N> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            adjacency: HashMap::new(),
        }
    }

    /// Pre-allocate for a known node count.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            order: Vec::with_capacity(node_count),
            adjacency: HashMap::with_capacity(node_count),
        }
    }

    /// Register a node with no neighbors. No-op if already present.
    pub fn add_node(&mut self, node: N) {
        if !self.adjacency.contains_key(&node) {
            self.order.push(node.clone());
            self.adjacency.insert(node, Vec::new());
        }
    }

    /// Add an undirected edge, registering both endpoints.
    ///
    /// Self-loops and repeated edges are ignored; returns whether the edge
    /// was new.
    pub fn add_edge(&mut self, a: N, b: N) -> bool {
        if a == b {
            self.add_node(a);
            return false;
        }
        self.add_node(a.clone());
        self.add_node(b.clone());

        let a_neighbors = self.adjacency.entry(a.clone()).or_default();
        if a_neighbors.contains(&b) {
            return false;
        }
        a_neighbors.push(b.clone());
        self.adjacency.entry(b).or_default().push(a);
        true
    }

    /// Bulk load from an iterator of endpoint pairs.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    /// Take an adjacency mapping verbatim, in the given node order.
    ///
    /// Nothing is checked: a neighbor without its own entry stays in the
    /// list and surfaces as `Error::UnknownNode` when an algorithm reaches it.
    pub fn from_adjacency<I>(adjacency: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<N>)>,
    {
        let mut graph = Self::new();
        for (node, neighbors) in adjacency {
            if !graph.adjacency.contains_key(&node) {
                graph.order.push(node.clone());
            }
            graph.adjacency.insert(node, neighbors);
        }
        graph
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[N] {
        &self.order
    }

    pub fn contains(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Neighbors of `node`, or `UnknownNode` if it has no entry.
    pub fn neighbors(&self, node: &N) -> Result<&[N]> {
        self.adjacency
            .get(node)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::unknown_node(node))
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_keys().len()
    }

    pub fn degree(&self, node: &N) -> Option<usize> {
        self.adjacency.get(node).map(|v| v.len())
    }

    /// Degree of every node in this graph.
    pub fn degree_table(&self) -> DegreeTable<N> {
        self.adjacency
            .iter()
            .map(|(node, neighbors)| (node.clone(), neighbors.len()))
            .collect()
    }

    /// Canonical keys of every edge listed in the adjacency.
    pub fn edge_keys(&self) -> EdgeSet<N> {
        let mut edges = HashSet::new();
        for (node, neighbors) in &self.adjacency {
            for neighbor in neighbors {
                if node != neighbor {
                    edges.insert(EdgeKey::from_refs(node, neighbor));
                }
            }
        }
        edges
    }

    /// An accumulator with a zero entry for every edge, ready for
    /// `calculate_betweenness`.
    pub fn zeroed_betweenness(&self) -> EdgeBetweenness<N> {
        self.edge_keys().into_iter().map(|key| (key, 0.0)).collect()
    }
}

impl<N: NodeKey> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}
