use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::graph::{EdgeBetweenness, EdgeKey, Graph, NodeKey};

/// Shortest-path bookkeeping for one node discovered in a traversal.
#[derive(Debug)]
struct LevelRecord<N> {
    /// Number of shortest paths from the root.
    paths: f64,
    /// Each parent one level up, with the parent's own path count.
    parents: Vec<(N, f64)>,
}

/// One BFS level: nodes in discovery order with their records.
type Frontier<N> = Vec<(N, LevelRecord<N>)>;

/// An edge with its betweenness score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEdge<N> {
    pub edge: EdgeKey<N>,
    pub betweenness: f64,
}

/// Expand level by level from `root` until a frontier comes up empty.
///
/// A node joins the next frontier only if it is neither in an earlier level
/// nor in the current one, so first discovery is at shortest distance. Its
/// path count is the sum over every current-level neighbor that reaches it.
fn build_frontiers<N: NodeKey>(graph: &Graph<N>, root: &N) -> Result<Vec<Frontier<N>>> {
    let mut visited: HashSet<N> = HashSet::new();
    let mut frontiers: Vec<Frontier<N>> = Vec::new();
    let mut current: Frontier<N> = vec![(
        root.clone(),
        LevelRecord {
            paths: 1.0,
            parents: Vec::new(),
        },
    )];

    while !current.is_empty() {
        for (node, _) in &current {
            visited.insert(node.clone());
        }

        let mut next: Frontier<N> = Vec::new();
        let mut slots: HashMap<N, usize> = HashMap::new();

        for (node, record) in &current {
            for neighbor in graph.neighbors(node)? {
                if visited.contains(neighbor) {
                    continue;
                }
                let slot = *slots.entry(neighbor.clone()).or_insert_with(|| {
                    next.push((
                        neighbor.clone(),
                        LevelRecord {
                            paths: 0.0,
                            parents: Vec::new(),
                        },
                    ));
                    next.len() - 1
                });
                let child = &mut next[slot].1;
                child.paths += record.paths;
                child.parents.push((node.clone(), record.paths));
            }
        }

        frontiers.push(current);
        current = next;
    }

    Ok(frontiers)
}

/// Run one root's traversal and hand every per-edge contribution to `sink`.
///
/// Frontiers are unwound deepest first. A node's weight is 1 plus what its
/// children passed up; it splits that weight across its parents in
/// proportion to their path counts. Each share is halved on the edge since
/// the full root sweep reaches every pair from both ends.
fn accumulate_root<N, F>(graph: &Graph<N>, root: &N, mut sink: F) -> Result<()>
where
    N: NodeKey,
    F: FnMut(EdgeKey<N>, f64),
{
    let frontiers = build_frontiers(graph, root)?;
    trace!("betweenness root {:?}: {} levels", root, frontiers.len());

    let mut incoming: HashMap<N, f64> = HashMap::new();
    for frontier in frontiers.iter().rev() {
        let mut outgoing: HashMap<N, f64> = HashMap::new();
        for (node, record) in frontier {
            let weight = 1.0 + incoming.get(node).copied().unwrap_or(0.0);
            for (parent, parent_paths) in &record.parents {
                let share = weight * parent_paths / record.paths;
                *outgoing.entry(parent.clone()).or_insert(0.0) += share;
                sink(EdgeKey::from_refs(node, parent), share / 2.0);
            }
        }
        incoming = outgoing;
    }

    Ok(())
}

fn merge_into<N: NodeKey>(target: &mut EdgeBetweenness<N>, source: EdgeBetweenness<N>) {
    for (edge, value) in source {
        *target.entry(edge).or_insert(0.0) += value;
    }
}

/// Sum of every root's contributions, keyed only by edges actually reached.
fn sweep<N: NodeKey>(graph: &Graph<N>) -> Result<EdgeBetweenness<N>> {
    let mut sums: EdgeBetweenness<N> = HashMap::new();
    for root in graph.nodes() {
        accumulate_root(graph, root, |edge, value| {
            *sums.entry(edge).or_insert(0.0) += value;
        })?;
    }
    Ok(sums)
}

/// Add every edge's Girvan–Newman betweenness into a caller-owned accumulator.
///
/// Each node is used once as a traversal root. The accumulator must already
/// hold an entry (normally zero) for every edge of `graph`; reaching an edge
/// with no entry fails with `Error::UnregisteredEdge` and leaves the
/// accumulator untouched. Entries for edges not in the graph are left as-is.
pub fn calculate_betweenness<N: NodeKey>(
    graph: &Graph<N>,
    accumulator: &mut EdgeBetweenness<N>,
) -> Result<()> {
    let sums = sweep(graph)?;
    if let Some(edge) = sums.keys().find(|edge| !accumulator.contains_key(*edge)) {
        return Err(Error::unregistered_edge(edge));
    }
    debug!(
        "betweenness: {} roots, {} edges accumulated",
        graph.node_count(),
        sums.len()
    );
    merge_into(accumulator, sums);
    Ok(())
}

/// Edge betweenness with an engine-owned accumulator.
///
/// Every edge of the graph is present in the result, starting from zero.
pub fn edge_betweenness<N: NodeKey>(graph: &Graph<N>) -> Result<EdgeBetweenness<N>> {
    let mut result = graph.zeroed_betweenness();
    merge_into(&mut result, sweep(graph)?);
    debug!(
        "betweenness: {} roots, {} edges",
        graph.node_count(),
        result.len()
    );
    Ok(result)
}

/// `edge_betweenness`, with root traversals spread over the rayon pool.
///
/// Each worker folds into its own map; maps are summed at the end, so no
/// accumulator cell is shared between threads.
pub fn par_edge_betweenness<N>(graph: &Graph<N>) -> Result<EdgeBetweenness<N>>
where
    N: NodeKey + Send + Sync,
{
    let sums = graph
        .nodes()
        .par_iter()
        .try_fold(HashMap::new, |mut acc: EdgeBetweenness<N>, root| {
            accumulate_root(graph, root, |edge, value| {
                *acc.entry(edge).or_insert(0.0) += value;
            })?;
            Ok::<_, Error>(acc)
        })
        .try_reduce(HashMap::new, |mut a, b| {
            merge_into(&mut a, b);
            Ok(a)
        })?;

    let mut result = graph.zeroed_betweenness();
    merge_into(&mut result, sums);
    debug!(
        "betweenness (parallel, {} threads): {} roots, {} edges",
        rayon::current_num_threads(),
        graph.node_count(),
        result.len()
    );
    Ok(result)
}

/// Pick the sequential or parallel sweep according to `config`.
pub fn edge_betweenness_with<N>(graph: &Graph<N>, config: &EngineConfig) -> Result<EdgeBetweenness<N>>
where
    N: NodeKey + Send + Sync,
{
    config.validate()?;
    if config.use_parallel(graph.node_count()) {
        par_edge_betweenness(graph)
    } else {
        edge_betweenness(graph)
    }
}

/// Edges by descending betweenness.
///
/// Ties are broken by ascending edge key. If `top_n` is 0, returns all edges.
pub fn rank_edges<N: NodeKey>(betweenness: &EdgeBetweenness<N>, top_n: usize) -> Vec<RankedEdge<N>> {
    let mut ranked: Vec<RankedEdge<N>> = betweenness
        .iter()
        .map(|(edge, &value)| RankedEdge {
            edge: edge.clone(),
            betweenness: value,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.betweenness
            .total_cmp(&a.betweenness)
            .then_with(|| a.edge.cmp(&b.edge))
    });

    if top_n > 0 && top_n < ranked.len() {
        ranked.truncate(top_n);
    }

    ranked
}
