use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::error::Result;
use crate::graph::{Community, Graph, NodeKey};

/// Split the graph into connected components.
///
/// Roots are taken in graph iteration order. Within a community, nodes are
/// listed in BFS discovery order starting from its root. A node is marked
/// visited when it is enqueued, so it is never queued twice.
pub fn find_communities<N: NodeKey>(graph: &Graph<N>) -> Result<Vec<Community<N>>> {
    let mut visited: HashSet<N> = HashSet::with_capacity(graph.node_count());
    let mut communities: Vec<Community<N>> = Vec::new();

    for root in graph.nodes() {
        if !visited.contains(root) {
            communities.push(explore_component(graph, root, &mut visited)?);
        }
    }

    debug!(
        "components: {} communities over {} nodes",
        communities.len(),
        graph.node_count()
    );
    Ok(communities)
}

fn explore_component<N: NodeKey>(
    graph: &Graph<N>,
    root: &N,
    visited: &mut HashSet<N>,
) -> Result<Community<N>> {
    let mut community = vec![root.clone()];
    let mut queue: VecDeque<N> = VecDeque::new();

    visited.insert(root.clone());
    queue.push_back(root.clone());

    while let Some(node) = queue.pop_front() {
        for child in graph.neighbors(&node)? {
            if visited.insert(child.clone()) {
                community.push(child.clone());
                queue.push_back(child.clone());
            }
        }
    }

    Ok(community)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    fn as_sets<N: NodeKey>(communities: &[Community<N>]) -> Vec<Vec<N>> {
        let mut sets: Vec<Vec<N>> = communities
            .iter()
            .map(|c| {
                let mut members = c.clone();
                members.sort();
                members
            })
            .collect();
        sets.sort();
        sets
    }

    #[test]
    fn test_two_pairs() {
        let g = Graph::from_edges(vec![("A", "B"), ("C", "D")]);
        let communities = find_communities(&g).unwrap();
        assert_eq!(as_sets(&communities), vec![vec!["A", "B"], vec!["C", "D"]]);
    }

    #[test]
    fn test_two_pairs_any_node_order() {
        let g = Graph::from_adjacency(vec![
            ("D", vec!["C"]),
            ("A", vec!["B"]),
            ("C", vec!["D"]),
            ("B", vec!["A"]),
        ]);
        let communities = find_communities(&g).unwrap();
        assert_eq!(communities.len(), 2);
        // Discovery follows node order: D's component first.
        assert_eq!(communities[0], vec!["D", "C"]);
        assert_eq!(communities[1], vec!["A", "B"]);
    }

    #[test]
    fn test_bfs_order_within_community() {
        // 0 - 1 - 3
        //  \
        //   2 - 4
        let g = Graph::from_edges(vec![(0u64, 1), (0, 2), (1, 3), (2, 4)]);
        let communities = find_communities(&g).unwrap();
        assert_eq!(communities, vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn test_cycle_single_community() {
        let g = Graph::from_edges((0u64..5).map(|i| (i, (i + 1) % 5)));
        let communities = find_communities(&g).unwrap();
        assert_eq!(communities.len(), 1);
        assert_eq!(communities[0].len(), 5);
    }

    #[test]
    fn test_isolated_nodes_are_singletons() {
        let mut g = Graph::from_edges(vec![(1u64, 2)]);
        g.add_node(7);
        g.add_node(8);
        let communities = find_communities(&g).unwrap();
        assert_eq!(communities, vec![vec![1, 2], vec![7], vec![8]]);
    }

    #[test]
    fn test_empty_graph() {
        let g: Graph = Graph::new();
        assert!(find_communities(&g).unwrap().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let g = Graph::from_edges(vec![(0u64, 1), (2, 3), (3, 4), (5, 5)]);
        let first = find_communities(&g).unwrap();
        let second = find_communities(&g).unwrap();
        assert_eq!(as_sets(&first), as_sets(&second));
    }

    #[test]
    fn test_unknown_neighbor() {
        let g = Graph::from_adjacency(vec![(0u64, vec![1]), (1, vec![0, 2])]);
        assert!(matches!(
            find_communities(&g),
            Err(Error::UnknownNode { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_exact_partition(edges in proptest::collection::vec((0u64..15, 0u64..15), 0..25)) {
            let g = Graph::from_edges(edges.iter().copied());
            let communities = find_communities(&g).unwrap();

            let mut seen = HashSet::new();
            for community in &communities {
                for node in community {
                    prop_assert!(seen.insert(*node), "node {} in two communities", node);
                }
            }
            prop_assert_eq!(seen.len(), g.node_count());

            // Every edge stays inside one community.
            for &(a, b) in &edges {
                let ca = communities.iter().position(|c| c.contains(&a));
                let cb = communities.iter().position(|c| c.contains(&b));
                prop_assert_eq!(ca, cb);
            }
        }
    }
}
