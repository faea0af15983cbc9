//! Newman modularity of a candidate partition.
//!
//! ```text
//! Q = (1/2m) × Σ_c Σ_{i,j ∈ c} [A_ij - k_i k_j / 2m]
//! ```
//!
//! The inner sum runs over ordered pairs drawn with repetition, so i = j is
//! included (with A_ii = 0 since the graph has no self-loops).

use log::debug;

use crate::error::{Error, Result};
use crate::graph::{DegreeTable, EdgeKey, EdgeSet, Graph, NodeKey};

/// Modularity Q of `modules`.
///
/// `degree_table` and `total_edge_count` must describe the full graph, not a
/// subgraph. Fails with `DegenerateModularity` when `total_edge_count` is 0.
pub fn calculate_modularity<N: NodeKey>(
    modules: &[Vec<N>],
    degree_table: &DegreeTable<N>,
    edges: &EdgeSet<N>,
    total_edge_count: usize,
) -> Result<f64> {
    if total_edge_count == 0 {
        return Err(Error::DegenerateModularity);
    }

    let mut total = 0.0;
    for module in modules {
        total += module_score(module, degree_table, edges, total_edge_count)?;
    }

    let q = total / (2.0 * total_edge_count as f64);
    debug!(
        "modularity: {} modules, m = {}, Q = {:.6}",
        modules.len(),
        total_edge_count,
        q
    );
    Ok(q)
}

/// Un-normalized contribution of a single module to Q.
///
/// Summing this over a partition and dividing by `2 * total_edge_count`
/// gives `calculate_modularity`.
pub fn module_score<N: NodeKey>(
    module: &[N],
    degree_table: &DegreeTable<N>,
    edges: &EdgeSet<N>,
    total_edge_count: usize,
) -> Result<f64> {
    if total_edge_count == 0 {
        return Err(Error::DegenerateModularity);
    }
    let two_m = 2.0 * total_edge_count as f64;

    let degrees = module
        .iter()
        .map(|node| {
            degree_table
                .get(node)
                .map(|&d| d as f64)
                .ok_or_else(|| Error::missing_degree(node))
        })
        .collect::<Result<Vec<f64>>>()?;

    let mut score = 0.0;
    for (i, node_i) in module.iter().enumerate() {
        for (j, node_j) in module.iter().enumerate() {
            let a_ij = if node_i != node_j && edges.contains(&EdgeKey::from_refs(node_i, node_j)) {
                1.0
            } else {
                0.0
            };
            score += a_ij - degrees[i] * degrees[j] / two_m;
        }
    }

    Ok(score)
}

/// Modularity of `modules` against the statistics of the full `graph`.
pub fn partition_modularity<N: NodeKey>(graph: &Graph<N>, modules: &[Vec<N>]) -> Result<f64> {
    let edges = graph.edge_keys();
    calculate_modularity(modules, &graph.degree_table(), &edges, edges.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::find_communities;
    use std::collections::HashMap;

    const EPS: f64 = 1e-9;

    fn triangle_stats() -> (DegreeTable<&'static str>, EdgeSet<&'static str>) {
        let degrees: DegreeTable<&str> = HashMap::from([("A", 2), ("B", 2), ("C", 2)]);
        let edges: EdgeSet<&str> = [
            EdgeKey::new("A", "B"),
            EdgeKey::new("A", "C"),
            EdgeKey::new("B", "C"),
        ]
        .into_iter()
        .collect();
        (degrees, edges)
    }

    /// Two triangles {A,B,C} and {D,E,F} joined by C–D.
    fn two_triangles() -> Graph<&'static str> {
        Graph::from_edges(vec![
            ("A", "B"),
            ("A", "C"),
            ("B", "C"),
            ("C", "D"),
            ("D", "E"),
            ("D", "F"),
            ("E", "F"),
        ])
    }

    #[test]
    fn test_triangle_single_module_is_zero() {
        let (degrees, edges) = triangle_stats();
        let q = calculate_modularity(&[vec!["A", "B", "C"]], &degrees, &edges, 3).unwrap();
        assert!(q.abs() < EPS, "got {q}");
    }

    #[test]
    fn test_singletons_negative() {
        // Each singleton contributes -k_i^2 / 2m: 3 × (-4/6) = -2, Q = -2/6.
        let (degrees, edges) = triangle_stats();
        let modules = vec![vec!["A"], vec!["B"], vec!["C"]];
        let q = calculate_modularity(&modules, &degrees, &edges, 3).unwrap();
        assert!((q + 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_two_triangles_split() {
        // m = 7, each side: 6 internal ordered pairs, degree sum 7.
        // Q = 2 × (6 - 49/14) / 14 = 5/14.
        let g = two_triangles();
        let modules = vec![vec!["A", "B", "C"], vec!["D", "E", "F"]];
        let q = partition_modularity(&g, &modules).unwrap();
        assert!((q - 5.0 / 14.0).abs() < EPS, "got {q}");

        let whole = partition_modularity(&g, &[vec!["A", "B", "C", "D", "E", "F"]]).unwrap();
        assert!(whole.abs() < EPS);
        assert!(q > whole);
    }

    #[test]
    fn test_module_score_sums_to_total() {
        let g = two_triangles();
        let degrees = g.degree_table();
        let edges = g.edge_keys();
        let m = edges.len();
        let modules = vec![vec!["A", "B"], vec!["C", "D"], vec!["E", "F"]];

        let parts: f64 = modules
            .iter()
            .map(|module| module_score(module, &degrees, &edges, m).unwrap())
            .sum();
        let q = calculate_modularity(&modules, &degrees, &edges, m).unwrap();
        assert!((parts / (2.0 * m as f64) - q).abs() < EPS);
    }

    #[test]
    fn test_components_of_disconnected_graph() {
        // Two disjoint triangles: Q = 2 × (6 - 36/12) / 12 = 0.5.
        let g = Graph::from_edges(vec![
            (0u64, 1),
            (1, 2),
            (0, 2),
            (3, 4),
            (4, 5),
            (3, 5),
        ]);
        let communities = find_communities(&g).unwrap();
        let q = partition_modularity(&g, &communities).unwrap();
        assert!((q - 0.5).abs() < EPS);
    }

    #[test]
    fn test_single_community_in_range() {
        let g = two_triangles();
        let q = partition_modularity(&g, &find_communities(&g).unwrap()).unwrap();
        assert!(q > -1.0 && q <= 1.0);
    }

    #[test]
    fn test_empty_partition_is_zero() {
        let (degrees, edges) = triangle_stats();
        let q = calculate_modularity::<&str>(&[], &degrees, &edges, 3).unwrap();
        assert_eq!(q, 0.0);
    }

    #[test]
    fn test_zero_edges_degenerate() {
        let (degrees, edges) = triangle_stats();
        assert_eq!(
            calculate_modularity(&[vec!["A"]], &degrees, &edges, 0),
            Err(Error::DegenerateModularity)
        );
        assert_eq!(
            module_score(&["A"], &degrees, &edges, 0),
            Err(Error::DegenerateModularity)
        );

        let mut g: Graph<u64> = Graph::new();
        g.add_node(1);
        assert_eq!(
            partition_modularity(&g, &[vec![1]]),
            Err(Error::DegenerateModularity)
        );
    }

    #[test]
    fn test_missing_degree() {
        let (degrees, edges) = triangle_stats();
        let err = calculate_modularity(&[vec!["A", "Z"]], &degrees, &edges, 3).unwrap_err();
        assert!(matches!(err, Error::MissingDegree { .. }));
    }
}
