use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gn_community_core::{EngineConfig, Graph, NodeId, RankedEdge};
use log::info;
use serde::{Deserialize, Serialize};

const DEFAULT_NODE_COUNT: u64 = 2_000;
const DEFAULT_TOP_EDGES: usize = 5;

#[derive(Parser, Debug)]
#[command(
    name = "gn-community-bench",
    about = "Benchmark edge betweenness, components and modularity on synthetic graphs"
)]
struct Cli {
    /// Graph generator to run.
    #[arg(value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Target node count per generated graph.
    #[arg(default_value_t = DEFAULT_NODE_COUNT)]
    node_count: u64,

    /// JSON file with a `BenchConfig`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of highest-betweenness edges to report (overrides config).
    #[arg(long)]
    top: Option<usize>,

    /// Print a JSON report instead of the table.
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run all generators and benchmark each.
    All,
    /// Fractal branching tree (deep paths).
    Lsystem,
    /// Preferential attachment via edge sampling (hub-and-spoke).
    Scalefree,
    /// Watts-Strogatz ring lattice + shortcuts.
    Smallworld,
    /// Erdos-Renyi uniform random edges.
    Random,
    /// Two dense cliques connected by a thin bridge.
    Barbell,
    /// Diffusion-limited aggregation (organic branching).
    Dla,
}

fn default_top_edges() -> usize {
    DEFAULT_TOP_EDGES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BenchConfig {
    #[serde(default)]
    engine: EngineConfig,
    /// Highest-betweenness edges to report; 0 reports all.
    #[serde(default = "default_top_edges")]
    top_edges: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            top_edges: DEFAULT_TOP_EDGES,
        }
    }
}

impl BenchConfig {
    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: BenchConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.engine.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct BenchReport {
    generator: String,
    nodes: usize,
    edges: usize,
    generate_ms: f64,
    betweenness_ms: f64,
    betweenness_parallel: bool,
    components_ms: f64,
    communities: usize,
    largest_community: usize,
    modularity_ms: f64,
    modularity: Option<f64>,
    top_edges: Vec<RankedEdge<NodeId>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if let Some(top) = cli.top {
        config.top_edges = top;
    }

    let generators: Vec<(&str, fn(u64) -> Graph)> = match cli.mode {
        Mode::Lsystem => vec![("L-system tree", gen_lsystem)],
        Mode::Scalefree => vec![("Scale-free (edge sampling)", gen_scale_free)],
        Mode::Smallworld => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        Mode::Random => vec![("Erdos-Renyi random", gen_random)],
        Mode::Barbell => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        Mode::Dla => vec![("DLA (organic branching)", gen_dla)],
        Mode::All => vec![
            ("L-system tree", gen_lsystem as fn(u64) -> Graph),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
        ],
    };

    let mut reports = Vec::with_capacity(generators.len());
    for (name, generator) in generators {
        let report = run_benchmark(name, generator, cli.node_count, &config)?;
        if !cli.json {
            print_report(&report);
        }
        reports.push(report);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn run_benchmark(
    name: &str,
    generator: fn(u64) -> Graph,
    node_count: u64,
    config: &BenchConfig,
) -> Result<BenchReport> {
    info!("{}: generating ~{} nodes", name, node_count);
    let t = Instant::now();
    let graph = generator(node_count);
    let generate_ms = t.elapsed().as_secs_f64() * 1000.0;

    let t = Instant::now();
    let betweenness = gn_community_core::edge_betweenness_with(&graph, &config.engine)
        .with_context(|| format!("betweenness on {name}"))?;
    let betweenness_ms = t.elapsed().as_secs_f64() * 1000.0;
    info!("{}: betweenness in {:.1}ms", name, betweenness_ms);

    let t = Instant::now();
    let communities = gn_community_core::find_communities(&graph)
        .with_context(|| format!("components on {name}"))?;
    let components_ms = t.elapsed().as_secs_f64() * 1000.0;

    // A graph with no edges has no defined modularity; report it as absent.
    let t = Instant::now();
    let modularity = match gn_community_core::partition_modularity(&graph, &communities) {
        Ok(q) => Some(q),
        Err(gn_community_core::Error::DegenerateModularity) => None,
        Err(e) => return Err(e).with_context(|| format!("modularity on {name}")),
    };
    let modularity_ms = t.elapsed().as_secs_f64() * 1000.0;

    Ok(BenchReport {
        generator: name.to_string(),
        nodes: graph.node_count(),
        edges: betweenness.len(),
        generate_ms,
        betweenness_ms,
        betweenness_parallel: config.engine.use_parallel(graph.node_count()),
        components_ms,
        communities: communities.len(),
        largest_community: communities.iter().map(|c| c.len()).max().unwrap_or(0),
        modularity_ms,
        modularity,
        top_edges: gn_community_core::rank_edges(&betweenness, config.top_edges),
    })
}

fn print_report(report: &BenchReport) {
    println!("--- {} ---", report.generator);
    println!(
        "Generated in {:.1}ms — {} nodes, {} edges",
        report.generate_ms, report.nodes, report.edges
    );
    println!();
    println!("{:>14} {:>12}", "phase", "time");
    println!("{:->14} {:->12}", "", "");
    println!(
        "{:>14} {:>10.1}ms{}",
        "betweenness",
        report.betweenness_ms,
        if report.betweenness_parallel { " (parallel)" } else { "" }
    );
    println!("{:>14} {:>10.1}ms", "components", report.components_ms);
    println!("{:>14} {:>10.1}ms", "modularity", report.modularity_ms);
    println!();
    println!(
        "{} communities, largest {} nodes, Q = {}",
        report.communities,
        report.largest_community,
        report
            .modularity
            .map(|q| format!("{q:.4}"))
            .unwrap_or_else(|| "n/a".to_string())
    );
    for ranked in &report.top_edges {
        println!(
            "  {:>8} – {:<8} {:>14.2}",
            ranked.edge.low, ranked.edge.high, ranked.betweenness
        );
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators — all O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// L-system fractal tree: every node spawns three children.
///
/// Long shortest-path chains with exponential width; every edge is a bridge.
fn gen_lsystem(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let branching = 3u64;
    graph.add_node(0);

    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                graph.add_edge(parent, child);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    graph
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge and connecting
/// to one of its endpoints. Nodes with more edges are more likely to be picked.
fn gen_scale_free(node_count: u64) -> Graph {
    let edges_per_node = 3u64;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(12345);

    let mut edge_endpoints: Vec<u64> = Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    // Seed: small clique
    let seed = 5u64.min(node_count);
    for i in 0..seed {
        graph.add_node(i);
    }
    for i in 0..seed {
        for j in (i + 1)..seed {
            graph.add_edge(i, j);
            edge_endpoints.push(i);
            edge_endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        graph.add_node(new_node);
        let attach = edges_per_node.min(new_node);
        for _ in 0..attach {
            let idx = rng.next(edge_endpoints.len() as u64) as usize;
            let target = edge_endpoints[idx];
            if graph.add_edge(new_node, target) {
                edge_endpoints.push(new_node);
                edge_endpoints.push(target);
            }
        }
    }

    graph
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Each node links to its K nearest ring neighbors; each link is rewired
/// with probability p. High clustering, short path lengths.
fn gen_small_world(node_count: u64) -> Graph {
    let k = 3u64;
    let p = 0.05f64;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        graph.add_node(i);
    }

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                graph.add_edge(i, if rewired != i { rewired } else { neighbor });
            } else {
                graph.add_edge(i, neighbor);
            }
        }
    }

    graph
}

/// Erdos-Renyi: ~3 uniform random edges per node. No structure.
fn gen_random(node_count: u64) -> Graph {
    let target_edges = node_count * 3;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(54321);

    for i in 0..node_count {
        graph.add_node(i);
    }

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        graph.add_edge(from, to);
    }

    graph
}

/// Barbell: two dense clusters joined by a chain of bridge nodes.
///
/// Every shortest path between the clusters crosses the bridge, so bridge
/// edges dominate the betweenness ranking.
fn gen_barbell(node_count: u64) -> Graph {
    let bridge_len = 10u64.min(node_count / 3);
    let cluster_size = (node_count - bridge_len) / 2;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(99999);

    let mut dense_cluster = |graph: &mut Graph, base: u64| {
        for i in 0..cluster_size {
            graph.add_node(base + i);
        }
        for i in 0..cluster_size {
            for _ in 0..8u64.min(cluster_size.saturating_sub(1)) {
                let target = rng.next(cluster_size);
                graph.add_edge(base + i, base + target);
            }
        }
    };

    // Cluster A: 0..cluster_size
    dense_cluster(&mut graph, 0);

    // Bridge: chain from the last node of A to the first node of B
    let bridge_start = cluster_size;
    for i in 0..bridge_len {
        let id = bridge_start + i;
        graph.add_edge(id.saturating_sub(1), id);
    }

    // Cluster B: after the bridge
    let b_start = bridge_start + bridge_len;
    dense_cluster(&mut graph, b_start);
    if cluster_size > 0 {
        graph.add_edge(b_start - 1, b_start);
    }

    graph
}

/// DLA (Diffusion-Limited Aggregation): organic branching growth.
///
/// Each new node attaches to a recent "surface" node, with occasional
/// long-range shortcuts that close loops.
fn gen_dla(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(77777);

    graph.add_node(0);

    // VecDeque for O(1) pop_front when evicting oldest surface nodes.
    let surface_max = 1000usize;
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(surface_max + 1);
    surface.push_back(0);

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u64) as usize];
        graph.add_edge(new_node, attach_to);

        // 10% chance of a second connection (creates loops / shortcuts)
        if rng.next(10) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            graph.add_edge(new_node, other);
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_hit_node_count() {
        let generators: [fn(u64) -> Graph; 5] =
            [gen_lsystem, gen_scale_free, gen_small_world, gen_random, gen_dla];
        for generator in generators {
            assert_eq!(generator(50).node_count(), 50);
        }
    }

    #[test]
    fn test_barbell_bridge_on_top() {
        let graph = gen_barbell(60);
        let betweenness = gn_community_core::edge_betweenness(&graph).unwrap();
        let top = gn_community_core::rank_edges(&betweenness, 1);
        let bridge_start = (60 - 10) / 2;
        assert!(top[0].edge.low >= bridge_start - 1);
        assert!(top[0].edge.high <= bridge_start + 10);
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: BenchConfig = serde_json::from_str(r#"{"engine": {"parallel": false}}"#).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(
            config.engine.parallel_min_nodes,
            gn_community_core::DEFAULT_PARALLEL_MIN_NODES
        );
        assert_eq!(config.top_edges, DEFAULT_TOP_EDGES);
    }

    #[test]
    fn test_run_benchmark_report() {
        let report = run_benchmark("DLA", gen_dla, 40, &BenchConfig::default()).unwrap();
        assert_eq!(report.nodes, 40);
        assert_eq!(report.communities, 1);
        assert_eq!(report.largest_community, 40);
        assert!(report.modularity.is_some());
        assert_eq!(report.top_edges.len(), DEFAULT_TOP_EDGES);
    }
}
