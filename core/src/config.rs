use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PARALLEL: bool = true;

/// Below this many nodes the sequential sweep wins over thread-pool overhead.
pub const DEFAULT_PARALLEL_MIN_NODES: usize = 256;

/// Tuning for the betweenness engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Spread root traversals across the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Minimum node count before the parallel path is taken.
    #[serde(default = "default_parallel_min_nodes")]
    pub parallel_min_nodes: usize,
}

fn default_parallel() -> bool {
    DEFAULT_PARALLEL
}

fn default_parallel_min_nodes() -> usize {
    DEFAULT_PARALLEL_MIN_NODES
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            parallel_min_nodes: DEFAULT_PARALLEL_MIN_NODES,
        }
    }
}

impl EngineConfig {
    /// Single-threaded configuration.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_parallel_min_nodes(mut self, min_nodes: usize) -> Self {
        self.parallel_min_nodes = min_nodes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallel_min_nodes == 0 {
            return Err(Error::InvalidConfig {
                name: "parallel_min_nodes",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Whether a graph of `node_count` nodes should take the parallel path.
    pub fn use_parallel(&self, node_count: usize) -> bool {
        self.parallel && node_count >= self.parallel_min_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.parallel);
        assert_eq!(config.parallel_min_nodes, DEFAULT_PARALLEL_MIN_NODES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_use_parallel_threshold() {
        let config = EngineConfig::default().with_parallel_min_nodes(10);
        assert!(!config.use_parallel(9));
        assert!(config.use_parallel(10));
        assert!(!EngineConfig::sequential().use_parallel(1_000_000));
    }

    #[test]
    fn test_zero_min_nodes_rejected() {
        let config = EngineConfig::default().with_parallel_min_nodes(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { name: "parallel_min_nodes", .. })
        ));
    }
}
