//! Synthetic ground truth: plant high-signal paths into a copy of a graph
//! and mix them with random-walk noise candidates.

use std::collections::HashSet;

use pathrank_core::{Edge, EdgeData, Graph, NodeData, Path, ReadableGraph};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EvalError, EvalResult};

pub const PLANTED_EDGE_TYPE: &str = "PLANTED";

/// Whether planted paths may share nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    #[default]
    Disjoint,
    Allowed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantingConfig {
    pub num_paths: usize,
    /// Inclusive length range, in edges.
    pub min_length: usize,
    pub max_length: usize,
    /// Upper bound of the per-path signal in `(0, 1]`.
    pub signal_strength: f64,
    pub overlap: OverlapPolicy,
    pub noise_paths: usize,
    /// Overrides the experiment seed when set.
    pub seed: Option<u64>,
}

impl Default for PlantingConfig {
    fn default() -> Self {
        Self {
            num_paths: 5,
            min_length: 2,
            max_length: 4,
            signal_strength: 0.8,
            overlap: OverlapPolicy::Disjoint,
            noise_paths: 20,
            seed: None,
        }
    }
}

impl PlantingConfig {
    pub fn validate(&self) -> EvalResult<()> {
        if self.num_paths == 0 {
            return Err(EvalError::InvalidConfiguration(
                "num_paths must be at least 1".to_string(),
            ));
        }
        if self.min_length == 0 || self.min_length > self.max_length {
            return Err(EvalError::InvalidConfiguration(format!(
                "invalid planted length range {}..={}",
                self.min_length, self.max_length
            )));
        }
        if !(self.signal_strength > 0.0 && self.signal_strength <= 1.0) {
            return Err(EvalError::InvalidConfiguration(format!(
                "signal_strength must be in (0, 1], got {}",
                self.signal_strength
            )));
        }
        Ok(())
    }
}

/// A graph with planted paths, the shuffled candidate set and its
/// ground-truth relevance (`relevance[i]` belongs to `candidates[i]`).
#[derive(Debug, Clone)]
pub struct PlantedBenchmark {
    pub graph: Graph,
    pub candidates: Vec<Path>,
    pub relevance: Vec<f64>,
}

impl PlantedBenchmark {
    pub fn planted_count(&self) -> usize {
        self.relevance.iter().filter(|&&r| r > 0.0).count()
    }
}

/// Plant `config.num_paths` paths into a copy of `graph`.
///
/// Each planted path is a random node sequence whose consecutive pairs are
/// joined by new edges carrying `weight = 1 + 4·signal` and
/// `score = signal`, with `signal = signal_strength · U(0.5, 1)`. Noise
/// candidates are simple random walks over the original edges and have
/// relevance 0. Paths that cannot be placed are skipped with a warning.
pub fn plant_paths(graph: &Graph, config: &PlantingConfig, seed: u64) -> EvalResult<PlantedBenchmark> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let node_ids: Vec<String> = graph.nodes().iter().map(|n| n.id().to_string()).collect();

    let mut planted = graph.clone();
    let mut candidates: Vec<Path> = Vec::with_capacity(config.num_paths + config.noise_paths);
    let mut relevance: Vec<f64> = Vec::with_capacity(candidates.capacity());
    let mut used: HashSet<String> = HashSet::new();

    for i in 0..config.num_paths {
        let length = rng.gen_range(config.min_length..=config.max_length);
        let pool: Vec<&String> = match config.overlap {
            OverlapPolicy::Disjoint => node_ids.iter().filter(|id| !used.contains(*id)).collect(),
            OverlapPolicy::Allowed => node_ids.iter().collect(),
        };
        if pool.len() < length + 1 {
            warn!(
                path = i,
                length,
                available = pool.len(),
                "not enough nodes to plant path, skipping"
            );
            continue;
        }

        let mut nodes: Vec<String> = pool
            .choose_multiple(&mut rng, length + 1)
            .map(|id| id.to_string())
            .collect();
        nodes.shuffle(&mut rng);
        let signal = config.signal_strength * rng.gen_range(0.5..=1.0);

        let mut edges = Vec::with_capacity(length);
        for (j, pair) in nodes.windows(2).enumerate() {
            let edge = Edge::new(format!("planted-{}-{}", i, j), pair[0].as_str(), pair[1].as_str())
                .with_weight(1.0 + 4.0 * signal)
                .with_score(signal)
                .with_type(PLANTED_EDGE_TYPE);
            edges.push(edge.id.clone());
            planted.add_edge(edge)?;
        }
        if config.overlap == OverlapPolicy::Disjoint {
            used.extend(nodes.iter().cloned());
        }
        candidates.push(Path::new(nodes, edges));
        relevance.push(signal);
    }

    let mut seen: HashSet<Vec<String>> = candidates.iter().map(|p| p.nodes.clone()).collect();
    let mut noise = 0;
    let mut attempts = 0;
    while noise < config.noise_paths && attempts < config.noise_paths * 10 && !node_ids.is_empty() {
        attempts += 1;
        let length = rng.gen_range(config.min_length..=config.max_length);
        let Some(walk) = random_walk(graph, &node_ids, length, &mut rng) else {
            continue;
        };
        if seen.insert(walk.nodes.clone()) {
            candidates.push(walk);
            relevance.push(0.0);
            noise += 1;
        }
    }
    if noise < config.noise_paths {
        warn!(
            requested = config.noise_paths,
            generated = noise,
            "fewer noise candidates than requested"
        );
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.shuffle(&mut rng);
    let candidates: Vec<Path> = order.iter().map(|&i| candidates[i].clone()).collect();
    let relevance: Vec<f64> = order.iter().map(|&i| relevance[i]).collect();

    debug!(
        candidates = candidates.len(),
        planted = relevance.iter().filter(|&&r| r > 0.0).count(),
        seed,
        "planted benchmark ready"
    );
    Ok(PlantedBenchmark {
        graph: planted,
        candidates,
        relevance,
    })
}

/// Simple walk of up to `length` edges from a random start, `None` when
/// the start has no usable edge.
fn random_walk(graph: &Graph, node_ids: &[String], length: usize, rng: &mut StdRng) -> Option<Path> {
    let start = node_ids.choose(&mut *rng)?;
    let mut nodes = vec![start.clone()];
    let mut edges = Vec::with_capacity(length);
    let mut visited: HashSet<&str> = HashSet::from([start.as_str()]);

    while edges.len() < length {
        let current = nodes.last()?.clone();
        let options: Vec<&Edge> = graph
            .outgoing_edges(&current)
            .into_iter()
            .filter(|e| !visited.contains(e.other_endpoint(&current)))
            .collect();
        let Some(edge) = options.choose(&mut *rng) else {
            break;
        };
        let next = edge.other_endpoint(&current);
        visited.insert(next);
        nodes.push(next.to_string());
        edges.push(edge.id.clone());
    }

    if edges.is_empty() {
        None
    } else {
        Some(Path::new(nodes, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators;

    fn config() -> PlantingConfig {
        PlantingConfig {
            num_paths: 3,
            noise_paths: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_planted_paths_are_in_graph() {
        let base = generators::small_world(60, 2, 0.1, 1);
        let bench = plant_paths(&base, &config(), 7).unwrap();
        assert_eq!(bench.candidates.len(), bench.relevance.len());
        assert_eq!(bench.planted_count(), 3);
        let planted_edges: usize = bench
            .candidates
            .iter()
            .zip(&bench.relevance)
            .filter(|(_, &r)| r > 0.0)
            .map(|(p, _)| p.length())
            .sum();
        assert_eq!(bench.graph.edge_count(), base.edge_count() + planted_edges);

        for (path, &rel) in bench.candidates.iter().zip(&bench.relevance) {
            assert_eq!(path.edges.len() + 1, path.nodes.len());
            for (pair, edge_id) in path.nodes.windows(2).zip(&path.edges) {
                let edge = bench.graph.edges().iter().find(|e| &e.id == edge_id).unwrap();
                assert!(
                    (edge.source == pair[0] && edge.target == pair[1])
                        || (edge.source == pair[1] && edge.target == pair[0])
                );
                if rel > 0.0 {
                    assert_eq!(edge.score, Some(rel));
                    assert!((edge.weight.unwrap() - (1.0 + 4.0 * rel)).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_signal_and_length_ranges() {
        let base = generators::erdos_renyi(80, 4, 2);
        let cfg = PlantingConfig {
            num_paths: 8,
            signal_strength: 0.6,
            ..Default::default()
        };
        let bench = plant_paths(&base, &cfg, 3).unwrap();
        for (path, &rel) in bench.candidates.iter().zip(&bench.relevance) {
            assert!(path.length() >= 1 && path.length() <= cfg.max_length);
            if rel > 0.0 {
                assert!(path.length() >= cfg.min_length);
                assert!(rel >= 0.3 && rel <= 0.6);
            }
        }
    }

    #[test]
    fn test_disjoint_planted_paths_share_no_nodes() {
        let base = generators::lsystem_tree(50, 3, 1);
        let cfg = PlantingConfig {
            num_paths: 6,
            ..Default::default()
        };
        let bench = plant_paths(&base, &cfg, 11).unwrap();
        let mut seen = HashSet::new();
        for (path, &rel) in bench.candidates.iter().zip(&bench.relevance) {
            if rel > 0.0 {
                for node in &path.nodes {
                    assert!(seen.insert(node.clone()), "node {} reused", node);
                }
            }
        }
    }

    #[test]
    fn test_too_small_graph_skips_paths() {
        let base = generators::lsystem_tree(6, 2, 1);
        let cfg = PlantingConfig {
            num_paths: 4,
            min_length: 2,
            max_length: 2,
            noise_paths: 0,
            ..Default::default()
        };
        let bench = plant_paths(&base, &cfg, 5).unwrap();
        assert_eq!(bench.planted_count(), 2);
    }

    #[test]
    fn test_same_seed_same_benchmark() {
        let base = generators::scale_free(100, 2, 4);
        let a = plant_paths(&base, &config(), 99).unwrap();
        let b = plant_paths(&base, &config(), 99).unwrap();
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.relevance, b.relevance);
        let c = plant_paths(&base, &config(), 100).unwrap();
        assert_ne!(a.candidates, c.candidates);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let base = generators::lsystem_tree(10, 2, 1);
        for cfg in [
            PlantingConfig { num_paths: 0, ..Default::default() },
            PlantingConfig { min_length: 0, ..Default::default() },
            PlantingConfig { min_length: 5, max_length: 3, ..Default::default() },
            PlantingConfig { signal_strength: 1.5, ..Default::default() },
        ] {
            assert!(matches!(
                plant_paths(&base, &cfg, 1),
                Err(EvalError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let cfg: PlantingConfig =
            serde_json::from_str(r#"{"num_paths": 2, "overlap": "allowed"}"#).unwrap();
        assert_eq!(cfg.num_paths, 2);
        assert_eq!(cfg.overlap, OverlapPolicy::Allowed);
        assert_eq!(cfg.max_length, 4);
    }
}
