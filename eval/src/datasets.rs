//! Benchmark dataset registry.
//!
//! Datasets are identified by id (case-insensitive). Loading materializes
//! the graph and checks its size against the registered counts.

use pathrank_core::{Graph, Node, ReadableGraph};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{EvalError, EvalResult};
use crate::generators;

/// Relative count mismatch below which a warning is "minor".
pub const COUNT_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkDatasetMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub expected_nodes: usize,
    pub expected_edges: usize,
    pub directed: bool,
}

#[derive(Debug, Clone)]
pub struct LoadedBenchmark {
    pub meta: BenchmarkDatasetMeta,
    pub graph: Graph,
    pub warnings: Vec<String>,
}

const REGISTRY: [BenchmarkDatasetMeta; 5] = [
    BenchmarkDatasetMeta {
        id: "karate",
        name: "Zachary's Karate Club",
        expected_nodes: 34,
        expected_edges: 78,
        directed: false,
    },
    BenchmarkDatasetMeta {
        id: "tree-1k",
        name: "L-system tree (branching 3)",
        expected_nodes: 1000,
        expected_edges: 999,
        directed: false,
    },
    BenchmarkDatasetMeta {
        id: "smallworld-1k",
        name: "Watts-Strogatz small world (k=5, p=0.1)",
        expected_nodes: 1000,
        expected_edges: 5000,
        directed: false,
    },
    BenchmarkDatasetMeta {
        id: "scalefree-1k",
        name: "Preferential attachment (m=3)",
        expected_nodes: 1000,
        expected_edges: 2994,
        directed: false,
    },
    BenchmarkDatasetMeta {
        id: "barbell-60",
        name: "Barbell (two 25-cliques, 10-node bridge)",
        expected_nodes: 60,
        expected_edges: 611,
        directed: false,
    },
];

const DATASET_SEED: u64 = 42;

/// Zachary's karate club, 1-indexed member pairs.
const KARATE_EDGES: [(u8, u8); 78] = [
    (1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7), (1, 8), (1, 9), (1, 11), (1, 12),
    (1, 13), (1, 14), (1, 18), (1, 20), (1, 22), (1, 32), (2, 3), (2, 4), (2, 8), (2, 14),
    (2, 18), (2, 20), (2, 22), (2, 31), (3, 4), (3, 8), (3, 9), (3, 10), (3, 14), (3, 28),
    (3, 29), (3, 33), (4, 8), (4, 13), (4, 14), (5, 7), (5, 11), (6, 7), (6, 11), (6, 17),
    (7, 17), (9, 31), (9, 33), (9, 34), (10, 34), (14, 34), (15, 33), (15, 34), (16, 33), (16, 34),
    (19, 33), (19, 34), (20, 34), (21, 33), (21, 34), (23, 33), (23, 34), (24, 26), (24, 28), (24, 30),
    (24, 33), (24, 34), (25, 26), (25, 28), (25, 32), (26, 32), (27, 30), (27, 34), (28, 34), (29, 32),
    (29, 34), (30, 33), (30, 34), (31, 33), (31, 34), (32, 33), (32, 34), (33, 34),
];

pub fn list_benchmarks() -> &'static [BenchmarkDatasetMeta] {
    &REGISTRY
}

/// Resolve `id` and build its graph.
///
/// Count mismatches are reported in `warnings`; only an unknown id is an
/// error.
pub fn load_benchmark(id: &str) -> EvalResult<LoadedBenchmark> {
    let meta = REGISTRY
        .iter()
        .find(|m| m.id.eq_ignore_ascii_case(id))
        .cloned()
        .ok_or_else(|| EvalError::UnknownDataset(id.to_string()))?;

    let graph = match meta.id {
        "karate" => karate_club(),
        "tree-1k" => generators::lsystem_tree(1000, 3, DATASET_SEED),
        "smallworld-1k" => generators::small_world(1000, 5, 0.1, DATASET_SEED),
        "scalefree-1k" => generators::scale_free(1000, 3, DATASET_SEED),
        "barbell-60" => generators::barbell(25, 10, DATASET_SEED),
        other => return Err(EvalError::UnknownDataset(other.to_string())),
    };

    let warnings = validate_counts(&meta, graph.node_count(), graph.edge_count());
    for w in &warnings {
        warn!(dataset = meta.id, "{}", w);
    }
    info!(
        dataset = meta.id,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "benchmark loaded"
    );
    Ok(LoadedBenchmark { meta, graph, warnings })
}

fn validate_counts(meta: &BenchmarkDatasetMeta, nodes: usize, edges: usize) -> Vec<String> {
    [("node", meta.expected_nodes, nodes), ("edge", meta.expected_edges, edges)]
        .into_iter()
        .filter(|(_, expected, actual)| expected != actual)
        .map(|(what, expected, actual)| {
            let deviation = if expected == 0 {
                f64::INFINITY
            } else {
                (actual as f64 - expected as f64).abs() / expected as f64
            };
            let severity = if deviation <= COUNT_TOLERANCE { "minor" } else { "major" };
            format!(
                "{} {} count mismatch: expected {}, got {} ({:.1}% off)",
                severity,
                what,
                expected,
                actual,
                deviation * 100.0
            )
        })
        .collect()
}

/// Karate club graph; each member's `value` is its degree.
fn karate_club() -> Graph {
    let mut graph: Graph = Graph::with_capacity(false, 34, KARATE_EDGES.len());
    for member in 1..=34 {
        graph.add_node(Node::new(member.to_string()).with_type("Member"));
    }
    for (a, b) in KARATE_EDGES {
        graph.connect(&a.to_string(), &b.to_string()).edge_type = Some("FRIEND".to_string());
    }
    for member in 1..=34 {
        let id = member.to_string();
        let degree = graph.degree(&id) as f64;
        if let Some(node) = graph.node_mut(&id) {
            node.attributes.insert("value".to_string(), degree.into());
        }
    }
    graph
}
