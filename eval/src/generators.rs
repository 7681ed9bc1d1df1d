//! Seeded synthetic topologies for benchmarks and experiments.
//!
//! All generators are deterministic for a given seed, build undirected
//! graphs with node ids `"0".."n-1"`, give every node a numeric `value`
//! attribute and tag edges with a relationship type.

use pathrank_core::{Graph, Node};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const REL_TYPES: [&str; 5] = ["IMPLIES", "SUPPORTS", "CONTRADICTS", "RELATED_TO", "REQUIRES"];

fn add_node(graph: &mut Graph, id: usize, node_type: &str, rng: &mut StdRng) {
    graph.add_node(
        Node::new(id.to_string())
            .with_type(node_type)
            .with_attribute("value", rng.gen::<f64>()),
    );
}

fn add_edge(graph: &mut Graph, from: usize, to: usize, rel_type: &str) {
    graph.connect(&from.to_string(), &to.to_string()).edge_type = Some(rel_type.to_string());
}

fn random_rel(rng: &mut StdRng) -> &'static str {
    REL_TYPES[rng.gen_range(0..REL_TYPES.len())]
}

/// Fractal branching tree: each node spawns `branching` children,
/// breadth first, until `n` nodes exist. Always `n - 1` edges.
pub fn lsystem_tree(n: usize, branching: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::with_capacity(false, n, n.saturating_sub(1));
    if n == 0 {
        return graph;
    }
    add_node(&mut graph, 0, "Root", &mut rng);

    let branching = branching.max(1);
    let mut next_id = 1;
    let mut frontier = vec![0];
    while next_id < n && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= n {
                    break;
                }
                let child = next_id;
                next_id += 1;
                add_node(&mut graph, child, "Concept", &mut rng);
                let rel = random_rel(&mut rng);
                add_edge(&mut graph, parent, child, rel);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }
    graph
}

/// Preferential attachment by edge-endpoint sampling.
///
/// Starts from an `(m + 1)`-clique; every later node attaches to `m`
/// distinct existing nodes chosen proportionally to degree.
pub fn scale_free(n: usize, m: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let m = m.max(1);
    let mut graph = Graph::with_capacity(false, n, n * m);
    let mut endpoints: Vec<usize> = Vec::with_capacity(n * m * 2);

    let clique = (m + 1).min(n);
    for i in 0..clique {
        add_node(&mut graph, i, "Concept", &mut rng);
    }
    for i in 0..clique {
        for j in (i + 1)..clique {
            let rel = random_rel(&mut rng);
            add_edge(&mut graph, i, j, rel);
            endpoints.push(i);
            endpoints.push(j);
        }
    }

    for new_node in clique..n {
        add_node(&mut graph, new_node, "Concept", &mut rng);
        let mut targets: Vec<usize> = Vec::with_capacity(m);
        while targets.len() < m.min(new_node) {
            let target = endpoints[rng.gen_range(0..endpoints.len())];
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        for target in targets {
            let rel = random_rel(&mut rng);
            add_edge(&mut graph, new_node, target, rel);
            endpoints.push(new_node);
            endpoints.push(target);
        }
    }
    graph
}

/// Watts-Strogatz: ring lattice with `k` forward neighbors per node, each
/// edge rewired to a random endpoint with probability `p`. Always `n * k`
/// edges.
pub fn small_world(n: usize, k: usize, p: f64, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::with_capacity(false, n, n * k);
    for i in 0..n {
        add_node(&mut graph, i, "Concept", &mut rng);
    }
    if n < 2 {
        return graph;
    }
    for i in 0..n {
        for j in 1..=k {
            let neighbor = (i + j) % n;
            let rel = random_rel(&mut rng);
            let target = if rng.gen::<f64>() < p {
                let rewired = rng.gen_range(0..n);
                if rewired != i {
                    rewired
                } else {
                    neighbor
                }
            } else {
                neighbor
            };
            add_edge(&mut graph, i, target, rel);
        }
    }
    graph
}

/// Uniform random edges, about `avg_degree` per node. Self-loop draws are
/// dropped.
pub fn erdos_renyi(n: usize, avg_degree: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let draws = n * avg_degree / 2;
    let mut graph = Graph::with_capacity(false, n, draws);
    for i in 0..n {
        add_node(&mut graph, i, "Concept", &mut rng);
    }
    if n < 2 {
        return graph;
    }
    for _ in 0..draws {
        let from = rng.gen_range(0..n);
        let to = rng.gen_range(0..n);
        if from != to {
            let rel = random_rel(&mut rng);
            add_edge(&mut graph, from, to, rel);
        }
    }
    graph
}

/// Two complete `clique_size` cliques joined by a chain of `bridge_len`
/// bridge nodes.
///
/// Nodes: `2 * clique_size + bridge_len`. Edges:
/// `clique_size * (clique_size - 1) + bridge_len + 1`.
pub fn barbell(clique_size: usize, bridge_len: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = 2 * clique_size + bridge_len;
    let mut graph = Graph::with_capacity(false, n, clique_size * clique_size + bridge_len + 1);

    let b_start = clique_size + bridge_len;
    for (offset, node_type) in [(0, "ClusterA"), (b_start, "ClusterB")] {
        for i in 0..clique_size {
            add_node(&mut graph, offset + i, node_type, &mut rng);
        }
        for i in 0..clique_size {
            for j in (i + 1)..clique_size {
                let rel = random_rel(&mut rng);
                add_edge(&mut graph, offset + i, offset + j, rel);
            }
        }
    }

    if clique_size == 0 {
        return graph;
    }
    let mut prev = clique_size - 1;
    for i in 0..bridge_len {
        let id = clique_size + i;
        add_node(&mut graph, id, "Bridge", &mut rng);
        add_edge(&mut graph, prev, id, if i == 0 { "BRIDGES" } else { "NEXT" });
        prev = id;
    }
    add_edge(&mut graph, prev, b_start, "BRIDGES");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrank_core::{bfs, EdgeData, ReadableGraph, TraversalOptions};

    fn edge_signature(g: &Graph) -> Vec<(String, String)> {
        g.edges()
            .iter()
            .map(|e| (e.source().to_string(), e.target().to_string()))
            .collect()
    }

    #[test]
    fn test_lsystem_tree_shape() {
        let g = lsystem_tree(40, 3, 1);
        assert_eq!(g.node_count(), 40);
        assert_eq!(g.edge_count(), 39);
        assert!(!g.is_directed());
        assert_eq!(g.neighbors("0"), vec!["1", "2", "3"]);
        let reached = bfs(&g, "0", &TraversalOptions::default());
        assert_eq!(reached.nodes_visited(), 40);
    }

    #[test]
    fn test_scale_free_counts() {
        let g = scale_free(200, 3, 7);
        assert_eq!(g.node_count(), 200);
        assert_eq!(g.edge_count(), 6 + (200 - 4) * 3);
        // Distinct attachment targets: no duplicate edges out of a new node.
        for id in 4..200 {
            let id = id.to_string();
            let mut targets: Vec<&str> = g
                .outgoing_edges(&id)
                .into_iter()
                .filter(|e| e.source() == id)
                .map(|e| e.target())
                .collect();
            let before = targets.len();
            targets.sort_unstable();
            targets.dedup();
            assert_eq!(targets.len(), before);
        }
    }

    #[test]
    fn test_small_world_counts() {
        let g = small_world(100, 4, 0.1, 3);
        assert_eq!(g.node_count(), 100);
        assert_eq!(g.edge_count(), 400);
        assert!(g.edges().iter().all(|e| e.source() != e.target()));
    }

    #[test]
    fn test_erdos_renyi_has_no_self_loops() {
        let g = erdos_renyi(100, 6, 11);
        assert_eq!(g.node_count(), 100);
        assert!(g.edge_count() <= 300);
        assert!(g.edges().iter().all(|e| e.source() != e.target()));
    }

    #[test]
    fn test_barbell_counts_and_bottleneck() {
        let g = barbell(5, 3, 0);
        assert_eq!(g.node_count(), 13);
        assert_eq!(g.edge_count(), 20 + 4);
        let mut bridge_head = g.neighbors("5");
        bridge_head.sort_unstable();
        assert_eq!(bridge_head, vec!["4", "6"]);
        assert_eq!(g.node("6").and_then(|n| n.node_type.as_deref()), Some("Bridge"));
    }

    #[test]
    fn test_nodes_carry_value_attribute() {
        let g = scale_free(30, 2, 5);
        assert!(g.nodes().iter().all(|n| n.number("value").is_some()));
        assert!(g.edges().iter().all(|e| e.edge_type().is_some()));
    }

    #[test]
    fn test_same_seed_same_graph() {
        assert_eq!(edge_signature(&scale_free(80, 2, 9)), edge_signature(&scale_free(80, 2, 9)));
        assert_eq!(
            edge_signature(&small_world(50, 3, 0.3, 9)),
            edge_signature(&small_world(50, 3, 0.3, 9))
        );
    }
}
