use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::graph::{hop_edge_id, hops, EdgeData, Hop, NodeData, ReadableGraph};
use crate::options::{PathfindingOptions, TraversalOptions};
use crate::path::{Path, WeightedPath};
use crate::priority_queue::PriorityQueue;

/// Result of a full BFS or DFS exploration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalResult {
    /// Visited ids in discovery order, start first.
    pub order: Vec<String>,
    /// Hop distance (BFS) or tree depth (DFS) per visited node.
    pub depths: HashMap<String, usize>,
    /// Parent pointer per visited node; absent for the start.
    pub parents: HashMap<String, String>,
}

impl TraversalResult {
    pub fn nodes_visited(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.depths.contains_key(id)
    }

    pub fn depth(&self, id: &str) -> Option<usize> {
        self.depths.get(id).copied()
    }

    pub fn visited(&self) -> HashSet<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Walk parent pointers from `id` back to the start.
    pub fn path_to(&self, id: &str) -> Option<Vec<String>> {
        if !self.contains(id) {
            return None;
        }
        let mut path = vec![id.to_string()];
        let mut current = id;
        while let Some(parent) = self.parents.get(current) {
            path.push(parent.clone());
            current = parent;
        }
        path.reverse();
        Some(path)
    }
}

/// Hops out of `id` that pass the edge- and node-type filters.
pub(crate) fn expand<'g, G: ReadableGraph>(
    graph: &'g G,
    id: &str,
    options: &TraversalOptions<G::Edge>,
) -> Vec<Hop<'g, G::Edge>> {
    hops(graph, id, options.effective_direction())
        .into_iter()
        .filter(|hop| match &options.edge_types {
            None => true,
            Some(types) => hop
                .edge
                .and_then(|e| e.edge_type())
                .is_some_and(|t| types.iter().any(|allowed| allowed == t)),
        })
        .filter(|hop| match &options.node_types {
            None => true,
            Some(types) => graph
                .node(hop.node)
                .and_then(|n| n.node_type())
                .is_some_and(|t| types.iter().any(|allowed| allowed == t)),
        })
        .collect()
}

/// Breadth-first exploration from `start`.
///
/// Nodes are visited in non-decreasing distance order, each once, at its
/// minimum distance. Parent pointers are kept instead of per-node path
/// copies; use [`TraversalResult::path_to`] to reconstruct a path.
/// An unknown start yields an empty result.
pub fn bfs<G: ReadableGraph>(
    graph: &G,
    start: &str,
    options: &TraversalOptions<G::Edge>,
) -> TraversalResult {
    let mut result = TraversalResult::default();
    if !graph.has_node(start) {
        return result;
    }

    let max_depth = options.max_depth.unwrap_or(usize::MAX);
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();

    result.order.push(start.to_string());
    result.depths.insert(start.to_string(), 0);
    queue.push_back((start.to_string(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for hop in expand(graph, &current, options) {
            if result.depths.contains_key(hop.node) {
                continue;
            }
            let next = hop.node.to_string();
            result.order.push(next.clone());
            result.depths.insert(next.clone(), depth + 1);
            result.parents.insert(next.clone(), current.clone());
            queue.push_back((next, depth + 1));
        }
    }

    debug!(start, visited = result.order.len(), "bfs complete");
    result
}

/// Depth-first exploration from `start` using an explicit stack.
///
/// Neighbors are pushed in reverse so the first neighbor is explored
/// first, matching recursive DFS order without recursion.
pub fn dfs<G: ReadableGraph>(
    graph: &G,
    start: &str,
    options: &TraversalOptions<G::Edge>,
) -> TraversalResult {
    let mut result = TraversalResult::default();
    if !graph.has_node(start) {
        return result;
    }

    let max_depth = options.max_depth.unwrap_or(usize::MAX);
    // (node, depth, parent)
    let mut stack: Vec<(String, usize, Option<String>)> = vec![(start.to_string(), 0, None)];

    while let Some((current, depth, parent)) = stack.pop() {
        if result.depths.contains_key(&current) {
            continue;
        }
        result.order.push(current.clone());
        result.depths.insert(current.clone(), depth);
        if let Some(p) = parent {
            result.parents.insert(current.clone(), p);
        }
        if depth >= max_depth {
            continue;
        }
        for hop in expand(graph, &current, options).into_iter().rev() {
            if !result.depths.contains_key(hop.node) {
                stack.push((hop.node.to_string(), depth + 1, Some(current.clone())));
            }
        }
    }

    debug!(start, visited = result.order.len(), "dfs complete");
    result
}

/// Lowest-cost path between the two endpoints of `options` (Dijkstra).
///
/// Costs come from the traversal's `WeightConfig`; set `invert` when
/// higher edge values mean "better". Edges with negative or non-finite
/// cost are not traversed. With `max_depth`, the search runs over
/// `(node, hops)` states so the hop limit is exact.
///
/// Returns `Ok(None)` when the target is unreachable.
pub fn shortest_weighted_path<G: ReadableGraph>(
    graph: &G,
    options: &PathfindingOptions<G::Edge>,
) -> CoreResult<Option<WeightedPath>> {
    let traversal = &options.traversal;
    traversal.validate()?;
    let (source, target) = (options.source_id.as_str(), options.target_id.as_str());
    for id in [source, target] {
        if !graph.has_node(id) {
            return Err(CoreError::NodeNotFound(id.to_string()));
        }
    }
    if source == target {
        return Ok(Some(WeightedPath {
            path: Path::trivial(source),
            cost: 0.0,
        }));
    }

    let limit = traversal.max_depth;
    let state_hops = |h: usize| if limit.is_some() { h } else { 0 };

    // States are (node, hops); hops stays 0 without a depth limit.
    let mut best: HashMap<(&str, usize), f64> = HashMap::new();
    let mut parents: HashMap<(&str, usize), ((&str, usize), String)> = HashMap::new();
    let mut queue: PriorityQueue<(&str, usize)> = PriorityQueue::new();

    best.insert((source, 0), 0.0);
    queue.push((source, 0), 0.0);

    while let Some(((node, h), cost)) = queue.pop_with_priority() {
        if best.get(&(node, h)).is_some_and(|&c| cost > c) {
            continue;
        }
        if node == target {
            let mut nodes = vec![target.to_string()];
            let mut edges = Vec::new();
            let mut state = (node, h);
            while let Some((prev, edge)) = parents.get(&state) {
                nodes.push(prev.0.to_string());
                edges.push(edge.clone());
                state = *prev;
            }
            nodes.reverse();
            edges.reverse();
            return Ok(Some(WeightedPath {
                path: Path::new(nodes, edges),
                cost,
            }));
        }
        if limit.is_some_and(|l| h >= l) {
            continue;
        }
        for hop in expand(graph, node, traversal) {
            let step = traversal.weight.weight(hop.edge);
            if !step.is_finite() || step < 0.0 {
                continue;
            }
            let next = (hop.node, state_hops(h + 1));
            let next_cost = cost + step;
            if best.get(&next).is_some_and(|&c| c <= next_cost) {
                continue;
            }
            best.insert(next, next_cost);
            parents.insert(next, ((node, h), hop_edge_id(node, &hop)));
            queue.push(next, next_cost);
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph, Node, TraversalDirection};
    use crate::options::WeightConfig;

    fn make_chain(n: usize) -> Graph {
        let mut g: Graph = Graph::directed();
        for i in 0..n - 1 {
            g.connect(&i.to_string(), &(i + 1).to_string());
        }
        g
    }

    fn make_star(leaves: usize) -> Graph {
        let mut g: Graph = Graph::directed();
        for i in 1..=leaves {
            g.connect("hub", &format!("leaf{}", i));
        }
        g
    }

    fn make_cycle(n: usize) -> Graph {
        let mut g: Graph = Graph::directed();
        for i in 0..n {
            g.connect(&i.to_string(), &((i + 1) % n).to_string());
        }
        g
    }

    fn both() -> TraversalOptions {
        TraversalOptions::default().direction(TraversalDirection::Both)
    }

    // --- BFS ---

    #[test]
    fn test_bfs_chain() {
        let g = make_chain(6);
        let result = bfs(&g, "0", &TraversalOptions::default());
        assert_eq!(result.nodes_visited(), 6);
        assert_eq!(result.depth("5"), Some(5));
        assert_eq!(result.order, vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_bfs_chain_depth_limited() {
        let g = make_chain(10);
        let result = bfs(&g, "0", &TraversalOptions::with_depth(3));
        assert_eq!(result.nodes_visited(), 4);
        assert!(result.depths.values().all(|&d| d <= 3));
    }

    #[test]
    fn test_bfs_depth_zero_is_start_only() {
        let g = make_chain(5);
        let result = bfs(&g, "0", &TraversalOptions::with_depth(0));
        assert_eq!(result.order, vec!["0"]);
    }

    #[test]
    fn test_bfs_star() {
        let g = make_star(100);
        let result = bfs(&g, "hub", &TraversalOptions::with_depth(1));
        assert_eq!(result.nodes_visited(), 101);
        assert!(result.order.iter().skip(1).all(|id| result.depth(id) == Some(1)));
    }

    #[test]
    fn test_bfs_nondecreasing_distance_order() {
        let g = make_cycle(7);
        let result = bfs(&g, "0", &both());
        let depths: Vec<usize> = result.order.iter().map(|id| result.depths[id]).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(result.depth("4"), Some(3));
    }

    #[test]
    fn test_bfs_cycle_no_infinite_loop() {
        let g = make_cycle(5);
        let result = bfs(&g, "0", &TraversalOptions::default());
        assert_eq!(result.nodes_visited(), 5);
    }

    #[test]
    fn test_bfs_start_not_in_graph() {
        let g = make_chain(3);
        let result = bfs(&g, "999", &TraversalOptions::default());
        assert!(result.is_empty());
        assert!(result.path_to("999").is_none());
    }

    #[test]
    fn test_bfs_respects_direction() {
        let g = make_chain(3);
        let out = bfs(&g, "2", &TraversalOptions::default());
        assert_eq!(out.nodes_visited(), 1);
        let inc = bfs(&g, "2", &TraversalOptions::default().direction(TraversalDirection::Incoming));
        assert_eq!(inc.nodes_visited(), 3);
        let undirected = bfs(&g, "2", &TraversalOptions::default().undirected());
        assert_eq!(undirected.nodes_visited(), 3);
    }

    #[test]
    fn test_bfs_path_reconstruction() {
        let g = make_chain(4);
        let result = bfs(&g, "0", &TraversalOptions::default());
        assert_eq!(result.path_to("3").unwrap(), vec!["0", "1", "2", "3"]);
        assert_eq!(result.path_to("0").unwrap(), vec!["0"]);
    }

    #[test]
    fn test_bfs_parallel_edges_visit_once() {
        let mut g: Graph = Graph::directed();
        g.connect("0", "1");
        g.connect("0", "1");
        g.connect("0", "1");
        let result = bfs(&g, "0", &TraversalOptions::default());
        assert_eq!(result.order, vec!["0", "1"]);
    }

    #[test]
    fn test_bfs_edge_type_filter() {
        let mut g: Graph = Graph::directed();
        g.connect("a", "b").edge_type = Some("CITES".into());
        g.connect("a", "c").edge_type = Some("AUTHORED".into());
        let opts = TraversalOptions::default().edge_types(["CITES"]);
        let result = bfs(&g, "a", &opts);
        assert_eq!(result.order, vec!["a", "b"]);
    }

    #[test]
    fn test_bfs_node_type_filter() {
        let mut g: Graph = Graph::directed();
        g.add_node(Node::new("a").with_type("Author"));
        g.add_node(Node::new("w").with_type("Work"));
        g.add_node(Node::new("i").with_type("Institution"));
        g.connect("a", "w");
        g.connect("a", "i");
        let opts = TraversalOptions::default().node_types(["Work"]);
        let result = bfs(&g, "a", &opts);
        assert_eq!(result.order, vec!["a", "w"]);
    }

    // --- DFS ---

    #[test]
    fn test_dfs_explores_first_branch_first() {
        // a → b → d, a → c
        let mut g: Graph = Graph::directed();
        g.connect("a", "b");
        g.connect("a", "c");
        g.connect("b", "d");
        let result = dfs(&g, "a", &TraversalOptions::default());
        assert_eq!(result.order, vec!["a", "b", "d", "c"]);
        assert_eq!(result.depth("d"), Some(2));
        assert_eq!(result.path_to("d").unwrap(), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_dfs_depth_limited() {
        let g = make_chain(10);
        let result = dfs(&g, "0", &TraversalOptions::with_depth(2));
        assert_eq!(result.order, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_dfs_long_chain_no_stack_overflow() {
        let g = make_chain(50_000);
        let result = dfs(&g, "0", &TraversalOptions::default());
        assert_eq!(result.nodes_visited(), 50_000);
    }

    #[test]
    fn test_dfs_unknown_start() {
        let g = make_chain(3);
        assert!(dfs(&g, "x", &TraversalOptions::default()).is_empty());
    }

    #[test]
    fn test_traversals_deterministic() {
        let g = make_cycle(12);
        assert_eq!(bfs(&g, "3", &both()), bfs(&g, "3", &both()));
        assert_eq!(dfs(&g, "3", &both()), dfs(&g, "3", &both()));
    }

    // --- Weighted shortest path ---

    fn weighted_diamond() -> Graph {
        // a → b → d costs 1 + 1, a → c → d costs 5 + 5
        let mut g: Graph = Graph::directed();
        g.connect("a", "b").weight = Some(1.0);
        g.connect("b", "d").weight = Some(1.0);
        g.connect("a", "c").weight = Some(5.0);
        g.connect("c", "d").weight = Some(5.0);
        g
    }

    #[test]
    fn test_weighted_path_picks_lowest_cost() {
        let g = weighted_diamond();
        let found = shortest_weighted_path(&g, &PathfindingOptions::new("a", "d")).unwrap().unwrap();
        assert_eq!(found.path.nodes, vec!["a", "b", "d"]);
        assert_eq!(found.path.edges.len(), 2);
        assert_eq!(found.cost, 2.0);
    }

    #[test]
    fn test_weighted_path_inverted_prefers_strong_edges() {
        let g = weighted_diamond();
        let opts = PathfindingOptions::new("a", "d")
            .traversal(TraversalOptions::default().weight(WeightConfig::default().inverted()));
        let found = shortest_weighted_path(&g, &opts).unwrap().unwrap();
        assert_eq!(found.path.nodes, vec!["a", "c", "d"]);
        assert!((found.cost - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_path_hop_limit_is_exact() {
        // Cheap route needs 3 hops, expensive route 1 hop.
        let mut g: Graph = Graph::directed();
        g.connect("s", "x").weight = Some(1.0);
        g.connect("x", "y").weight = Some(1.0);
        g.connect("y", "t").weight = Some(1.0);
        g.connect("s", "t").weight = Some(10.0);
        let unlimited = shortest_weighted_path(&g, &PathfindingOptions::new("s", "t")).unwrap().unwrap();
        assert_eq!(unlimited.path.length(), 3);
        let limited = PathfindingOptions::new("s", "t").traversal(TraversalOptions::with_depth(2));
        let found = shortest_weighted_path(&g, &limited).unwrap().unwrap();
        assert_eq!(found.path.nodes, vec!["s", "t"]);
        assert_eq!(found.cost, 10.0);
    }

    #[test]
    fn test_weighted_path_unreachable_is_none() {
        let g = make_chain(3);
        assert!(shortest_weighted_path(&g, &PathfindingOptions::new("2", "0")).unwrap().is_none());
    }

    #[test]
    fn test_weighted_path_unknown_endpoint_is_error() {
        let g = make_chain(3);
        let err = shortest_weighted_path(&g, &PathfindingOptions::new("0", "missing")).unwrap_err();
        assert!(matches!(err, CoreError::NodeNotFound(id) if id == "missing"));
    }

    #[test]
    fn test_weighted_path_self() {
        let g = make_chain(3);
        let found = shortest_weighted_path(&g, &PathfindingOptions::new("1", "1")).unwrap().unwrap();
        assert_eq!(found.path, Path::trivial("1"));
        assert_eq!(found.cost, 0.0);
    }

    #[test]
    fn test_weighted_path_skips_negative_edges() {
        let mut g: Graph<Node, Edge> = Graph::directed();
        g.connect("a", "b").weight = Some(-1.0);
        assert!(shortest_weighted_path(&g, &PathfindingOptions::new("a", "b")).unwrap().is_none());
    }
}
