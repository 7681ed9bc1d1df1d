use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::graph::{EdgeData, Graph, ReadableGraph, TraversalDirection};

/// Options for [`extract_ego_network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgoNetworkOptions {
    /// Maximum hop distance from the nearest seed.
    pub radius: usize,
    pub direction: TraversalDirection,
    /// Fail the whole extraction if any seed is missing.
    pub all_or_nothing: bool,
}

impl Default for EgoNetworkOptions {
    fn default() -> Self {
        Self {
            radius: 1,
            direction: TraversalDirection::Both,
            all_or_nothing: false,
        }
    }
}

impl EgoNetworkOptions {
    pub fn with_radius(radius: usize) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn direction(mut self, direction: TraversalDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn all_or_nothing(mut self) -> Self {
        self.all_or_nothing = true;
        self
    }
}

/// Induced subgraph around one or more seeds.
#[derive(Debug, Clone)]
pub struct EgoNetwork<N, E> {
    pub graph: Graph<N, E>,
    /// Hop distance from the nearest seed.
    pub distances: HashMap<String, usize>,
    /// Seeds that were not found in the source graph.
    pub failed_seeds: Vec<String>,
}

impl<N, E> EgoNetwork<N, E> {
    pub fn is_partial(&self) -> bool {
        !self.failed_seeds.is_empty()
    }
}

/// Extract every node within `options.radius` hops of any seed, plus every
/// edge of `graph` whose endpoints were both reached.
///
/// All valid seeds start in one shared frontier at distance 0, so a node
/// equidistant from several seeds is visited once. Missing seeds are
/// reported in `failed_seeds` while extraction proceeds for the rest,
/// unless `all_or_nothing` is set. No valid seed at all is an
/// [`CoreError::ExtractionFailed`].
pub fn extract_ego_network<G, S>(
    graph: &G,
    seeds: &[S],
    options: &EgoNetworkOptions,
) -> CoreResult<EgoNetwork<G::Node, G::Edge>>
where
    G: ReadableGraph,
    G::Node: Clone,
    G::Edge: Clone,
    S: AsRef<str>,
{
    if seeds.is_empty() {
        return Err(CoreError::InvalidConfiguration(
            "ego-network extraction needs at least one seed".to_string(),
        ));
    }

    let (valid, failed): (Vec<&str>, Vec<&str>) =
        seeds.iter().map(|s| s.as_ref()).partition(|id| graph.has_node(id));
    let failed_seeds: Vec<String> = failed.iter().map(|s| s.to_string()).collect();

    if valid.is_empty() || (options.all_or_nothing && !failed_seeds.is_empty()) {
        return Err(CoreError::ExtractionFailed {
            missing: failed_seeds,
        });
    }
    if !failed_seeds.is_empty() {
        warn!(missing = ?failed_seeds, "ego-network seeds not found, extracting partial network");
    }

    let mut distances: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    for &seed in &valid {
        if !distances.contains_key(seed) {
            distances.insert(seed.to_string(), 0);
            order.push(seed);
            queue.push_back((seed, 0));
        }
    }

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= options.radius {
            continue;
        }
        for hop in crate::graph::hops(graph, current, options.direction) {
            if distances.contains_key(hop.node) {
                continue;
            }
            distances.insert(hop.node.to_string(), depth + 1);
            order.push(hop.node);
            queue.push_back((hop.node, depth + 1));
        }
    }

    let mut sub = Graph::new(graph.is_directed());
    for id in &order {
        if let Some(node) = graph.node(id) {
            sub.add_node(node.clone());
        }
    }

    let mut seen_edges: HashSet<&str> = HashSet::new();
    for id in &order {
        for edge in graph.outgoing_edges(id) {
            if !distances.contains_key(edge.source()) || !distances.contains_key(edge.target()) {
                continue;
            }
            if seen_edges.insert(edge.id()) {
                sub.add_edge(edge.clone())?;
            }
        }
    }

    debug!(
        seeds = valid.len(),
        nodes = sub.node_count(),
        edges = sub.edge_count(),
        "ego network extracted"
    );

    Ok(EgoNetwork {
        graph: sub,
        distances,
        failed_seeds,
    })
}
