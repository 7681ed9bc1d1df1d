//! Degree-prioritized bidirectional best-first search over a lazily
//! expanded graph.
//!
//! Two frontiers grow from the seeds, each ordered by node degree so that
//! specific, low-degree nodes are expanded before hubs. Each iteration
//! expands the whole current frontier of one side, then the other; fetches
//! for a batch run concurrently but their results are applied in frontier
//! order, so the outcome depends only on the expander's responses.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use crate::error::{BoxError, CoreError, CoreResult};
use crate::graph::{hops, EdgeData, ReadableGraph, TraversalDirection};
use crate::priority_queue::PriorityQueue;

/// Relationship type recorded for hops that carry no edge type.
pub const DEFAULT_RELATIONSHIP: &str = "RELATED_TO";

/// A neighbor reported by a [`GraphExpander`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub target_id: String,
    pub relationship_type: String,
}

impl Neighbor {
    pub fn new(target_id: impl Into<String>, relationship_type: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            relationship_type: relationship_type.into(),
        }
    }
}

/// Async neighbor-expansion contract used by [`bidirectional_search`].
///
/// Implementations typically sit in front of a remote API or database.
/// `add_edge` is called once per reported neighbor so the implementation
/// can record the explored subgraph.
#[async_trait]
pub trait GraphExpander<T: Send>: Send + Sync {
    async fn neighbors(&self, id: &str) -> Result<Vec<Neighbor>, BoxError>;

    /// Degree used as frontier priority. Unknown nodes may report 0.
    fn degree(&self, id: &str) -> usize;

    async fn node(&self, id: &str) -> Result<Option<T>, BoxError>;

    fn add_edge(&mut self, source: &str, target: &str, relationship_type: &str);
}

/// Search budget and path target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidirectionalOptions {
    /// Paths to find before entering the path-focused phase.
    pub target_paths: usize,
    /// Hard cap on iterations (one iteration expands both sides).
    pub max_iterations: usize,
    /// Iterations to keep exploring once `target_paths` is reached.
    pub min_iterations: usize,
}

impl Default for BidirectionalOptions {
    fn default() -> Self {
        Self {
            target_paths: 5,
            max_iterations: 10,
            min_iterations: 2,
        }
    }
}

impl BidirectionalOptions {
    #[must_use]
    pub fn with_target_paths(mut self, target_paths: usize) -> Self {
        self.target_paths = target_paths;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.target_paths == 0 {
            return Err(CoreError::InvalidConfiguration(
                "target_paths must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a bidirectional search.
#[derive(Debug, Clone)]
pub struct BidirectionalResult<T> {
    /// Distinct simple paths from `seed_a` to `seed_b`, in discovery order.
    pub paths: Vec<Vec<String>>,
    pub visited_a: HashSet<String>,
    pub visited_b: HashSet<String>,
    /// Iterations consumed, at most `max_iterations`.
    pub iterations: usize,
    /// Node data for every node on a found path, when the expander has it.
    pub nodes: HashMap<String, T>,
}

/// State of one search direction.
#[derive(Default)]
struct Side {
    frontier: PriorityQueue<String>,
    visited: HashSet<String>,
    parents: HashMap<String, String>,
}

impl Side {
    fn seeded<T: Send, E: GraphExpander<T> + ?Sized>(expander: &E, seed: &str) -> Self {
        let mut side = Side::default();
        side.visited.insert(seed.to_string());
        side.frontier.push(seed.to_string(), expander.degree(seed) as f64);
        side
    }

    /// Frontier contents in pop order, without removing them.
    fn frontier_ids(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, f64)> = self.frontier.iter().collect();
        entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        entries.dedup_by(|a, b| a.0 == b.0);
        entries.into_iter().map(|(id, _)| id.as_str()).collect()
    }

    fn chain(&self, from: &str) -> Vec<String> {
        let mut out = vec![from.to_string()];
        let mut current = from;
        while let Some(parent) = self.parents.get(current) {
            out.push(parent.clone());
            current = parent;
        }
        out
    }
}

/// Expand every node currently on `side`'s frontier.
async fn expand_side<T, E>(expander: &mut E, side: &mut Side) -> CoreResult<()>
where
    T: Send,
    E: GraphExpander<T> + ?Sized,
{
    let mut batch = side.frontier.drain_ordered();
    let mut seen = HashSet::new();
    batch.retain(|id| seen.insert(id.clone()));

    let fetched = {
        let shared: &E = expander;
        join_all(batch.iter().map(|id| shared.neighbors(id))).await
    };

    for (id, result) in batch.iter().zip(fetched) {
        let neighbors = result.map_err(|source| CoreError::Expansion {
            node_id: id.clone(),
            source,
        })?;
        for neighbor in neighbors {
            expander.add_edge(id, &neighbor.target_id, &neighbor.relationship_type);
            if side.visited.insert(neighbor.target_id.clone()) {
                side.parents.insert(neighbor.target_id.clone(), id.clone());
                let priority = expander.degree(&neighbor.target_id) as f64;
                side.frontier.push(neighbor.target_id, priority);
            }
        }
    }
    Ok(())
}

/// Record paths through frontier nodes of `a` or `b` already visited by
/// the other side. Returns how many new paths were added.
fn collect_meetings(a: &Side, b: &Side, found: &mut Vec<Vec<String>>) -> usize {
    let mut meetings: Vec<&str> = a
        .frontier_ids()
        .into_iter()
        .filter(|id| b.visited.contains(*id))
        .collect();
    meetings.extend(
        b.frontier_ids()
            .into_iter()
            .filter(|id| a.visited.contains(*id)),
    );

    let before = found.len();
    for meet in meetings {
        let mut path = a.chain(meet);
        path.reverse();
        path.extend(b.chain(meet).into_iter().skip(1));

        let distinct: HashSet<&String> = path.iter().collect();
        if distinct.len() != path.len() {
            continue;
        }
        if !found.contains(&path) {
            found.push(path);
        }
    }
    found.len() - before
}

/// Push every node of `path` onto both frontiers, giving nodes a side has
/// not reached yet a parent that follows the path.
fn reseed<T: Send, E: GraphExpander<T> + ?Sized>(expander: &E, a: &mut Side, b: &mut Side, path: &[String]) {
    for (i, id) in path.iter().enumerate() {
        let priority = expander.degree(id) as f64;
        if i > 0 && a.visited.insert(id.clone()) {
            a.parents.insert(id.clone(), path[i - 1].clone());
        }
        if i + 1 < path.len() && b.visited.insert(id.clone()) {
            b.parents.insert(id.clone(), path[i + 1].clone());
        }
        a.frontier.push(id.clone(), priority);
        b.frontier.push(id.clone(), priority);
    }
}

/// Find up to `options.target_paths` distinct paths between two seeds.
///
/// Stops when `max_iterations` is reached, when both frontiers are empty,
/// or `min_iterations` iterations after the path target was first met.
/// During those extra iterations every node of a newly found path is
/// pushed back onto both frontiers to diversify the remaining paths.
///
/// When `seed_a == seed_b` the single one-node path is returned with zero
/// iterations and the expander is never called.
pub async fn bidirectional_search<T, E>(
    expander: &mut E,
    seed_a: &str,
    seed_b: &str,
    options: &BidirectionalOptions,
) -> CoreResult<BidirectionalResult<T>>
where
    T: Send,
    E: GraphExpander<T> + ?Sized,
{
    options.validate()?;

    if seed_a == seed_b {
        let seed: HashSet<String> = std::iter::once(seed_a.to_string()).collect();
        return Ok(BidirectionalResult {
            paths: vec![vec![seed_a.to_string()]],
            visited_a: seed.clone(),
            visited_b: seed,
            iterations: 0,
            nodes: HashMap::new(),
        });
    }

    let mut a = Side::seeded::<T, E>(&*expander, seed_a);
    let mut b = Side::seeded::<T, E>(&*expander, seed_b);
    let mut paths: Vec<Vec<String>> = Vec::new();
    let mut iterations = 0;
    let mut reached_at: Option<usize> = None;

    loop {
        if iterations >= options.max_iterations {
            break;
        }
        if a.frontier.is_empty() && b.frontier.is_empty() {
            break;
        }
        if reached_at.is_some_and(|at| iterations - at >= options.min_iterations) {
            break;
        }
        iterations += 1;
        let known = paths.len();

        expand_side::<T, E>(expander, &mut a).await?;
        collect_meetings(&a, &b, &mut paths);
        expand_side::<T, E>(expander, &mut b).await?;
        collect_meetings(&a, &b, &mut paths);

        debug!(
            iteration = iterations,
            frontier_a = a.frontier.len(),
            frontier_b = b.frontier.len(),
            paths = paths.len(),
            "bidirectional iteration"
        );

        if reached_at.is_none() && paths.len() >= options.target_paths {
            reached_at = Some(iterations);
        }
        if reached_at.is_some() {
            for path in &paths[known..] {
                reseed::<T, E>(&*expander, &mut a, &mut b, path);
            }
        }
    }

    let mut ordered: Vec<&str> = Vec::new();
    for id in paths.iter().flatten() {
        if !ordered.contains(&id.as_str()) {
            ordered.push(id);
        }
    }
    let fetched = {
        let shared: &E = expander;
        join_all(ordered.iter().map(|id| shared.node(id))).await
    };
    let mut nodes = HashMap::new();
    for (id, result) in ordered.iter().zip(fetched) {
        let node = result.map_err(|source| CoreError::Expansion {
            node_id: id.to_string(),
            source,
        })?;
        if let Some(node) = node {
            nodes.insert(id.to_string(), node);
        }
    }

    debug!(seed_a, seed_b, iterations, paths = paths.len(), "bidirectional search complete");

    Ok(BidirectionalResult {
        paths,
        visited_a: a.visited,
        visited_b: b.visited,
        iterations,
        nodes,
    })
}

/// An edge reported through [`GraphExpander::add_edge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredEdge {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
}

/// [`GraphExpander`] over an already loaded [`ReadableGraph`].
///
/// Follows edges in both directions by default so searches from the
/// target seed can walk edges backwards on directed graphs.
pub struct MaterializedExpander<'a, G> {
    graph: &'a G,
    direction: TraversalDirection,
    pub discovered_edges: Vec<DiscoveredEdge>,
}

impl<'a, G: ReadableGraph> MaterializedExpander<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            direction: TraversalDirection::Both,
            discovered_edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: TraversalDirection) -> Self {
        self.direction = direction;
        self
    }
}

#[async_trait]
impl<'a, G> GraphExpander<G::Node> for MaterializedExpander<'a, G>
where
    G: ReadableGraph + Sync,
    G::Node: Clone + Send,
    G::Edge: Sync,
{
    async fn neighbors(&self, id: &str) -> Result<Vec<Neighbor>, BoxError> {
        Ok(hops(self.graph, id, self.direction)
            .into_iter()
            .map(|hop| {
                let relationship = hop
                    .edge
                    .and_then(|e| e.edge_type())
                    .unwrap_or(DEFAULT_RELATIONSHIP);
                Neighbor::new(hop.node, relationship)
            })
            .collect())
    }

    fn degree(&self, id: &str) -> usize {
        self.graph.degree(id)
    }

    async fn node(&self, id: &str) -> Result<Option<G::Node>, BoxError> {
        Ok(self.graph.node(id).cloned())
    }

    fn add_edge(&mut self, source: &str, target: &str, relationship_type: &str) {
        self.discovered_edges.push(DiscoveredEdge {
            source: source.to_string(),
            target: target.to_string(),
            relationship_type: relationship_type.to_string(),
        });
    }
}
