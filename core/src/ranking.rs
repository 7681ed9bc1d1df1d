//! Mutual-information path ranking.
//!
//! Candidate paths between two nodes are enumerated (minimum-hop only, or
//! every simple path up to a length bound), scored with
//! `MI(path) - lambda * length(path)` and returned best first.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::graph::{
    edge_between, hop_edge_id, hops, Edge, Hop, Node, ReadableGraph, TraversalDirection, TraversalMode,
};
use crate::options::WeightConfig;
use crate::path::{Path, RankedPath};

/// Enumeration cap applied when `max_paths` is not set explicitly.
pub const DEFAULT_MAX_PATHS: usize = 1000;

/// How an edge weight combines with the hop's MI contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightMode {
    #[default]
    Multiply,
    Divide,
}

type AttributeExtractor<N> = Arc<dyn Fn(&N) -> Vec<f64> + Send + Sync>;

/// Source of the node features used for MI estimation.
pub struct MiConfig<N = Node> {
    /// Maps a node to a numeric feature vector. Without one, MI falls back
    /// to a degree-based estimate.
    pub attribute_extractor: Option<AttributeExtractor<N>>,
}

impl<N> MiConfig<N> {
    pub fn with_extractor(f: impl Fn(&N) -> Vec<f64> + Send + Sync + 'static) -> Self {
        Self {
            attribute_extractor: Some(Arc::new(f)),
        }
    }
}

impl MiConfig<Node> {
    /// Extract the listed numeric attributes; missing or categorical
    /// values read as 0.
    pub fn numeric_attributes<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self::with_extractor(move |node: &Node| {
            keys.iter().map(|k| node.number(k).unwrap_or(0.0)).collect()
        })
    }
}

impl<N> Clone for MiConfig<N> {
    fn clone(&self) -> Self {
        Self {
            attribute_extractor: self.attribute_extractor.clone(),
        }
    }
}

impl<N> Default for MiConfig<N> {
    fn default() -> Self {
        Self {
            attribute_extractor: None,
        }
    }
}

impl<N> fmt::Debug for MiConfig<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiConfig")
            .field("attribute_extractor", &self.attribute_extractor.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Options for [`rank_paths`].
pub struct RankingOptions<N = Node, E = Edge> {
    /// Only minimum-hop paths. Defaults to `true`.
    pub shortest_only: bool,
    /// Maximum path length in edges. Values below 1 (including negative
    /// ones) allow direct single-edge connections only. `None` means
    /// unbounded.
    pub max_length: Option<i64>,
    /// Stop enumerating after this many paths.
    pub max_paths: Option<usize>,
    /// Length penalty per edge.
    pub lambda: f64,
    pub weight_mode: WeightMode,
    pub traversal_mode: TraversalMode,
    pub weight: WeightConfig<E>,
    pub mi: MiConfig<N>,
}

impl<N, E> Default for RankingOptions<N, E> {
    fn default() -> Self {
        Self {
            shortest_only: true,
            max_length: None,
            max_paths: Some(DEFAULT_MAX_PATHS),
            lambda: 0.0,
            weight_mode: WeightMode::default(),
            traversal_mode: TraversalMode::default(),
            weight: WeightConfig::default(),
            mi: MiConfig::default(),
        }
    }
}

impl<N, E> Clone for RankingOptions<N, E> {
    fn clone(&self) -> Self {
        Self {
            shortest_only: self.shortest_only,
            max_length: self.max_length,
            max_paths: self.max_paths,
            lambda: self.lambda,
            weight_mode: self.weight_mode,
            traversal_mode: self.traversal_mode,
            weight: self.weight.clone(),
            mi: self.mi.clone(),
        }
    }
}

impl<N, E> fmt::Debug for RankingOptions<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingOptions")
            .field("shortest_only", &self.shortest_only)
            .field("max_length", &self.max_length)
            .field("max_paths", &self.max_paths)
            .field("lambda", &self.lambda)
            .field("weight_mode", &self.weight_mode)
            .field("traversal_mode", &self.traversal_mode)
            .field("weight", &self.weight)
            .field("mi", &self.mi)
            .finish()
    }
}

impl<N, E: crate::graph::EdgeData> RankingOptions<N, E> {
    #[must_use]
    pub fn with_shortest_only(mut self, shortest_only: bool) -> Self {
        self.shortest_only = shortest_only;
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }

    #[must_use]
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    #[must_use]
    pub fn with_weight_mode(mut self, mode: WeightMode) -> Self {
        self.weight_mode = mode;
        self
    }

    #[must_use]
    pub fn with_traversal_mode(mut self, mode: TraversalMode) -> Self {
        self.traversal_mode = mode;
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: WeightConfig<E>) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_mi(mut self, mi: MiConfig<N>) -> Self {
        self.mi = mi;
        self
    }

    /// Hop limit after clamping; `usize::MAX` when unbounded.
    pub fn length_limit(&self) -> usize {
        match self.max_length {
            Some(l) => l.max(1) as usize,
            None => usize::MAX,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.lambda.is_finite() {
            return Err(CoreError::InvalidConfiguration(format!(
                "lambda must be finite, got {}",
                self.lambda
            )));
        }
        if self.max_paths == Some(0) {
            return Err(CoreError::InvalidConfiguration(
                "max_paths must be at least 1".to_string(),
            ));
        }
        self.weight.validate()
    }
}

/// Rank paths from `source` to `target`, best first.
///
/// Returns `Ok(None)` when both nodes exist but no path satisfies the
/// options, and `Err(NodeNotFound)` when either endpoint is unknown.
/// Ties in score are broken by shorter length, then enumeration order.
pub fn rank_paths<G: ReadableGraph>(
    graph: &G,
    source: &str,
    target: &str,
    options: &RankingOptions<G::Node, G::Edge>,
) -> CoreResult<Option<Vec<RankedPath>>> {
    options.validate()?;
    for id in [source, target] {
        if !graph.has_node(id) {
            return Err(CoreError::NodeNotFound(id.to_string()));
        }
    }

    let direction = TraversalDirection::from(options.traversal_mode);
    let limit = options.length_limit();
    let cap = options.max_paths.unwrap_or(usize::MAX);

    let candidates = if source == target {
        vec![Path::trivial(source)]
    } else if options.shortest_only {
        shortest_paths(graph, source, target, direction, limit, cap)
    } else {
        enumerate_paths(graph, source, target, direction, limit, cap, |_, _| true)
    };

    debug!(
        source,
        target,
        candidates = candidates.len(),
        shortest_only = options.shortest_only,
        "path enumeration complete"
    );

    if candidates.is_empty() {
        return Ok(None);
    }

    let mut ranked: Vec<RankedPath> = candidates
        .iter()
        .map(|p| score_path(graph, p, options))
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.path.length().cmp(&b.path.length()))
    });
    Ok(Some(ranked))
}

/// Score one path with the options' MI estimator, weight handling and
/// length penalty.
///
/// Each hop contributes an MI estimate combined with its edge weight;
/// `MI(path)` is the mean over hops and 0 for a single-node path.
pub fn score_path<G: ReadableGraph>(
    graph: &G,
    path: &Path,
    options: &RankingOptions<G::Node, G::Edge>,
) -> RankedPath {
    let direction = TraversalDirection::from(options.traversal_mode);
    let edge_count = graph.edge_count() as f64;

    let hop_weights: Vec<f64> = path
        .nodes
        .windows(2)
        .zip(&path.edges)
        .map(|(pair, edge_id)| {
            let (u, v) = (pair[0].as_str(), pair[1].as_str());
            let hop = find_hop(graph, u, v, edge_id, direction);
            let w = options.weight.weight(hop.and_then(|h| h.edge));
            let mi = match &options.mi.attribute_extractor {
                Some(extract) => match (graph.node(u), graph.node(v)) {
                    (Some(a), Some(b)) => gaussian_mi(&extract(a), &extract(b)),
                    _ => 0.0,
                },
                None => degree_pmi(edge_count, graph.degree(u), graph.degree(v)),
            };
            combine(mi, w, options.weight_mode)
        })
        .collect();

    let mutual_information = if hop_weights.is_empty() {
        0.0
    } else {
        hop_weights.iter().sum::<f64>() / hop_weights.len() as f64
    };

    RankedPath {
        path: path.clone(),
        score: mutual_information - options.lambda * path.length() as f64,
        mutual_information,
        hop_weights,
    }
}

fn find_hop<'g, G: ReadableGraph>(
    graph: &'g G,
    u: &str,
    v: &str,
    edge_id: &str,
    direction: TraversalDirection,
) -> Option<Hop<'g, G::Edge>> {
    hops(graph, u, direction)
        .into_iter()
        .find(|h| h.node == v && hop_edge_id(u, h) == edge_id)
        .or_else(|| edge_between(graph, u, v, TraversalDirection::Both))
}

/// `½·ln(1 + x·y)` for non-negative feature agreement, 0 otherwise.
fn gaussian_mi(x: &[f64], y: &[f64]) -> f64 {
    let dot: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    if dot.is_finite() && dot > 0.0 {
        0.5 * dot.ln_1p()
    } else {
        0.0
    }
}

/// Positive pointwise MI of an edge under the configuration model.
fn degree_pmi(edge_count: f64, du: usize, dv: usize) -> f64 {
    let denom = (du * dv) as f64;
    if denom == 0.0 || edge_count == 0.0 {
        return 0.0;
    }
    (4.0 * edge_count / denom).ln().max(0.0)
}

fn combine(mi: f64, weight: f64, mode: WeightMode) -> f64 {
    if !weight.is_finite() {
        return 0.0;
    }
    match mode {
        WeightMode::Multiply => mi * weight,
        WeightMode::Divide if weight > 0.0 => mi / weight,
        WeightMode::Divide => 0.0,
    }
}

/// Unfiltered BFS hop distances from `start`, up to `limit`, plus the
/// layer parents of every reached node (`u` with `dist[u] + 1 == dist[v]`).
fn layered_distances<'a, G: ReadableGraph>(
    graph: &'a G,
    start: &'a str,
    direction: TraversalDirection,
    limit: usize,
) -> (HashMap<&'a str, usize>, HashMap<&'a str, Vec<&'a str>>) {
    let mut dist = HashMap::from([(start, 0)]);
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let d = dist[current];
        if d >= limit {
            continue;
        }
        for hop in hops(graph, current, direction) {
            match dist.get(hop.node) {
                None => {
                    dist.insert(hop.node, d + 1);
                    parents.insert(hop.node, vec![current]);
                    queue.push_back(hop.node);
                }
                Some(&seen) if seen == d + 1 => {
                    let layer = parents.entry(hop.node).or_default();
                    if !layer.contains(&current) {
                        layer.push(current);
                    }
                }
                Some(_) => {}
            }
        }
    }
    (dist, parents)
}

/// Every minimum-hop path. The forward BFS layers are walked back from
/// `target` to mark the nodes lying on some shortest path, so only
/// successor lookups are needed.
fn shortest_paths<'a, G: ReadableGraph>(
    graph: &'a G,
    source: &'a str,
    target: &'a str,
    direction: TraversalDirection,
    limit: usize,
    cap: usize,
) -> Vec<Path> {
    let (from_source, parents) = layered_distances(graph, source, direction, limit);
    let Some(&shortest) = from_source.get(target) else {
        return Vec::new();
    };

    let mut on_shortest: HashSet<&str> = HashSet::from([target]);
    let mut stack = vec![target];
    while let Some(node) = stack.pop() {
        for &parent in parents.get(node).into_iter().flatten() {
            if on_shortest.insert(parent) {
                stack.push(parent);
            }
        }
    }

    enumerate_paths(graph, source, target, direction, shortest, cap, |node, depth| {
        from_source.get(node) == Some(&depth) && on_shortest.contains(node)
    })
}

struct Frame<'a, E> {
    node: &'a str,
    hops: Vec<Hop<'a, E>>,
    next: usize,
}

/// Hops out of `id`, keeping the first hop to each distinct node.
fn distinct_hops<'a, G: ReadableGraph>(graph: &'a G, id: &str, direction: TraversalDirection) -> Vec<Hop<'a, G::Edge>> {
    let mut seen = HashSet::new();
    hops(graph, id, direction)
        .into_iter()
        .filter(|h| seen.insert(h.node))
        .collect()
}

/// Depth-first enumeration of simple paths of at most `limit` edges.
///
/// `allow(node, depth)` can veto stepping onto `node` at `depth` hops from
/// the source. Stops once `cap` paths are found; neighbor order is the
/// graph's, so the capped set is stable.
fn enumerate_paths<'a, G: ReadableGraph>(
    graph: &'a G,
    source: &'a str,
    target: &'a str,
    direction: TraversalDirection,
    limit: usize,
    cap: usize,
    allow: impl Fn(&str, usize) -> bool,
) -> Vec<Path> {
    let mut found = Vec::new();
    let mut nodes: Vec<&str> = vec![source];
    let mut edges: Vec<String> = Vec::new();
    let mut on_path: HashSet<&str> = HashSet::from([source]);
    let mut stack = vec![Frame {
        node: source,
        hops: distinct_hops(graph, source, direction),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let step = frame.hops.get(frame.next).map(|h| (h.node, hop_edge_id(frame.node, h)));
        frame.next += 1;

        let Some((next, edge_id)) = step else {
            stack.pop();
            if let Some(left) = nodes.pop() {
                on_path.remove(left);
            }
            edges.pop();
            continue;
        };

        let depth = edges.len() + 1;
        if on_path.contains(next) || !allow(next, depth) {
            continue;
        }
        if next == target {
            let mut path_nodes: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
            path_nodes.push(next.to_string());
            let mut path_edges = edges.clone();
            path_edges.push(edge_id);
            found.push(Path::new(path_nodes, path_edges));
            if found.len() >= cap {
                debug!(cap, "path enumeration cap reached");
                break;
            }
            continue;
        }
        if depth >= limit {
            continue;
        }

        nodes.push(next);
        on_path.insert(next);
        edges.push(edge_id);
        stack.push(Frame {
            node: next,
            hops: distinct_hops(graph, next, direction),
            next: 0,
        });
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn make_diamond() -> Graph {
        // s → a → t, s → b → t, s → c → d → t
        let mut g: Graph = Graph::directed();
        g.load_edges([
            ("s", "a"),
            ("a", "t"),
            ("s", "b"),
            ("b", "t"),
            ("s", "c"),
            ("c", "d"),
            ("d", "t"),
        ]);
        g
    }

    /// Short low-MI path A-B-F and long high-MI path A-C-D-E-F.
    fn make_tradeoff() -> Graph {
        let mut g: Graph = Graph::undirected();
        for (id, value) in [("A", 1.0), ("B", 0.1), ("C", 10.0), ("D", 10.0), ("E", 10.0), ("F", 1.0)] {
            g.add_node(Node::new(id).with_attribute("value", value));
        }
        g.load_edges([("A", "B"), ("B", "F"), ("A", "C"), ("C", "D"), ("D", "E"), ("E", "F")]);
        g
    }

    fn tradeoff_options(lambda: f64) -> RankingOptions {
        RankingOptions::default()
            .with_shortest_only(false)
            .with_lambda(lambda)
            .with_mi(MiConfig::numeric_attributes(["value"]))
    }

    fn make_near_complete(n: usize) -> Graph {
        let mut g: Graph = Graph::undirected();
        for i in 0..n {
            for j in (i + 1)..n {
                // Drop one edge so the graph is not complete.
                if (i, j) != (0, n - 1) {
                    g.connect(&i.to_string(), &j.to_string());
                }
            }
        }
        g
    }

    #[test]
    fn test_default_is_shortest_only() {
        let g = make_diamond();
        let implicit = rank_paths(&g, "s", "t", &RankingOptions::default()).unwrap().unwrap();
        let explicit = rank_paths(&g, "s", "t", &RankingOptions::default().with_shortest_only(true))
            .unwrap()
            .unwrap();
        assert_eq!(implicit, explicit);
        assert_eq!(implicit.len(), 2);
        assert!(implicit.iter().all(|r| r.path.length() == 2));
    }

    #[test]
    fn test_all_simple_paths_when_not_shortest_only() {
        let g = make_diamond();
        let ranked = rank_paths(&g, "s", "t", &RankingOptions::default().with_shortest_only(false))
            .unwrap()
            .unwrap();
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().any(|r| r.path.length() == 3));
    }

    #[test]
    fn test_path_edges_join_nodes() {
        let g = make_diamond();
        let ranked = rank_paths(&g, "s", "t", &RankingOptions::default().with_shortest_only(false))
            .unwrap()
            .unwrap();
        for r in &ranked {
            assert_eq!(r.path.edges.len() + 1, r.path.nodes.len());
            assert_eq!(r.path.source(), "s");
            assert_eq!(r.path.target(), "t");
        }
    }

    #[test]
    fn test_length_bound_respected() {
        let g = make_near_complete(7);
        for l in 1..=4 {
            let opts: RankingOptions = RankingOptions::default().with_shortest_only(false).with_max_length(l);
            let ranked = rank_paths(&g, "0", "5", &opts).unwrap().unwrap();
            assert!(ranked.iter().all(|r| r.path.length() <= l as usize), "max_length {}", l);
        }
    }

    #[test]
    fn test_max_length_zero_direct_edges_only() {
        let mut g: Graph = Graph::undirected();
        g.load_edges([("s", "t"), ("s", "x"), ("x", "t")]);
        let opts: RankingOptions = RankingOptions::default().with_shortest_only(false).with_max_length(0);
        let ranked = rank_paths(&g, "s", "t", &opts).unwrap().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].path.nodes, vec!["s", "t"]);
    }

    #[test]
    fn test_negative_max_length_clamped() {
        let mut g: Graph = Graph::undirected();
        g.load_edges([("s", "x"), ("x", "t")]);
        let opts: RankingOptions = RankingOptions::default().with_shortest_only(false).with_max_length(-1);
        assert_eq!(rank_paths(&g, "s", "t", &opts).unwrap(), None);
        g.connect("s", "t");
        let ranked = rank_paths(&g, "s", "t", &opts).unwrap().unwrap();
        assert!(ranked.iter().all(|r| r.path.length() == 1));
    }

    #[test]
    fn test_enumeration_cap() {
        let g = make_near_complete(10);
        let opts: RankingOptions = RankingOptions::default().with_shortest_only(false).with_max_paths(100);
        let ranked = rank_paths(&g, "0", "9", &opts).unwrap().unwrap();
        assert!(ranked.len() <= 100);
        assert_eq!(ranked.len(), 100);
    }

    #[test]
    fn test_enumeration_cap_is_stable() {
        let g = make_near_complete(8);
        let opts: RankingOptions = RankingOptions::default().with_shortest_only(false).with_max_paths(25);
        let first = rank_paths(&g, "0", "7", &opts).unwrap().unwrap();
        let second = rank_paths(&g, "0", "7", &opts).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lambda_zero_prefers_high_mi_path() {
        let g = make_tradeoff();
        let ranked = rank_paths(&g, "A", "F", &tradeoff_options(0.0)).unwrap().unwrap();
        assert_eq!(ranked.len(), 2);
        let best = &ranked[0].path;
        assert!(best.contains("C") && best.contains("D") && best.contains("E"));
    }

    #[test]
    fn test_high_lambda_prefers_shortest_path() {
        let g = make_tradeoff();
        let ranked = rank_paths(&g, "A", "F", &tradeoff_options(2.0)).unwrap().unwrap();
        assert_eq!(ranked[0].path.length(), 2);
        assert_eq!(ranked[0].path.nodes, vec!["A", "B", "F"]);
    }

    #[test]
    fn test_moderate_lambda_scores_differ() {
        let g = make_tradeoff();
        let ranked = rank_paths(&g, "A", "F", &tradeoff_options(0.1)).unwrap().unwrap();
        let mut scores: Vec<f64> = ranked.iter().map(|r| r.score).collect();
        scores.dedup();
        assert!(scores.len() > 1);
    }

    #[test]
    fn test_results_sorted_descending() {
        let g = make_tradeoff();
        let ranked = rank_paths(&g, "A", "F", &tradeoff_options(0.3)).unwrap().unwrap();
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_unknown_endpoint_is_error() {
        let g = make_diamond();
        let err = rank_paths(&g, "s", "nowhere", &RankingOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::NodeNotFound(id) if id == "nowhere"));
    }

    #[test]
    fn test_no_path_is_none() {
        let g = make_diamond();
        // Directed: nothing leads back to the source.
        assert_eq!(rank_paths(&g, "t", "s", &RankingOptions::default()).unwrap(), None);
    }

    #[test]
    fn test_undirected_mode_walks_edges_backwards() {
        let g = make_diamond();
        let opts: RankingOptions = RankingOptions::default().with_traversal_mode(TraversalMode::Undirected);
        let ranked = rank_paths(&g, "t", "s", &opts).unwrap().unwrap();
        assert!(ranked.iter().all(|r| r.path.length() == 2));
    }

    #[test]
    fn test_self_path_is_trivial() {
        let g = make_diamond();
        let ranked = rank_paths(&g, "s", "s", &RankingOptions::default()).unwrap().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].path, Path::trivial("s"));
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn test_weight_mode_changes_scores() {
        let mut g: Graph = Graph::undirected();
        g.connect("a", "b").weight = Some(4.0);
        let path = Path::new(vec!["a".into(), "b".into()], vec!["e0".into()]);
        let mi = MiConfig::with_extractor(|_: &Node| vec![1.0]);
        let multiply = RankingOptions::default().with_mi(mi.clone());
        let divide = RankingOptions::default().with_mi(mi).with_weight_mode(WeightMode::Divide);
        let base = 0.5 * 2f64.ln();
        assert!((score_path(&g, &path, &multiply).score - base * 4.0).abs() < 1e-12);
        assert!((score_path(&g, &path, &divide).score - base / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_degree_estimate_without_extractor() {
        // Single edge: |E| = 1, both degrees 1, ln(4).
        let mut g: Graph = Graph::undirected();
        g.connect("a", "b");
        let path = Path::new(vec!["a".into(), "b".into()], vec!["e0".into()]);
        let ranked = score_path(&g, &path, &RankingOptions::default());
        assert!((ranked.mutual_information - 4f64.ln()).abs() < 1e-12);
        assert_eq!(ranked.hop_weights.len(), 1);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let g = make_diamond();
        let opts: RankingOptions = RankingOptions::default().with_max_paths(0);
        assert!(matches!(
            rank_paths(&g, "s", "t", &opts),
            Err(CoreError::InvalidConfiguration(_))
        ));
        let opts: RankingOptions = RankingOptions::default().with_lambda(f64::NAN);
        assert!(rank_paths(&g, "s", "t", &opts).is_err());
    }

    /// Directed graph exposing successor ids only.
    struct SuccessorsOnly {
        nodes: Vec<Node>,
        successors: HashMap<String, Vec<String>>,
    }

    impl SuccessorsOnly {
        fn from_pairs(pairs: &[(&str, &str)]) -> Self {
            let mut nodes: Vec<Node> = Vec::new();
            let mut successors: HashMap<String, Vec<String>> = HashMap::new();
            for &(from, to) in pairs {
                for id in [from, to] {
                    if !nodes.iter().any(|n| n.id == id) {
                        nodes.push(Node::new(id));
                    }
                }
                successors.entry(from.to_string()).or_default().push(to.to_string());
            }
            Self { nodes, successors }
        }
    }

    impl ReadableGraph for SuccessorsOnly {
        type Node = Node;
        type Edge = Edge;

        fn is_directed(&self) -> bool {
            true
        }

        fn node(&self, id: &str) -> Option<&Node> {
            self.nodes.iter().find(|n| n.id == id)
        }

        fn neighbors(&self, id: &str) -> Vec<&str> {
            self.successors
                .get(id)
                .map(|v| v.iter().map(String::as_str).collect())
                .unwrap_or_default()
        }

        fn nodes(&self) -> Vec<&Node> {
            self.nodes.iter().collect()
        }
    }

    #[test]
    fn test_shortest_only_without_edge_objects() {
        let g = SuccessorsOnly::from_pairs(&[("a", "b"), ("b", "c"), ("a", "x"), ("x", "y"), ("y", "c")]);
        let ranked = rank_paths(&g, "a", "c", &RankingOptions::default()).unwrap().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].path.nodes, vec!["a", "b", "c"]);
        assert_eq!(ranked[0].path.edges, vec!["a->b", "b->c"]);
    }

    #[test]
    fn test_shortest_only_keeps_every_tied_branch_without_edge_objects() {
        let g = SuccessorsOnly::from_pairs(&[("s", "a"), ("s", "b"), ("a", "t"), ("b", "t"), ("s", "c"), ("c", "d"), ("d", "t")]);
        let ranked = rank_paths(&g, "s", "t", &RankingOptions::default()).unwrap().unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.path.length() == 2));
        assert!(rank_paths(&g, "t", "s", &RankingOptions::default()).unwrap().is_none());
    }
}
