use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{CoreError, CoreResult};

/// Minimal node shape the engine depends on.
///
/// Callers attach whatever attributes they need to their own node type;
/// the engine only reads the id and, for type filters, the node type.
pub trait NodeData {
    fn id(&self) -> &str;

    fn node_type(&self) -> Option<&str> {
        None
    }
}

/// Minimal edge shape the engine depends on.
pub trait EdgeData {
    fn id(&self) -> &str;
    fn source(&self) -> &str;
    fn target(&self) -> &str;

    fn edge_type(&self) -> Option<&str> {
        None
    }

    fn weight(&self) -> Option<f64> {
        None
    }

    fn score(&self) -> Option<f64> {
        None
    }

    /// The endpoint that is not `id`. Self-loops return the node itself.
    fn other_endpoint(&self, id: &str) -> &str {
        if self.source() == id {
            self.target()
        } else {
            self.source()
        }
    }
}

/// Read-only graph contract consumed by every algorithm in this crate.
///
/// Lookups for unknown ids return empty or absent results; callers never
/// need to check `has_node` before asking for neighbors.
pub trait ReadableGraph {
    type Node: NodeData;
    type Edge: EdgeData;

    fn is_directed(&self) -> bool;

    fn node(&self, id: &str) -> Option<&Self::Node>;

    fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Successors for directed graphs, all adjacent nodes otherwise.
    fn neighbors(&self, id: &str) -> Vec<&str>;

    fn nodes(&self) -> Vec<&Self::Node>;

    /// Directed: edges where `id` is the source. Undirected: every edge
    /// touching `id`. Graphs that do not store edge objects return nothing.
    fn outgoing_edges(&self, _id: &str) -> Vec<&Self::Edge> {
        Vec::new()
    }

    /// Directed: edges where `id` is the target. Undirected: same as
    /// [`ReadableGraph::outgoing_edges`].
    fn incoming_edges(&self, _id: &str) -> Vec<&Self::Edge> {
        Vec::new()
    }

    /// Predecessors for directed graphs, all adjacent nodes otherwise.
    fn predecessors(&self, id: &str) -> Vec<&str> {
        if !self.is_directed() {
            return self.neighbors(id);
        }
        let mut seen = HashSet::new();
        self.incoming_edges(id)
            .into_iter()
            .map(|e| e.source())
            .filter(|s| seen.insert(*s))
            .collect()
    }

    fn degree(&self, id: &str) -> usize {
        self.neighbors(id).len()
    }

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    fn edge_count(&self) -> usize {
        let total: usize = self
            .nodes()
            .into_iter()
            .map(|n| self.neighbors(n.id()).len())
            .sum();
        if self.is_directed() {
            total
        } else {
            total / 2
        }
    }
}

/// Which stored edge directions a traversal may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalDirection {
    /// Follow edges source → target (all edges on undirected graphs).
    #[default]
    Outgoing,
    /// Follow edges target → source.
    Incoming,
    /// Ignore stored direction.
    Both,
}

impl TraversalDirection {
    /// Direction that walks the same edges from the other end.
    pub fn reversed(self) -> Self {
        match self {
            TraversalDirection::Outgoing => TraversalDirection::Incoming,
            TraversalDirection::Incoming => TraversalDirection::Outgoing,
            TraversalDirection::Both => TraversalDirection::Both,
        }
    }
}

/// Direction mode used by path ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    #[default]
    Directed,
    Undirected,
}

impl From<TraversalMode> for TraversalDirection {
    fn from(mode: TraversalMode) -> Self {
        match mode {
            TraversalMode::Directed => TraversalDirection::Outgoing,
            TraversalMode::Undirected => TraversalDirection::Both,
        }
    }
}

/// A numeric or categorical node attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Category(String),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(v) => Some(*v),
            AttributeValue::Category(_) => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Category(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Category(v)
    }
}

/// Default node type: id, optional type tag, attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub node_type: Option<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Numeric attribute value, `None` if absent or categorical.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(AttributeValue::as_number)
    }
}

impl NodeData for Node {
    fn id(&self) -> &str {
        &self.id
    }

    fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }
}

/// Default edge type. Stored directed; the owning graph decides whether
/// traversal treats it as bidirectional.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: Option<f64>,
    pub score: Option<f64>,
    pub edge_type: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: None,
            score: None,
            edge_type: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = Some(edge_type.into());
        self
    }
}

impl EdgeData for Edge {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn edge_type(&self) -> Option<&str> {
        self.edge_type.as_deref()
    }

    fn weight(&self) -> Option<f64> {
        self.weight
    }

    fn score(&self) -> Option<f64> {
        self.score
    }
}

/// In-memory graph: node table + per-node edge index lists.
///
/// Nodes and edges keep insertion order, so neighbor iteration (and every
/// traversal built on it) is deterministic. Edges are indexed on both
/// endpoints: `outgoing[i]` holds edges whose source is node `i`,
/// `incoming[i]` edges whose target is node `i`.
#[derive(Debug, Clone)]
pub struct Graph<N = Node, E = Edge> {
    directed: bool,
    nodes: Vec<N>,
    index: HashMap<String, usize>,
    edges: Vec<E>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<N: NodeData, E: EdgeData> Graph<N, E> {
    pub fn new(directed: bool) -> Self {
        Self::with_capacity(directed, 0, 0)
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(directed: bool, node_count: usize, edge_count: usize) -> Self {
        Self {
            directed,
            nodes: Vec::with_capacity(node_count),
            index: HashMap::with_capacity(node_count),
            edges: Vec::with_capacity(edge_count),
            outgoing: Vec::with_capacity(node_count),
            incoming: Vec::with_capacity(node_count),
        }
    }

    /// Insert a node, replacing the data of an existing node with the same
    /// id. Returns `true` if the node is new.
    pub fn add_node(&mut self, node: N) -> bool {
        if let Some(&idx) = self.index.get(node.id()) {
            self.nodes[idx] = node;
            return false;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id().to_string(), idx);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        true
    }

    /// Add an edge between two existing nodes.
    pub fn add_edge(&mut self, edge: E) -> CoreResult<()> {
        let from = self.require(&edge, edge.source())?;
        let to = self.require(&edge, edge.target())?;
        let idx = self.edges.len();
        self.edges.push(edge);
        self.outgoing[from].push(idx);
        self.incoming[to].push(idx);
        Ok(())
    }

    fn require(&self, edge: &E, node_id: &str) -> CoreResult<usize> {
        self.index
            .get(node_id)
            .copied()
            .ok_or_else(|| CoreError::DanglingEdge {
                edge_id: edge.id().to_string(),
                node_id: node_id.to_string(),
            })
    }

    /// Mutable access to node data. The id must not be changed.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        let idx = *self.index.get(id)?;
        self.nodes.get_mut(idx)
    }

    pub fn edges(&self) -> &[E] {
        &self.edges
    }

    fn edge_refs<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a E> + 'a {
        indices.iter().map(move |&i| &self.edges[i])
    }

    /// Edges touching node `idx` in either role, each listed once.
    fn incident(&self, idx: usize) -> Vec<&E> {
        let mut seen = HashSet::new();
        self.outgoing[idx]
            .iter()
            .chain(self.incoming[idx].iter())
            .filter(|&&e| seen.insert(e))
            .map(|&e| &self.edges[e])
            .collect()
    }
}

impl Graph<Node, Edge> {
    /// Add an edge `source → target`, creating missing endpoints.
    ///
    /// Edge ids are generated (`e0`, `e1`, ...). Returns the new edge so
    /// callers can attach a weight, score or type.
    pub fn connect(&mut self, source: &str, target: &str) -> &mut Edge {
        for id in [source, target] {
            if !self.index.contains_key(id) {
                self.add_node(Node::new(id));
            }
        }
        let idx = self.edges.len();
        let from = self.index[source];
        let to = self.index[target];
        self.edges.push(Edge::new(format!("e{}", idx), source, target));
        self.outgoing[from].push(idx);
        self.incoming[to].push(idx);
        &mut self.edges[idx]
    }

    /// Bulk load `(source, target)` pairs, creating nodes as needed.
    pub fn load_edges<I, S>(&mut self, edges: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        for (source, target) in edges {
            self.connect(source.as_ref(), target.as_ref());
        }
    }
}

impl<N: NodeData, E: EdgeData> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<N: NodeData, E: EdgeData> ReadableGraph for Graph<N, E> {
    type Node = N;
    type Edge = E;

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn node(&self, id: &str) -> Option<&N> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        if self.directed {
            self.edge_refs(&self.outgoing[idx])
                .map(|e| e.target())
                .filter(|t| seen.insert(*t))
                .collect()
        } else {
            self.incident(idx)
                .into_iter()
                .map(|e| e.other_endpoint(id))
                .filter(|t| seen.insert(*t))
                .collect()
        }
    }

    fn nodes(&self) -> Vec<&N> {
        self.nodes.iter().collect()
    }

    fn outgoing_edges(&self, id: &str) -> Vec<&E> {
        match self.index.get(id) {
            Some(&idx) if self.directed => self.edge_refs(&self.outgoing[idx]).collect(),
            Some(&idx) => self.incident(idx),
            None => Vec::new(),
        }
    }

    fn incoming_edges(&self, id: &str) -> Vec<&E> {
        match self.index.get(id) {
            Some(&idx) if self.directed => self.edge_refs(&self.incoming[idx]).collect(),
            Some(&idx) => self.incident(idx),
            None => Vec::new(),
        }
    }

    fn degree(&self, id: &str) -> usize {
        self.index
            .get(id)
            .map(|&i| self.outgoing[i].len() + self.incoming[i].len())
            .unwrap_or(0)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// One traversable step out of a node: the node reached and, when the
/// graph exposes edge objects, the edge used.
#[derive(Debug)]
pub(crate) struct Hop<'g, E> {
    pub node: &'g str,
    pub edge: Option<&'g E>,
}

/// Steps available from `id` in `direction`.
///
/// Graphs that expose edges yield one hop per edge (parallel edges give
/// repeated nodes); otherwise hops are built from neighbor ids.
pub(crate) fn hops<'g, G: ReadableGraph>(
    graph: &'g G,
    id: &str,
    direction: TraversalDirection,
) -> Vec<Hop<'g, G::Edge>> {
    let edges: Vec<&'g G::Edge> = match direction {
        TraversalDirection::Outgoing => graph.outgoing_edges(id),
        TraversalDirection::Incoming => graph.incoming_edges(id),
        TraversalDirection::Both => {
            let mut all = graph.outgoing_edges(id);
            let seen: HashSet<&str> = all.iter().map(|&e| e.id()).collect();
            all.extend(
                graph
                    .incoming_edges(id)
                    .into_iter()
                    .filter(|e| !seen.contains(e.id())),
            );
            all
        }
    };

    if !edges.is_empty() {
        return edges
            .into_iter()
            .map(|e| Hop {
                node: e.other_endpoint(id),
                edge: Some(e),
            })
            .collect();
    }

    let ids = match direction {
        TraversalDirection::Outgoing => graph.neighbors(id),
        TraversalDirection::Incoming => graph.predecessors(id),
        TraversalDirection::Both => {
            let mut all = graph.neighbors(id);
            for p in graph.predecessors(id) {
                if !all.contains(&p) {
                    all.push(p);
                }
            }
            all
        }
    };
    ids.into_iter().map(|node| Hop { node, edge: None }).collect()
}

/// First hop from `from` that reaches `to`.
pub(crate) fn edge_between<'g, G: ReadableGraph>(
    graph: &'g G,
    from: &str,
    to: &str,
    direction: TraversalDirection,
) -> Option<Hop<'g, G::Edge>> {
    hops(graph, from, direction).into_iter().find(|h| h.node == to)
}

/// Identifier recorded in a [`crate::Path`] for a hop.
pub(crate) fn hop_edge_id<E: EdgeData>(from: &str, hop: &Hop<'_, E>) -> String {
    match hop.edge {
        Some(e) => e.id().to_string(),
        None => format!("{}->{}", from, hop.node),
    }
}
