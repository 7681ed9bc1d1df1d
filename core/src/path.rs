/// An ordered node sequence and the edges joining consecutive nodes.
///
/// `edges.len() == nodes.len() - 1`; a zero-length path is a single node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl Path {
    /// The one-node path from a node to itself.
    pub fn trivial(id: impl Into<String>) -> Self {
        Self {
            nodes: vec![id.into()],
            edges: Vec::new(),
        }
    }

    pub fn new(nodes: Vec<String>, edges: Vec<String>) -> Self {
        debug_assert_eq!(edges.len() + 1, nodes.len(), "path edges must join consecutive nodes");
        Self { nodes, edges }
    }

    /// Number of edges.
    pub fn length(&self) -> usize {
        self.edges.len()
    }

    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn source(&self) -> &str {
        self.nodes.first().map(String::as_str).unwrap_or_default()
    }

    pub fn target(&self) -> &str {
        self.nodes.last().map(String::as_str).unwrap_or_default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}

/// A path with its ranking score. Higher is better.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPath {
    pub path: Path,
    /// `mutual_information - lambda * length`.
    pub score: f64,
    pub mutual_information: f64,
    /// Per-hop contribution after weight combination.
    pub hop_weights: Vec<f64>,
}

/// A path with its accumulated traversal cost. Lower is better.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPath {
    pub path: Path,
    pub cost: f64,
}
