use thiserror::Error;

/// Boxed error returned by [`crate::GraphExpander`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by traversal, search and ranking.
///
/// "No path" is not an error: queries between two known nodes that are
/// disconnected return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced source, target or seed id is not in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Malformed options, rejected before any traversal work.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Ego-network extraction could not proceed for the listed seeds.
    #[error("ego-network extraction failed for seeds: {}", .missing.join(", "))]
    ExtractionFailed { missing: Vec<String> },

    /// A `GraphExpander` fetch failed.
    #[error("expanding node {node_id} failed: {source}")]
    Expansion {
        node_id: String,
        #[source]
        source: BoxError,
    },

    /// An edge was added whose endpoint is not a node of the graph.
    #[error("edge {edge_id} references unknown node {node_id}")]
    DanglingEdge { edge_id: String, node_id: String },
}
