//! pathrank-core: graph traversal and path-ranking engine.
//!
//! Algorithms run over any [`ReadableGraph`]; an insertion-ordered
//! in-memory [`Graph`] is provided for pre-loaded data. Provides BFS/DFS
//! exploration, weighted shortest paths, ego-network extraction, a
//! degree-prioritized bidirectional search over an async [`GraphExpander`],
//! and mutual-information path ranking with a length penalty.
//!
//! Everything except the bidirectional search is synchronous and only
//! reads the graph, so queries can be run in parallel by the caller.

mod bidirectional;
mod ego_network;
mod error;
mod graph;
mod options;
mod path;
mod priority_queue;
mod ranking;
mod traversal;

pub use bidirectional::{
    bidirectional_search, BidirectionalOptions, BidirectionalResult, DiscoveredEdge, GraphExpander,
    MaterializedExpander, Neighbor, DEFAULT_RELATIONSHIP,
};
pub use ego_network::{extract_ego_network, EgoNetwork, EgoNetworkOptions};
pub use error::{BoxError, CoreError, CoreResult};
pub use graph::{
    AttributeValue, Edge, EdgeData, Graph, Node, NodeData, ReadableGraph, TraversalDirection,
    TraversalMode,
};
pub use options::{EdgeProperty, PathfindingOptions, TraversalOptions, WeightConfig, WeightSource};
pub use path::{Path, RankedPath, WeightedPath};
pub use priority_queue::PriorityQueue;
pub use ranking::{rank_paths, score_path, MiConfig, RankingOptions, WeightMode, DEFAULT_MAX_PATHS};
pub use traversal::{bfs, dfs, shortest_weighted_path, TraversalResult};
