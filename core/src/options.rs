use std::fmt;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::graph::{Edge, EdgeData, TraversalDirection};

/// Edge property used as a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeProperty {
    Score,
    #[default]
    Weight,
}

/// Where an edge's weight comes from.
pub enum WeightSource<E> {
    Property(EdgeProperty),
    Custom(Arc<dyn Fn(&E) -> f64 + Send + Sync>),
}

impl<E> Clone for WeightSource<E> {
    fn clone(&self) -> Self {
        match self {
            WeightSource::Property(p) => WeightSource::Property(*p),
            WeightSource::Custom(f) => WeightSource::Custom(Arc::clone(f)),
        }
    }
}

impl<E> fmt::Debug for WeightSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightSource::Property(p) => f.debug_tuple("Property").field(p).finish(),
            WeightSource::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How edge weights are read.
///
/// `invert` turns "highest value = best" into "lowest cost = best"
/// (`1 / w`) for shortest-path style algorithms. Edges missing the
/// property (or hops on graphs without edge objects) get `default_weight`.
pub struct WeightConfig<E = Edge> {
    pub source: WeightSource<E>,
    pub invert: bool,
    pub default_weight: f64,
}

impl<E> Clone for WeightConfig<E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            invert: self.invert,
            default_weight: self.default_weight,
        }
    }
}

impl<E> fmt::Debug for WeightConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightConfig")
            .field("source", &self.source)
            .field("invert", &self.invert)
            .field("default_weight", &self.default_weight)
            .finish()
    }
}

impl<E> Default for WeightConfig<E> {
    fn default() -> Self {
        Self {
            source: WeightSource::Property(EdgeProperty::Weight),
            invert: false,
            default_weight: 1.0,
        }
    }
}

impl<E: EdgeData> WeightConfig<E> {
    pub fn property(property: EdgeProperty) -> Self {
        Self {
            source: WeightSource::Property(property),
            ..Default::default()
        }
    }

    pub fn custom(f: impl Fn(&E) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            source: WeightSource::Custom(Arc::new(f)),
            ..Default::default()
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Raw edge value, before inversion.
    pub fn value(&self, edge: Option<&E>) -> f64 {
        let Some(edge) = edge else {
            return self.default_weight;
        };
        match &self.source {
            WeightSource::Property(EdgeProperty::Weight) => edge.weight().unwrap_or(self.default_weight),
            WeightSource::Property(EdgeProperty::Score) => edge.score().unwrap_or(self.default_weight),
            WeightSource::Custom(f) => f(edge),
        }
    }

    /// Effective weight. Inverting a non-positive value yields infinity.
    pub fn weight(&self, edge: Option<&E>) -> f64 {
        let v = self.value(edge);
        if !self.invert {
            return v;
        }
        if v > 0.0 {
            1.0 / v
        } else {
            f64::INFINITY
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.default_weight.is_finite() {
            return Err(CoreError::InvalidConfiguration(format!(
                "default_weight must be finite, got {}",
                self.default_weight
            )));
        }
        Ok(())
    }
}

/// Options shared by BFS, DFS, ego-network extraction and pathfinding.
pub struct TraversalOptions<E = Edge> {
    pub direction: TraversalDirection,
    /// Maximum hops from the start; `None` = unbounded.
    pub max_depth: Option<usize>,
    /// Only follow edges whose type is listed. Hops without an edge
    /// object never pass an edge type filter.
    pub edge_types: Option<Vec<String>>,
    /// Only enter nodes whose type is listed. Start nodes are exempt.
    pub node_types: Option<Vec<String>>,
    pub weight: WeightConfig<E>,
    /// `Some(false)` treats a directed graph as undirected.
    pub directed: Option<bool>,
}

impl<E> Clone for TraversalOptions<E> {
    fn clone(&self) -> Self {
        Self {
            direction: self.direction,
            max_depth: self.max_depth,
            edge_types: self.edge_types.clone(),
            node_types: self.node_types.clone(),
            weight: self.weight.clone(),
            directed: self.directed,
        }
    }
}

impl<E> fmt::Debug for TraversalOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalOptions")
            .field("direction", &self.direction)
            .field("max_depth", &self.max_depth)
            .field("edge_types", &self.edge_types)
            .field("node_types", &self.node_types)
            .field("weight", &self.weight)
            .field("directed", &self.directed)
            .finish()
    }
}

impl<E> Default for TraversalOptions<E> {
    fn default() -> Self {
        Self {
            direction: TraversalDirection::default(),
            max_depth: None,
            edge_types: None,
            node_types: None,
            weight: WeightConfig::default(),
            directed: None,
        }
    }
}

impl<E: EdgeData> TraversalOptions<E> {
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Default::default()
        }
    }

    pub fn direction(mut self, direction: TraversalDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn edge_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.edge_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn node_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.node_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn weight(mut self, weight: WeightConfig<E>) -> Self {
        self.weight = weight;
        self
    }

    pub fn undirected(mut self) -> Self {
        self.directed = Some(false);
        self
    }

    /// Direction after applying the `directed` override.
    pub fn effective_direction(&self) -> TraversalDirection {
        match self.directed {
            Some(false) => TraversalDirection::Both,
            _ => self.direction,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.weight.validate()
    }
}

/// Traversal options plus the two endpoints of a path query.
pub struct PathfindingOptions<E = Edge> {
    pub source_id: String,
    pub target_id: String,
    pub traversal: TraversalOptions<E>,
}

impl<E> Clone for PathfindingOptions<E> {
    fn clone(&self) -> Self {
        Self {
            source_id: self.source_id.clone(),
            target_id: self.target_id.clone(),
            traversal: self.traversal.clone(),
        }
    }
}

impl<E> fmt::Debug for PathfindingOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathfindingOptions")
            .field("source_id", &self.source_id)
            .field("target_id", &self.target_id)
            .field("traversal", &self.traversal)
            .finish()
    }
}

impl<E: EdgeData> PathfindingOptions<E> {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            traversal: TraversalOptions::default(),
        }
    }

    pub fn traversal(mut self, traversal: TraversalOptions<E>) -> Self {
        self.traversal = traversal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_property_and_default() {
        let cfg: WeightConfig = WeightConfig::default();
        let weighted = Edge::new("e", "a", "b").with_weight(3.0);
        let bare = Edge::new("f", "a", "b");
        assert_eq!(cfg.weight(Some(&weighted)), 3.0);
        assert_eq!(cfg.weight(Some(&bare)), 1.0);
        assert_eq!(cfg.weight(None), 1.0);
    }

    #[test]
    fn test_weight_score_property() {
        let cfg: WeightConfig = WeightConfig::property(EdgeProperty::Score).with_default_weight(0.5);
        let scored = Edge::new("e", "a", "b").with_score(0.9).with_weight(7.0);
        assert_eq!(cfg.weight(Some(&scored)), 0.9);
        assert_eq!(cfg.weight(Some(&Edge::new("f", "a", "b"))), 0.5);
    }

    #[test]
    fn test_weight_inverted() {
        let cfg: WeightConfig = WeightConfig::default().inverted();
        assert_eq!(cfg.weight(Some(&Edge::new("e", "a", "b").with_weight(4.0))), 0.25);
        assert_eq!(cfg.weight(Some(&Edge::new("e", "a", "b").with_weight(0.0))), f64::INFINITY);
    }

    #[test]
    fn test_weight_custom() {
        let cfg: WeightConfig = WeightConfig::custom(|e: &Edge| e.id.len() as f64);
        assert_eq!(cfg.weight(Some(&Edge::new("abc", "a", "b"))), 3.0);
    }

    #[test]
    fn test_effective_direction_override() {
        let opts: TraversalOptions = TraversalOptions::default().direction(TraversalDirection::Incoming);
        assert_eq!(opts.effective_direction(), TraversalDirection::Incoming);
        assert_eq!(opts.undirected().effective_direction(), TraversalDirection::Both);
    }

    #[test]
    fn test_non_finite_default_weight_rejected() {
        let opts: TraversalOptions =
            TraversalOptions::default().weight(WeightConfig::default().with_default_weight(f64::NAN));
        assert!(matches!(opts.validate(), Err(CoreError::InvalidConfiguration(_))));
    }
}
