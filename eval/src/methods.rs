//! Built-in ranking methods for experiments.
//!
//! A method scores every candidate path; higher scores rank first.

use std::collections::HashMap;
use std::sync::Arc;

use pathrank_core::{score_path, Edge, Graph, Path, RankingOptions, ReadableGraph, TraversalMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPath {
    pub path: Path,
    pub score: f64,
}

/// Ranking function: `(graph, candidates) -> scored candidates`.
pub type Ranker = Arc<dyn Fn(&Graph, &[Path]) -> Vec<ScoredPath> + Send + Sync>;

/// MI score with length penalty `lambda`, weights multiplied in.
pub fn mi_method(lambda: f64) -> Ranker {
    Arc::new(move |graph: &Graph, candidates: &[Path]| {
        let mode = if graph.is_directed() {
            TraversalMode::Directed
        } else {
            TraversalMode::Undirected
        };
        let options: RankingOptions = RankingOptions::default()
            .with_lambda(lambda)
            .with_traversal_mode(mode);
        candidates
            .iter()
            .map(|path| ScoredPath {
                path: path.clone(),
                score: score_path(graph, path, &options).score,
            })
            .collect()
    })
}

/// Mean `weight` of the path's edges (1 when missing).
pub fn weight_method() -> Ranker {
    Arc::new(|graph: &Graph, candidates: &[Path]| {
        let by_id: HashMap<&str, &Edge> = graph.edges().iter().map(|e| (e.id.as_str(), e)).collect();
        candidates
            .iter()
            .map(|path| {
                let score = if path.edges.is_empty() {
                    0.0
                } else {
                    let total: f64 = path
                        .edges
                        .iter()
                        .map(|id| by_id.get(id.as_str()).and_then(|e| e.weight).unwrap_or(1.0))
                        .sum();
                    total / path.edges.len() as f64
                };
                ScoredPath {
                    path: path.clone(),
                    score,
                }
            })
            .collect()
    })
}

/// Shorter paths first.
pub fn shortest_first_method() -> Ranker {
    Arc::new(|_: &Graph, candidates: &[Path]| {
        candidates
            .iter()
            .map(|path| ScoredPath {
                path: path.clone(),
                score: -(path.length() as f64),
            })
            .collect()
    })
}

/// Hub-avoiding: negated mean degree of the path's nodes.
pub fn degree_method() -> Ranker {
    Arc::new(|graph: &Graph, candidates: &[Path]| {
        candidates
            .iter()
            .map(|path| {
                let total: usize = path.nodes.iter().map(|id| graph.degree(id)).sum();
                let mean = total as f64 / path.nodes.len().max(1) as f64;
                ScoredPath {
                    path: path.clone(),
                    score: -mean,
                }
            })
            .collect()
    })
}

/// Uniform random scores; the same seed gives the same scores for the
/// same candidate list.
pub fn random_method(seed: u64) -> Ranker {
    Arc::new(move |_: &Graph, candidates: &[Path]| {
        let mut rng = StdRng::seed_from_u64(seed);
        candidates
            .iter()
            .map(|path| ScoredPath {
                path: path.clone(),
                score: rng.gen::<f64>(),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Graph, Vec<Path>) {
        let mut g: Graph = Graph::undirected();
        g.connect("a", "b").weight = Some(5.0);
        g.connect("b", "c").weight = Some(3.0);
        g.connect("a", "hub");
        g.connect("hub", "c");
        for i in 0..6 {
            g.connect("hub", &format!("leaf{}", i));
        }
        let heavy = Path::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["e0".into(), "e1".into()],
        );
        let via_hub = Path::new(
            vec!["a".into(), "hub".into(), "c".into()],
            vec!["e2".into(), "e3".into()],
        );
        let direct = Path::new(vec!["a".into(), "b".into()], vec!["e0".into()]);
        (g, vec![heavy, via_hub, direct])
    }

    fn scores(ranker: &Ranker) -> Vec<f64> {
        let (g, candidates) = fixture();
        ranker(&g, &candidates).into_iter().map(|s| s.score).collect()
    }

    #[test]
    fn test_weight_method_means_edge_weights() {
        assert_eq!(scores(&weight_method()), vec![4.0, 1.0, 5.0]);
    }

    #[test]
    fn test_shortest_first_method() {
        assert_eq!(scores(&shortest_first_method()), vec![-2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_degree_method_penalizes_hubs() {
        let s = scores(&degree_method());
        assert!(s[0] > s[1]);
    }

    #[test]
    fn test_mi_method_prefers_heavy_edges() {
        let s = scores(&mi_method(0.0));
        assert!(s[0] > s[1]);
        let penalized = scores(&mi_method(10.0));
        assert!(penalized[2] > penalized[0]);
    }

    #[test]
    fn test_random_method_is_seeded() {
        assert_eq!(scores(&random_method(3)), scores(&random_method(3)));
        assert_ne!(scores(&random_method(3)), scores(&random_method(4)));
    }

    #[test]
    fn test_methods_keep_candidate_order() {
        let (g, candidates) = fixture();
        for ranker in [mi_method(0.5), weight_method(), degree_method(), random_method(1)] {
            let scored = ranker(&g, &candidates);
            let paths: Vec<Path> = scored.into_iter().map(|s| s.path).collect();
            assert_eq!(paths, candidates);
        }
    }
}
