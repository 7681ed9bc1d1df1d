use std::time::Instant;

use pathrank_core::{
    bfs, bidirectional_search, rank_paths, shortest_weighted_path, BidirectionalOptions, Graph,
    MaterializedExpander, Node, PathfindingOptions, RankingOptions, ReadableGraph, TraversalOptions,
};
use pathrank_eval::methods::{
    degree_method, mi_method, random_method, shortest_first_method, weight_method,
};
use pathrank_eval::{
    generate_markdown_report, generators, list_benchmarks, load_benchmark, run_experiment,
    ExperimentConfig, Metric, PlantingConfig, TestType,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

type Generator = fn(usize) -> Graph;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: pathrank-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run every mode below (default)");
        println!("  traversal   BFS depth sweep and weighted shortest path per topology");
        println!("  search      Bidirectional search between distant nodes");
        println!("  rank        MI path ranking, shortest-only vs bounded enumeration");
        println!("  experiment  Planted-path experiment on the karate club, Markdown report");
        println!("  datasets    Load and validate every registered benchmark dataset");
        println!();
        println!("Default node_count: 10000");
        println!("Log level: RUST_LOG (default info)");
        return;
    }

    println!("pathrank-bench");
    println!("==============");
    println!();

    match mode {
        "traversal" => run_traversal(node_count),
        "search" => run_search(node_count).await,
        "rank" => run_rank(node_count),
        "experiment" => run_planted_experiment(),
        "datasets" => run_datasets(),
        "all" => {
            run_traversal(node_count);
            run_search(node_count).await;
            run_rank(node_count);
            run_datasets();
            run_planted_experiment();
        }
        _ => eprintln!("Unknown mode: {}. Use --help for options.", mode),
    }
}

fn topologies() -> Vec<(&'static str, Generator)> {
    vec![
        ("L-system tree", gen_lsystem as Generator),
        ("Scale-free (preferential attachment)", gen_scale_free),
        ("Small-world (Watts-Strogatz)", gen_small_world),
        ("Erdos-Renyi random", gen_random),
        ("Barbell (clique-bridge-clique)", gen_barbell),
    ]
}

fn gen_lsystem(n: usize) -> Graph {
    generators::lsystem_tree(n, 3, 42)
}

fn gen_scale_free(n: usize) -> Graph {
    generators::scale_free(n, 5, 12345)
}

fn gen_small_world(n: usize) -> Graph {
    generators::small_world(n, 5, 0.05, 67890)
}

fn gen_random(n: usize) -> Graph {
    generators::erdos_renyi(n, 10, 54321)
}

/// Clique size is capped so the dense halves stay tractable.
fn gen_barbell(n: usize) -> Graph {
    let clique = (n.saturating_sub(10) / 2).min(200);
    generators::barbell(clique, 10, 99999)
}

fn generate(name: &str, generator: Generator, node_count: usize) -> Graph {
    println!("--- {} ---", name);
    let t = Instant::now();
    let graph = generator(node_count);
    println!(
        "Generated in {:.2}s, {} nodes, {} edges",
        t.elapsed().as_secs_f64(),
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

fn last_node(graph: &Graph) -> String {
    graph.node_count().saturating_sub(1).to_string()
}

fn run_traversal(node_count: usize) {
    for (name, generator) in topologies() {
        let graph = generate(name, generator, node_count);

        println!();
        println!("{:>8} {:>12} {:>10}", "depth", "visited", "time");
        println!("{:->8} {:->12} {:->10}", "", "", "");
        for depth in [1, 2, 3, 5, 10, 20, 50] {
            let t = Instant::now();
            let result = bfs(&graph, "0", &TraversalOptions::with_depth(depth));
            println!(
                "{:>8} {:>12} {:>8.1}ms",
                depth,
                result.nodes_visited(),
                t.elapsed().as_secs_f64() * 1000.0
            );
            if result.nodes_visited() >= graph.node_count() {
                println!("{:>8} (entire graph reached)", "");
                break;
            }
        }

        let far = last_node(&graph);
        let t = Instant::now();
        let path = shortest_weighted_path(&graph, &PathfindingOptions::new("0", far.as_str()));
        let ms = t.elapsed().as_secs_f64() * 1000.0;
        println!();
        match path {
            Ok(Some(p)) => println!(
                "Shortest path 0 -> {}: {} hops, cost {:.1} in {:.1}ms",
                far,
                p.path.length(),
                p.cost,
                ms
            ),
            Ok(None) => println!("Shortest path 0 -> {}: no path ({:.1}ms)", far, ms),
            Err(e) => println!("Shortest path 0 -> {}: {}", far, e),
        }
        println!();
    }
}

async fn run_search(node_count: usize) {
    let graph = generate("Bidirectional search (scale-free)", gen_scale_free, node_count);
    let far = last_node(&graph);
    let mut expander = MaterializedExpander::new(&graph);

    let t = Instant::now();
    let options = BidirectionalOptions::default();
    let result = bidirectional_search::<Node, _>(&mut expander, "0", &far, &options).await;
    let ms = t.elapsed().as_secs_f64() * 1000.0;
    match result {
        Ok(r) => {
            println!(
                "0 <-> {}: {} paths in {} iterations, visited {} / {}, {} edges discovered, {:.1}ms",
                far,
                r.paths.len(),
                r.iterations,
                r.visited_a.len(),
                r.visited_b.len(),
                expander.discovered_edges.len(),
                ms
            );
            for path in r.paths.iter().take(5) {
                println!("  {}", path.join(" -> "));
            }
        }
        Err(e) => println!("0 <-> {}: {}", far, e),
    }
    println!();
}

fn run_rank(node_count: usize) {
    let graph = generate("Path ranking (small-world)", gen_small_world, node_count.min(5_000));
    let target = (graph.node_count() / 50).max(1).to_string();

    let runs: [(&str, RankingOptions); 3] = [
        ("shortest only", RankingOptions::default()),
        (
            "max_length 6, lambda 0",
            RankingOptions::default().with_shortest_only(false).with_max_length(6),
        ),
        (
            "max_length 6, lambda 0.1",
            RankingOptions::default()
                .with_shortest_only(false)
                .with_max_length(6)
                .with_lambda(0.1),
        ),
    ];

    for (label, options) in runs {
        let t = Instant::now();
        let ranked = rank_paths(&graph, "0", &target, &options);
        let ms = t.elapsed().as_secs_f64() * 1000.0;
        match ranked {
            Ok(Some(paths)) => {
                let best = &paths[0];
                println!(
                    "{:<26} {:>5} paths, best score {:.4} (length {}) in {:.1}ms",
                    label,
                    paths.len(),
                    best.score,
                    best.path.length(),
                    ms
                );
            }
            Ok(None) => println!("{:<26} no path ({:.1}ms)", label, ms),
            Err(e) => println!("{:<26} {}", label, e),
        }
    }
    println!();
}

fn run_datasets() {
    println!("--- Benchmark datasets ---");
    for meta in list_benchmarks() {
        let t = Instant::now();
        match load_benchmark(meta.id) {
            Ok(loaded) => println!(
                "{:<14} {:>6} nodes {:>6} edges {:>3} warnings  {:.1}ms",
                meta.id,
                loaded.graph.node_count(),
                loaded.graph.edge_count(),
                loaded.warnings.len(),
                t.elapsed().as_secs_f64() * 1000.0
            ),
            Err(e) => error!(dataset = meta.id, error = %e, "dataset failed to load"),
        }
    }
    println!();
}

fn run_planted_experiment() {
    let dataset = match load_benchmark("karate") {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "karate dataset unavailable");
            return;
        }
    };

    let config = ExperimentConfig::new("MI ranking vs baselines")
        .with_graph_spec(dataset.meta.name)
        .with_repetitions(20)
        .with_planting(PlantingConfig {
            num_paths: 4,
            noise_paths: 30,
            ..Default::default()
        })
        .with_method("mi", mi_method(0.0))
        .with_method("mi-lambda-0.1", mi_method(0.1))
        .with_method("edge-weight", weight_method())
        .with_method("shortest-first", shortest_first_method())
        .with_method("hub-avoiding", degree_method())
        .with_method("random", random_method(7))
        .with_metrics([
            Metric::Spearman,
            Metric::Kendall,
            Metric::Ndcg,
            Metric::Map,
            Metric::Mrr,
            Metric::PrecisionAt(4),
            Metric::RecallAt(10),
        ])
        .with_tests([TestType::PairedTTest, TestType::WilcoxonSignedRank]);

    match run_experiment(&config, &dataset.graph) {
        Ok(report) => println!("{}", generate_markdown_report(&report)),
        Err(e) => error!(error = %e, "experiment failed"),
    }
}
