//! heaptune - JVM heap auto-tuner CLI
//!
//! # Usage
//!
//! ```bash
//! # Tune with defaults (image "jvm-test-image", 6x6 search, 128-1024 MB)
//! heaptune
//!
//! # Explicit everything, machine-readable output
//! heaptune --image my-service --population 8 --generations 10 \
//!          --min-heap-mb 256 --max-heap-mb 4096 --repeats 3 --json
//! ```
//!
//! # Environment Variables
//!
//! - `HEAPTUNE_CONFIG`: Path to a TOML config file (flags still override)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use heaptune::{DockerOracle, Optimizer, SearchParams, TunerConfig};

#[derive(Parser, Debug)]
#[command(name = "heaptune")]
#[command(about = "Hybrid bacterial-swarm (BFO + PSO) auto-tuner for JVM heap sizing")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides the standard search order)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Docker image containing the benchmarked JVM workload
    #[arg(long)]
    image: Option<String>,

    /// Swarm population size
    #[arg(long)]
    population: Option<usize>,

    /// Number of generations
    #[arg(long)]
    generations: Option<usize>,

    /// Lower search bound for both heap parameters (MB)
    #[arg(long)]
    min_heap_mb: Option<i64>,

    /// Upper search bound for both heap parameters (MB)
    #[arg(long)]
    max_heap_mb: Option<i64>,

    /// Probe repeats per measurement (averaged)
    #[arg(long)]
    repeats: Option<u32>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Print the result as JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => TunerConfig::load_from_file(path.as_ref())
            .with_context(|| format!("loading config from {path}"))?,
        None => TunerConfig::load(),
    };

    // CLI flags win over file values
    if let Some(image) = args.image {
        config.image = image;
    }
    if let Some(population) = args.population {
        config.population = population;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(min_heap_mb) = args.min_heap_mb {
        config.min_heap_mb = min_heap_mb;
    }
    if let Some(max_heap_mb) = args.max_heap_mb {
        config.max_heap_mb = max_heap_mb;
    }
    if let Some(repeats) = args.repeats {
        config.repeats = repeats;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    config.validate().context("validating configuration")?;

    info!(
        image = %config.image,
        population = config.population,
        generations = config.generations,
        min_heap_mb = config.min_heap_mb,
        max_heap_mb = config.max_heap_mb,
        repeats = config.repeats,
        seed = ?config.seed,
        "Starting heap tuning run"
    );

    let oracle = DockerOracle::new(config.image.clone(), config.repeats);
    let params = SearchParams {
        population: config.population,
        generations: config.generations,
        low_bound: config.min_heap_mb,
        high_bound: config.max_heap_mb,
    };
    let result = Optimizer::new(params, oracle, config.seed)
        .run()
        .await
        .context("optimization run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Best found: -Xms{}m -Xmx{}m | cost={:.4} | time={:.1}ms mem={:.1}MB",
            result.min_heap_mb,
            result.max_heap_mb,
            result.cost,
            result.duration_ms,
            result.used_memory_mb
        );
    }

    Ok(())
}
