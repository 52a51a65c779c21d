use aegis_weights::evolution::{
    EvolutionConfig, EvolutionEngine, FitnessFunction, MeanSquaredError, RegressionData,
};
use anyhow::Context;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use std::{env, fs, time::Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SYNTHETIC_ROWS: usize = 250;
const HOLDOUT_FRACTION: f64 = 0.2;

/// Two standardized predictors and a target that is a noisy linear mix of
/// them, standing in for the prepared price table.
fn synthetic_problem(rows: usize, seed: u64) -> anyhow::Result<RegressionData> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let standard = Normal::new(0.0, 1.0)?;
    let noise = Normal::new(0.0, 0.1)?;

    let features = Array2::from_shape_fn((rows, 2), |_| standard.sample(&mut rng));
    let target = features
        .rows()
        .into_iter()
        .map(|row| 0.7 * row[0] + 0.25 * row[1] + noise.sample(&mut rng))
        .collect::<Array1<f64>>();

    Ok(RegressionData::new(features, target)?)
}

fn load_config(path: Option<&String>) -> anyhow::Result<EvolutionConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("Invalid config in {}", path))
        }
        None => Ok(EvolutionConfig {
            global_seed: Some(42), // a classic
            ..EvolutionConfig::default()
        }),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config = load_config(args.get(1))?;
    let output_path = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "ga_result.json".to_string());

    let data = synthetic_problem(SYNTHETIC_ROWS, config.global_seed.unwrap_or(0))?;
    let train_rows = ((data.rows() as f64) * (1.0 - HOLDOUT_FRACTION)).round() as usize;
    let (train, holdout) = data.split_at(train_rows)?;
    info!(
        train_rows = train.rows(),
        holdout_rows = holdout.rows(),
        predictors = train.features().ncols(),
        "Prepared regression data"
    );

    let engine = EvolutionEngine::standard(config, MeanSquaredError::new(train))?;
    info!(
        seed = engine.seed(),
        population_size = engine.config().population_size,
        max_generations = engine.config().max_generations,
        "Starting evolution"
    );

    let start = Instant::now();
    let result = engine.run()?;
    info!(elapsed = ?start.elapsed(), seed = result.seed, "Run complete");

    let best = result
        .best()
        .context("Hall of fame is empty after the run")?;
    let holdout_mse = MeanSquaredError::new(holdout).compute(&best.genes)?;
    info!(
        weights = ?best.genes,
        train_mse = ?best.fitness,
        holdout_mse,
        "Best individual"
    );

    let json = serde_json::to_string_pretty(&result)?;
    fs::write(&output_path, json)
        .with_context(|| format!("Failed to write result to {}", output_path))?;
    info!(path = %output_path, "Result written");

    Ok(())
}
