//! Generator binary entry point

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use generator::{
    input, FailurePolicy, Generator, GeneratorConfig, GeneratorError, GeneratorResult, HttpOracle, MemoryRecipeStore,
    RecipeStore,
};
use shared::logging;

#[derive(Parser)]
#[command(name = "generator")]
#[command(about = "Discover new item recipes by combining known items through a rate-limited oracle")]
struct Args {
    /// Comma separated seed items, e.g. "Water,Fire,Wind,Earth"
    #[arg(long, conflicts_with = "seeds_file")]
    seeds: Option<String>,

    /// File with seed items (JSON array or one name per line)
    #[arg(long)]
    seeds_file: Option<PathBuf>,

    /// JSON array of already known recipes to preload
    #[arg(long)]
    known_recipes: Option<PathBuf>,

    /// Oracle endpoint (overrides RECIPE_ORACLE_URL)
    #[arg(long)]
    oracle_url: Option<String>,

    /// Sustained queries per second (overrides RECIPE_RATE_PER_SECOND)
    #[arg(long)]
    rate: Option<f64>,

    /// Burst size (overrides RECIPE_BURST)
    #[arg(long)]
    burst: Option<u32>,

    /// Concurrent tasks (overrides RECIPE_WORKERS)
    #[arg(long)]
    workers: Option<usize>,

    /// Failure policy (overrides RECIPE_FAILURE_POLICY)
    #[arg(long, value_enum)]
    policy: Option<FailurePolicy>,

    /// Per-request timeout in milliseconds (overrides RECIPE_REQUEST_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Write oracle results back into the store as they arrive
    #[arg(long)]
    persist: bool,

    /// Environment file to load before reading RECIPE_* variables
    #[arg(long)]
    env: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print how ITEM is made from the seeds and known recipes, without querying the oracle
    #[arg(long, value_name = "ITEM")]
    tree: Option<String>,

    /// Write the JSON result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn apply_overrides(&self, config: &mut GeneratorConfig) {
        if let Some(url) = &self.oracle_url {
            config.oracle_url = url.clone();
        }
        if let Some(rate) = self.rate {
            config.rate_per_second = rate;
        }
        if let Some(burst) = self.burst {
            config.burst = burst;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(policy) = self.policy {
            config.failure_policy = policy;
        }
        if let Some(timeout) = self.timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if self.persist {
            config.persist_recipes = true;
        }
    }

    fn seeds(&self) -> GeneratorResult<Vec<String>> {
        let seeds = match (&self.seeds, &self.seeds_file) {
            (Some(list), _) => input::split_seed_list(list),
            (None, Some(path)) => input::load_seeds_file(path)?,
            (None, None) if self.tree.is_some() => Vec::new(),
            (None, None) => return Err(GeneratorError::config("one of --seeds or --seeds-file is required")),
        };
        if seeds.is_empty() && self.tree.is_none() {
            return Err(GeneratorError::config("no seed items given"));
        }
        Ok(seeds)
    }
}

async fn write_output(path: Option<&PathBuf>, json: String) -> GeneratorResult<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            info!("💾 Wrote result to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_env_file(path: Option<&PathBuf>) -> GeneratorResult<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map_err(|e| GeneratorError::config(format!("Failed to load {}: {}", path.display(), e))),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(GeneratorError::config(format!("Failed to load .env: {e}"))),
        },
    }
}

#[tokio::main]
async fn main() -> GeneratorResult<()> {
    let args = Args::parse();

    load_env_file(args.env.as_ref())?;
    logging::init_tracing_with_level(Some(&args.log_level));

    let mut config = GeneratorConfig::from_env()?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let seeds = args.seeds()?;
    logging::log_startup(&format!(
        "recipe generator: {} seeds, {} q/s (burst {}), {} workers, {}",
        seeds.len(),
        config.rate_per_second,
        config.burst,
        config.workers,
        config.failure_policy
    ));
    debug!("Oracle endpoint: {}", config.oracle_url);

    let store = MemoryRecipeStore::new();
    store.insert_items(seeds.iter().cloned()).await;
    if let Some(path) = &args.known_recipes {
        let recipes = input::load_known_recipes(path)?;
        let imported = store.import_recipes(recipes).await;
        info!("📚 Loaded {} known recipes from {}", imported, path.display());
    }

    if let Some(item) = &args.tree {
        let tree = store.recipe_tree(item).await?;
        info!("🌳 {} takes {} combination steps", item, tree.depth());
        return write_output(args.output.as_ref(), serde_json::to_string_pretty(&tree)?).await;
    }

    let oracle = HttpOracle::from_config(&config)?;
    let generator = Generator::new(config, store, oracle)?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logging::log_shutdown("interrupt received, cancelling run");
                ctrl_c_token.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let output = generator.generate(seeds, &cancel).await?;
    info!("💾 {} recipes, {} discoveries", output.recipes.len(), output.discoveries.len());
    write_output(args.output.as_ref(), serde_json::to_string_pretty(&output)?).await
}
