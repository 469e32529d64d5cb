//! Generator configuration

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, GeneratorResult};

/// Public combination endpoint
pub const DEFAULT_ORACLE_URL: &str = "https://neal.fun/api/infinite-craft/pair";

/// What a run does when one pair or task fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run on the first failure
    #[default]
    FailFast,
    /// Record the failure in the output and keep going
    Isolate,
}

impl FromStr for FailurePolicy {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(Self::FailFast),
            "isolate" => Ok(Self::Isolate),
            other => Err(GeneratorError::config(format!(
                "Unknown failure policy '{other}'. Valid options: fail-fast, isolate"
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::Isolate => write!(f, "isolate"),
        }
    }
}

/// Configuration for a generator and the runs it performs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub oracle_url: String,
    /// Sustained oracle queries per second
    pub rate_per_second: f64,
    /// Queries that may be issued back to back before the rate applies
    pub burst: u32,
    /// Tasks processed concurrently
    pub workers: usize,
    /// Tasks buffered between the enumerator and the workers
    pub task_queue_capacity: usize,
    pub request_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
    /// Write every recipe the oracle returns back into the store
    pub persist_recipes: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            oracle_url: DEFAULT_ORACLE_URL.to_string(),
            rate_per_second: 2.0,
            burst: 1,
            workers: 1,
            task_queue_capacity: 16,
            request_timeout_ms: 30_000,
            failure_policy: FailurePolicy::FailFast,
            persist_recipes: false,
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by any `RECIPE_*` environment variables that are set
    pub fn from_env() -> GeneratorResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("RECIPE_ORACLE_URL") {
            config.oracle_url = url;
        }
        if let Some(rate) = parse_env("RECIPE_RATE_PER_SECOND")? {
            config.rate_per_second = rate;
        }
        if let Some(burst) = parse_env("RECIPE_BURST")? {
            config.burst = burst;
        }
        if let Some(workers) = parse_env("RECIPE_WORKERS")? {
            config.workers = workers;
        }
        if let Some(capacity) = parse_env("RECIPE_TASK_QUEUE_CAPACITY")? {
            config.task_queue_capacity = capacity;
        }
        if let Some(timeout) = parse_env("RECIPE_REQUEST_TIMEOUT_MS")? {
            config.request_timeout_ms = timeout;
        }
        if let Some(policy) = parse_env("RECIPE_FAILURE_POLICY")? {
            config.failure_policy = policy;
        }
        if let Some(persist) = parse_env("RECIPE_PERSIST")? {
            config.persist_recipes = persist;
        }

        Ok(config)
    }

    pub fn validate(&self) -> GeneratorResult<()> {
        if !self.rate_per_second.is_finite() || self.rate_per_second <= 0.0 {
            return Err(GeneratorError::config(format!(
                "rate_per_second must be a positive number, got {}",
                self.rate_per_second
            )));
        }
        if self.burst == 0 {
            return Err(GeneratorError::config("burst must be at least 1"));
        }
        if self.workers == 0 {
            return Err(GeneratorError::config("workers must be at least 1"));
        }
        if self.task_queue_capacity == 0 {
            return Err(GeneratorError::config("task_queue_capacity must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(GeneratorError::config("request_timeout_ms must be at least 1"));
        }
        reqwest::Url::parse(&self.oracle_url)
            .map_err(|e| GeneratorError::config(format!("Invalid oracle URL '{}': {}", self.oracle_url, e)))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_env<T>(key: &str) -> GeneratorResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| GeneratorError::config(format!("Invalid {key} '{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}
