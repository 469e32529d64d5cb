//! Generator-specific data types

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Recipe, RunId};

/// Item names reported by the oracle as never produced before
pub type DiscoverySet = BTreeSet<String>;

/// One left item and every right item it still has to be paired with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTask {
    pub left: String,
    pub candidates: Vec<String>,
}

impl PairTask {
    pub fn pair_count(&self) -> usize {
        self.candidates.len()
    }
}

/// Oracle response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleResponse {
    pub result: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
}

/// A parsed oracle answer for one pair
#[derive(Debug, Clone, PartialEq)]
pub struct OracleAnswer {
    pub recipe: Recipe,
    pub is_new: bool,
}

/// A pair (or a whole task, when `right` is `None`) that failed under the isolate policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFailure {
    pub left: String,
    pub right: Option<String>,
    pub reason: String,
    pub retryable: bool,
}

/// Counters for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub tasks: usize,
    pub pairs_considered: usize,
    pub pairs_known: usize,
    pub pairs_queried: usize,
}

/// Everything a generation run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub recipes: Vec<Recipe>,
    pub discoveries: DiscoverySet,
    pub failures: Vec<PairFailure>,
    pub summary: RunSummary,
}
