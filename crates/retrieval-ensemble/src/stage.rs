//! A reusable retrieval stage over the configured backend.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use retrieval_core::{QueryInput, Result, Retrieval, Settings};

use crate::ensemble::{retrieve_ensemble, EnsembleOptions};

/// Passages returned per call unless overridden.
pub const DEFAULT_K: usize = 3;

/// Retrieval stage bound to a [`Settings`] instance.
///
/// Accepts one query or a batch, normalizes each to its first line, and
/// merges the per-query results into a single ranked list.
pub struct RetrieveStage {
    settings: Settings,
    k: usize,
    remove_similar: bool,
    stage: String,
}

/// Serializable snapshot of a stage's tunable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageState {
    /// Number of passages returned per call.
    pub k: usize,
}

impl RetrieveStage {
    /// Create a stage returning [`DEFAULT_K`] passages per call.
    pub fn new(settings: Settings) -> Self {
        Self::with_k(settings, DEFAULT_K)
    }

    /// Create a stage returning `k` passages per call.
    pub fn with_k(settings: Settings, k: usize) -> Self {
        Self {
            settings,
            k,
            remove_similar: false,
            stage: random_stage_tag(),
        }
    }

    /// Ask the backend to drop near-duplicate passages.
    pub fn remove_similar(mut self, enabled: bool) -> Self {
        self.remove_similar = enabled;
        self
    }

    /// Identifier distinguishing this stage instance in logs.
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Number of passages returned per call.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Change the number of passages returned per call.
    pub fn set_k(&mut self, k: usize) {
        self.k = k;
    }

    /// Run retrieval for the given query or queries.
    pub fn forward(&self, input: impl Into<QueryInput>) -> Result<Retrieval> {
        let queries: Vec<String> = input
            .into()
            .into_queries()
            .into_iter()
            .map(|q| normalize_query(&q))
            .collect();

        debug!(stage = %self.stage, queries = queries.len(), k = self.k, "forward");

        let options = EnsembleOptions {
            remove_similar: self.remove_similar,
            ..EnsembleOptions::default()
        };
        let passages = retrieve_ensemble(&self.settings, &queries, self.k, &options)?;
        Ok(Retrieval { passages })
    }

    /// Snapshot the tunable state for persistence.
    pub fn dump_state(&self) -> StageState {
        StageState { k: self.k }
    }

    /// Restore tunable state from a snapshot.
    pub fn load_state(&mut self, state: &StageState) {
        self.k = state.k;
    }
}

/// Queries are single-line: trim, then keep only the first line.
fn normalize_query(raw: &str) -> String {
    raw.trim().lines().next().unwrap_or("").trim().to_string()
}

fn random_stage_tag() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    hex::encode(bytes)
}
