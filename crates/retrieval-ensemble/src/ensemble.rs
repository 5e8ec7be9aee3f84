//! Merging per-query retrieval into one ranked passage list.

use std::collections::HashMap;

use tracing::debug;

use retrieval_core::{Reranker, Result, RetrievalError, Settings};

/// Over-fetch multiplier applied per query inside an ensemble.
const ENSEMBLE_FETCH_FACTOR: usize = 3;

/// Options for the score/probability ensemble.
#[derive(Debug, Clone)]
pub struct EnsembleOptions {
    /// Aggregate passage probabilities instead of raw scores.
    pub by_prob: bool,

    /// Ask the backend to drop near-duplicates (single-query path only).
    pub remove_similar: bool,
}

impl Default for EnsembleOptions {
    fn default() -> Self {
        Self {
            by_prob: true,
            remove_similar: false,
        }
    }
}

/// Retrieve ranked passage texts for a single query.
///
/// With a reranker configured, the passages are re-scored against the
/// query and re-sorted descending. The sort is stable, so ties keep the
/// backend order.
pub fn retrieve(
    settings: &Settings,
    query: &str,
    k: usize,
    remove_similar: bool,
) -> Result<Vec<String>> {
    let retriever = settings
        .retriever()
        .ok_or_else(|| RetrievalError::configuration("no retriever is configured"))?;

    let passages = retriever.search(query, k, remove_similar)?;
    let mut texts: Vec<String> = passages.into_iter().map(|p| p.long_text).collect();

    if let Some(reranker) = settings.reranker() {
        let scores = score_candidates(reranker, query, &texts)?;
        let mut order: Vec<usize> = (0..texts.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        texts = order.into_iter().map(|i| texts[i].clone()).collect();
    }

    Ok(texts)
}

/// Merge multiple queries by reranker score.
///
/// Each query's over-fetched passages are scored against that query; a
/// passage text seen under several queries accumulates one score per
/// sighting and ranks by the arithmetic mean of its scores.
pub fn retrieve_rerank_ensemble(
    settings: &Settings,
    queries: &[String],
    k: usize,
) -> Result<Vec<String>> {
    let (retriever, reranker) = match (settings.retriever(), settings.reranker()) {
        (Some(retriever), Some(reranker)) => (retriever, reranker),
        _ => {
            return Err(RetrievalError::configuration(
                "a rerank ensemble needs both a retriever and a reranker",
            ))
        }
    };

    let live_queries = non_blank(queries);
    debug!(queries = live_queries.len(), k, "rerank ensemble");

    let mut accumulated: HashMap<String, Vec<f64>> = HashMap::new();
    for query in live_queries {
        let passages = retriever.search(query, k * ENSEMBLE_FETCH_FACTOR, false)?;
        let texts: Vec<String> = passages.into_iter().map(|p| p.long_text).collect();
        let scores = score_candidates(reranker, query, &texts)?;
        for (text, score) in texts.into_iter().zip(scores) {
            accumulated.entry(text).or_default().push(score);
        }
    }

    let means: HashMap<String, f64> = accumulated
        .into_iter()
        .map(|(text, scores)| {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            (text, mean)
        })
        .collect();

    Ok(rank_top_k(means, k))
}

/// Merge multiple queries by summed score or probability.
///
/// Routing: a configured reranker takes over the merge entirely; a single
/// live query goes through the direct path; no live queries yields an
/// empty list without touching the backend. Otherwise each query is
/// over-fetched and contributions accumulate per passage text.
pub fn retrieve_ensemble(
    settings: &Settings,
    queries: &[String],
    k: usize,
    options: &EnsembleOptions,
) -> Result<Vec<String>> {
    let retriever = settings
        .retriever()
        .ok_or_else(|| RetrievalError::configuration("no retriever is configured"))?;

    if settings.has_reranker() {
        return retrieve_rerank_ensemble(settings, queries, k);
    }

    let live_queries = non_blank(queries);
    if live_queries.len() == 1 {
        return retrieve(settings, live_queries[0], k, options.remove_similar);
    }

    debug!(
        queries = live_queries.len(),
        k,
        by_prob = options.by_prob,
        "score ensemble"
    );

    let mut summed: HashMap<String, f64> = HashMap::new();
    for query in live_queries {
        for passage in retriever.search(query, k * ENSEMBLE_FETCH_FACTOR, false)? {
            let contribution = if options.by_prob {
                passage.prob.ok_or_else(|| {
                    RetrievalError::configuration(format!(
                        "passage {} has no probability; aggregating by probability needs a retriever that fills in prob",
                        passage.id
                    ))
                })?
            } else {
                passage.score
            };
            *summed.entry(passage.long_text).or_insert(0.0) += contribution;
        }
    }

    Ok(rank_top_k(summed, k))
}

fn non_blank(queries: &[String]) -> Vec<&String> {
    queries.iter().filter(|q| !q.trim().is_empty()).collect()
}

fn score_candidates(reranker: &dyn Reranker, query: &str, texts: &[String]) -> Result<Vec<f64>> {
    let scores = reranker.score(query, texts)?;
    if scores.len() != texts.len() {
        return Err(RetrievalError::backend(
            "reranker",
            format!(
                "{} scores returned for {} candidates",
                scores.len(),
                texts.len()
            ),
        ));
    }
    Ok(scores)
}

/// Final ranking shared by the ensembles: sort `(score, text)` pairs
/// descending and keep the top `k` texts. Equal scores rank by descending
/// text.
fn rank_top_k(scored: HashMap<String, f64>, k: usize) -> Vec<String> {
    let mut pairs: Vec<(f64, String)> = scored
        .into_iter()
        .map(|(text, score)| (score, text))
        .collect();
    pairs.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(k);
    pairs.into_iter().map(|(_, text)| text).collect()
}
