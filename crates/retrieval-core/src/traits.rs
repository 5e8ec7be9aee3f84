//! Capability traits implemented by search collaborators.

use crate::error::Result;
use crate::types::Passage;

/// A search backend that returns ranked passages for a query.
///
/// Implementations are synchronous and shareable across threads; callers
/// that need parallelism run searches from their own threads.
pub trait Retriever: Send + Sync {
    /// Fetch up to `k` ranked passages for `query`.
    ///
    /// With `remove_similar` the backend over-fetches twice as many raw
    /// hits and drops near-duplicates before returning. Survivors keep
    /// their raw ranks, so the result may be shorter than `k`.
    fn search(&self, query: &str, k: usize, remove_similar: bool) -> Result<Vec<Passage>>;
}

/// Scores candidate passage texts against a query; higher is better.
pub trait Reranker: Send + Sync {
    /// Score each candidate text against `query`.
    ///
    /// Returns one score per candidate, in candidate order.
    fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRetriever;

    impl Retriever for FixedRetriever {
        fn search(&self, _query: &str, k: usize, _remove_similar: bool) -> Result<Vec<Passage>> {
            Ok((1..=k)
                .map(|rank| {
                    Passage::new(
                        format!("d{}", rank),
                        "title",
                        format!("body {}", rank),
                        1.0 / rank as f64,
                        rank,
                    )
                })
                .collect())
        }
    }

    struct ConstantReranker;

    impl Reranker for ConstantReranker {
        fn score(&self, _query: &str, candidates: &[String]) -> Result<Vec<f64>> {
            Ok(vec![0.5; candidates.len()])
        }
    }

    #[test]
    fn test_retriever_as_trait_object() {
        let retriever: Box<dyn Retriever> = Box::new(FixedRetriever);
        let passages = retriever.search("q", 3, false).unwrap();
        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].rank, 1);
        assert_eq!(passages[2].id, "d3");
    }

    #[test]
    fn test_reranker_scores_parallel_to_candidates() {
        let reranker: Box<dyn Reranker> = Box::new(ConstantReranker);
        let candidates = vec!["a".to_string(), "b".to_string()];
        let scores = reranker.score("q", &candidates).unwrap();
        assert_eq!(scores.len(), candidates.len());
    }

    #[test]
    fn test_trait_objects_are_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Retriever>();
        assert_send_sync::<dyn Reranker>();
    }
}
