//! Near-duplicate suppression for over-fetched backend hits.

use retrieval_core::similar::{is_similar, NEAR_DUPLICATE_THRESHOLD};

/// Strip the leading title segment from a " | "-joined passage text.
///
/// Comparison happens on the second segment only; a text without one is
/// compared whole.
fn strip_title(long_text: &str) -> &str {
    long_text.split(" | ").nth(1).unwrap_or(long_text)
}

/// Order-preserving near-duplicate filter over a stream of passages.
///
/// Feed passages in backend rank order. The first passage is always
/// admitted; each later passage is admitted only when its title-stripped
/// text is not a near-duplicate of any previously admitted passage.
pub struct SimilarityFilter {
    threshold: f64,
    kept: Vec<String>,
}

impl SimilarityFilter {
    /// Create a filter with the given similarity threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            kept: Vec::new(),
        }
    }

    /// Decide whether `long_text` survives, recording it when it does.
    pub fn admit(&mut self, long_text: &str) -> bool {
        let body = strip_title(long_text);
        if self
            .kept
            .iter()
            .any(|seen| is_similar(body, seen, self.threshold))
        {
            return false;
        }
        self.kept.push(body.to_string());
        true
    }
}

impl Default for SimilarityFilter {
    fn default() -> Self {
        Self::new(NEAR_DUPLICATE_THRESHOLD)
    }
}
