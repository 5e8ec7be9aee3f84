//! Character n-gram similarity for near-duplicate passage detection.
//!
//! Implements the chrF score: per-order character n-gram precision and
//! recall combined into an F-score with recall weighted by beta, then
//! averaged over the n-gram orders. Whitespace is stripped before counting
//! so formatting differences do not dilute the signal.

use std::collections::HashMap;

/// Highest character n-gram order considered.
pub const CHRF_MAX_ORDER: usize = 6;

/// Recall weight in the F-score (the conventional chrF beta).
pub const CHRF_BETA: f64 = 3.0;

/// Similarity above which two passages count as near-duplicates.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.95;

/// chrF similarity of `hypothesis` against `reference`, in `[0.0, 1.0]`.
///
/// Orders longer than both strings are excluded from the average, so any
/// non-empty text scores exactly 1.0 against itself regardless of length.
/// The score is not symmetric: swapping the arguments swaps precision and
/// recall, and recall carries more weight.
pub fn chrf(reference: &str, hypothesis: &str) -> f64 {
    let ref_chars = significant_chars(reference);
    let hyp_chars = significant_chars(hypothesis);
    let beta_sq = CHRF_BETA * CHRF_BETA;

    let mut total = 0.0;
    let mut effective_orders = 0usize;

    for order in 1..=CHRF_MAX_ORDER {
        let ref_total = ngram_total(ref_chars.len(), order);
        let hyp_total = ngram_total(hyp_chars.len(), order);

        // No signal at this order for either string.
        if ref_total == 0 && hyp_total == 0 {
            continue;
        }
        effective_orders += 1;

        // One side has n-grams and the other does not: zero contribution.
        if ref_total == 0 || hyp_total == 0 {
            continue;
        }

        let ref_counts = ngram_counts(&ref_chars, order);
        let hyp_counts = ngram_counts(&hyp_chars, order);

        let mut overlap = 0usize;
        for (gram, count) in &hyp_counts {
            if let Some(ref_count) = ref_counts.get(gram) {
                overlap += (*count).min(*ref_count);
            }
        }
        if overlap == 0 {
            continue;
        }

        let precision = overlap as f64 / hyp_total as f64;
        let recall = overlap as f64 / ref_total as f64;
        total += (1.0 + beta_sq) * precision * recall / (beta_sq * precision + recall);
    }

    if effective_orders == 0 {
        0.0
    } else {
        total / effective_orders as f64
    }
}

/// True when the chrF similarity of `a` against `b` strictly exceeds
/// `threshold`.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    chrf(a, b) > threshold
}

fn significant_chars(text: &str) -> Vec<char> {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn ngram_total(len: usize, order: usize) -> usize {
    if len >= order {
        len - order + 1
    } else {
        0
    }
}

fn ngram_counts(chars: &[char], order: usize) -> HashMap<&[char], usize> {
    let mut counts: HashMap<&[char], usize> = HashMap::new();
    for gram in chars.windows(order) {
        *counts.entry(gram).or_default() += 1;
    }
    counts
}
