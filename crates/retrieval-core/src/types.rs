//! Core domain types for passage retrieval.

use serde::{Deserialize, Serialize};

/// A passage returned by a search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Backend-assigned identifier (document id or corpus row id).
    pub id: String,

    /// Passage title, empty when the backend has no title field.
    #[serde(default)]
    pub title: String,

    /// Raw passage body.
    pub text: String,

    /// Canonical downstream text: content fields joined with " | ".
    pub long_text: String,

    /// Backend-native relevance score; not comparable across backends.
    pub score: f64,

    /// 1-based position in the backend's raw ranking.
    pub rank: usize,

    /// Probability-normalized score over the returned batch, when available.
    #[serde(default)]
    pub prob: Option<f64>,
}

impl Passage {
    /// Create a passage from a separate title and body.
    ///
    /// `long_text` becomes `"{title} | {text}"`, or just the body when the
    /// title is empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        score: f64,
        rank: usize,
    ) -> Self {
        let title = title.into();
        let text = text.into();
        let long_text = if title.is_empty() {
            text.clone()
        } else {
            format!("{} | {}", title, text)
        };

        Self {
            id: id.into(),
            title,
            text,
            long_text,
            score,
            rank,
            prob: None,
        }
    }

    /// Create a passage whose content fields are already joined with " | ".
    ///
    /// The joined string doubles as both `text` and `long_text`; `title`
    /// stays empty.
    pub fn from_joined(
        id: impl Into<String>,
        joined: impl Into<String>,
        score: f64,
        rank: usize,
    ) -> Self {
        let joined = joined.into();

        Self {
            id: id.into(),
            title: String::new(),
            text: joined.clone(),
            long_text: joined,
            score,
            rank,
            prob: None,
        }
    }
}

/// Fill in `prob` for a batch of passages as a softmax over their scores.
///
/// Uses the max-subtraction form so large scores cannot overflow the
/// exponentials. An empty batch is left untouched.
pub fn assign_probs(passages: &mut [Passage]) {
    if passages.is_empty() {
        return;
    }

    let max = passages
        .iter()
        .map(|p| p.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let denom: f64 = passages.iter().map(|p| (p.score - max).exp()).sum();

    for passage in passages.iter_mut() {
        passage.prob = Some((passage.score - max).exp() / denom);
    }
}

/// One query or an ordered batch of queries.
#[derive(Debug, Clone)]
pub enum QueryInput {
    /// A single free-text query.
    Single(String),

    /// An ordered batch of queries merged downstream.
    Batch(Vec<String>),
}

impl QueryInput {
    /// Flatten into an ordered list of queries.
    pub fn into_queries(self) -> Vec<String> {
        match self {
            Self::Single(query) => vec![query],
            Self::Batch(queries) => queries,
        }
    }
}

impl From<&str> for QueryInput {
    fn from(query: &str) -> Self {
        Self::Single(query.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(query: String) -> Self {
        Self::Single(query)
    }
}

impl From<Vec<String>> for QueryInput {
    fn from(queries: Vec<String>) -> Self {
        Self::Batch(queries)
    }
}

impl From<Vec<&str>> for QueryInput {
    fn from(queries: Vec<&str>) -> Self {
        Self::Batch(queries.into_iter().map(String::from).collect())
    }
}

/// Ranked passage texts produced by a retrieve stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retrieval {
    /// Ranked `long_text` values, best first, at most `k` entries.
    pub passages: Vec<String>,
}
