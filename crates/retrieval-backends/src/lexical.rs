//! BM25 lexical retrieval over an HTTP search engine.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use retrieval_core::{assign_probs, Passage, Result, RetrievalError, Retriever};

use crate::dedup::SimilarityFilter;

/// Hits for one query, as parallel arrays in engine rank order.
#[derive(Debug, Clone, Default)]
pub struct LexicalHits {
    /// Document ids.
    pub ids: Vec<String>,

    /// Document titles, empty when the index has none.
    pub titles: Vec<String>,

    /// Document bodies.
    pub texts: Vec<String>,

    /// BM25 scores.
    pub scores: Vec<f64>,
}

impl LexicalHits {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// HTTP client for a BM25 index served by an Elasticsearch-compatible
/// cluster.
pub struct Bm25Index {
    index_name: String,
    base_url: String,
    agent: ureq::Agent,
}

impl Bm25Index {
    /// Point the client at `index_name` on the cluster at `url`.
    ///
    /// A `port` is appended to the URL when given.
    pub fn new(index_name: impl Into<String>, url: impl Into<String>, port: Option<u16>) -> Self {
        let url = url.into();
        let base_url = match port {
            Some(port) => format!("{}:{}", url, port),
            None => url,
        };

        Self {
            index_name: index_name.into(),
            base_url,
            agent: http_agent(),
        }
    }

    /// Run one BM25 search per query, returning hit arrays in rank order.
    ///
    /// `max_query_length` truncates each query to that many characters
    /// before it is sent.
    pub fn retrieve(
        &self,
        queries: &[&str],
        topk: usize,
        max_query_length: Option<usize>,
    ) -> Result<Vec<LexicalHits>> {
        queries
            .iter()
            .map(|query| self.search_one(query, topk, max_query_length))
            .collect()
    }

    fn search_one(
        &self,
        query: &str,
        topk: usize,
        max_query_length: Option<usize>,
    ) -> Result<LexicalHits> {
        let query = truncate_query(query, max_query_length);
        let url = format!("{}/{}/_search", self.base_url, self.index_name);
        let body = search_request_body(&query, topk);

        debug!(index = %self.index_name, topk, "bm25 search");

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|e| {
                RetrievalError::backend("bm25", format!("search request failed: {}", e))
            })?;
        let payload = response.into_string().map_err(|e| {
            RetrievalError::backend("bm25", format!("failed to read search response: {}", e))
        })?;

        parse_search_response(&payload)
    }
}

fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(30))
        .timeout_write(Duration::from_secs(30))
        .build()
}

/// Truncate a query to at most `limit` characters, when a limit is set.
fn truncate_query(query: &str, limit: Option<usize>) -> String {
    match limit {
        Some(limit) => query.chars().take(limit).collect(),
        None => query.to_string(),
    }
}

/// Build the `_search` request: `size` hits, BM25 match over title and text.
fn search_request_body(query: &str, topk: usize) -> String {
    serde_json::json!({
        "size": topk,
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["title", "text"],
            }
        }
    })
    .to_string()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: RawSource,
}

#[derive(Debug, Deserialize, Default)]
struct RawSource {
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

fn parse_search_response(payload: &str) -> Result<LexicalHits> {
    let parsed: SearchResponse = serde_json::from_str(payload).map_err(|e| {
        RetrievalError::backend("bm25", format!("malformed search response: {}", e))
    })?;

    let mut hits = LexicalHits::default();
    for hit in parsed.hits.hits {
        hits.ids.push(hit.id);
        hits.titles.push(hit.source.title);
        hits.texts.push(hit.source.text);
        hits.scores.push(hit.score.unwrap_or(0.0));
    }
    Ok(hits)
}

/// Retrieval adapter mapping BM25 hits into [`Passage`] records.
pub struct LexicalRetriever {
    index: Bm25Index,
    max_query_length: Option<usize>,
}

impl LexicalRetriever {
    /// Wrap a BM25 client with no query length limit.
    pub fn new(index: Bm25Index) -> Self {
        Self {
            index,
            max_query_length: None,
        }
    }

    /// Truncate queries to `limit` characters before sending them.
    pub fn with_max_query_length(mut self, limit: usize) -> Self {
        self.max_query_length = Some(limit);
        self
    }
}

impl Retriever for LexicalRetriever {
    fn search(&self, query: &str, k: usize, remove_similar: bool) -> Result<Vec<Passage>> {
        let fetch_k = if remove_similar { k * 2 } else { k };
        let mut per_query = self
            .index
            .retrieve(&[query], fetch_k, self.max_query_length)?;
        let hits = per_query.pop().unwrap_or_default();

        Ok(map_hits(hits, k, remove_similar))
    }
}

/// Turn raw hit arrays into ranked passages, optionally dropping
/// near-duplicates, keeping at most `k`.
///
/// Ranks follow the raw hit positions, so filtered output keeps strictly
/// increasing ranks with gaps where duplicates were dropped.
fn map_hits(hits: LexicalHits, k: usize, remove_similar: bool) -> Vec<Passage> {
    let mut kept = Vec::with_capacity(k.min(hits.len()));
    let mut filter = SimilarityFilter::default();

    for position in 0..hits.len() {
        if kept.len() == k {
            break;
        }
        let passage = Passage::new(
            hits.ids[position].clone(),
            hits.titles[position].clone(),
            hits.texts[position].clone(),
            hits.scores[position],
            position + 1,
        );
        if remove_similar && !filter.admit(&passage.long_text) {
            debug!(id = %passage.id, rank = passage.rank, "dropped near-duplicate passage");
            continue;
        }
        kept.push(passage);
    }

    assign_probs(&mut kept);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(rows: Vec<(&str, &str, &str, f64)>) -> LexicalHits {
        let mut hits = LexicalHits::default();
        for (id, title, text, score) in rows {
            hits.ids.push(id.to_string());
            hits.titles.push(title.to_string());
            hits.texts.push(text.to_string());
            hits.scores.push(score);
        }
        hits
    }

    #[test]
    fn test_base_url_includes_port_when_given() {
        let with_port = Bm25Index::new("wiki", "http://localhost", Some(9200));
        assert_eq!(with_port.base_url, "http://localhost:9200");

        let without_port = Bm25Index::new("wiki", "http://search.internal", None);
        assert_eq!(without_port.base_url, "http://search.internal");
    }

    #[test]
    fn test_search_request_body_shape() {
        let body: serde_json::Value =
            serde_json::from_str(&search_request_body("eiffel tower", 5)).unwrap();
        assert_eq!(body["size"], 5);
        assert_eq!(body["query"]["multi_match"]["query"], "eiffel tower");
        assert_eq!(body["query"]["multi_match"]["fields"][0], "title");
    }

    #[test]
    fn test_truncate_query_applies_character_limit() {
        assert_eq!(truncate_query("eiffel tower paris", Some(6)), "eiffel");
        assert_eq!(truncate_query("short", Some(64)), "short");
    }

    #[test]
    fn test_truncate_query_counts_characters_not_bytes() {
        assert_eq!(truncate_query("café de flore", Some(4)), "café");
    }

    #[test]
    fn test_truncate_query_without_limit_keeps_query() {
        assert_eq!(
            truncate_query("unbounded query text", None),
            "unbounded query text"
        );
    }

    #[test]
    fn test_with_max_query_length_sets_limit() {
        let index = Bm25Index::new("wiki", "http://localhost", None);
        let retriever = LexicalRetriever::new(index).with_max_query_length(96);
        assert_eq!(retriever.max_query_length, Some(96));
    }

    #[test]
    fn test_parse_search_response() {
        let payload = r#"{
            "hits": {
                "hits": [
                    {"_id": "d1", "_score": 11.5, "_source": {"title": "Paris", "text": "Capital of France."}},
                    {"_id": "d2", "_score": 9.25, "_source": {"title": "Lyon", "text": "On the Rhone."}}
                ]
            }
        }"#;
        let hits = parse_search_response(payload).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.ids, vec!["d1", "d2"]);
        assert_eq!(hits.titles[0], "Paris");
        assert_eq!(hits.scores[1], 9.25);
    }

    #[test]
    fn test_parse_search_response_null_score_and_missing_source() {
        let payload = r#"{"hits": {"hits": [{"_id": "d1", "_score": null}]}}"#;
        let hits = parse_search_response(payload).unwrap();
        assert_eq!(hits.scores[0], 0.0);
        assert_eq!(hits.titles[0], "");
        assert_eq!(hits.texts[0], "");
    }

    #[test]
    fn test_parse_search_response_malformed_is_backend_error() {
        let err = parse_search_response("<html>busy</html>").unwrap_err();
        assert!(matches!(err, RetrievalError::Backend { .. }));
    }

    #[test]
    fn test_map_hits_assigns_increasing_ranks_and_probs() {
        let passages = map_hits(
            hits(vec![
                ("d1", "A", "First body.", 3.0),
                ("d2", "B", "Second body.", 2.0),
                ("d3", "C", "Third body.", 1.0),
            ]),
            3,
            false,
        );

        assert_eq!(passages.len(), 3);
        assert_eq!(
            passages.iter().map(|p| p.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(passages[0].long_text, "A | First body.");

        let prob_sum: f64 = passages.iter().map(|p| p.prob.unwrap()).sum();
        assert!((prob_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_map_hits_truncates_to_k() {
        let passages = map_hits(
            hits(vec![
                ("d1", "A", "First body.", 3.0),
                ("d2", "B", "Second body.", 2.0),
                ("d3", "C", "Third body.", 1.0),
            ]),
            2,
            false,
        );
        assert_eq!(passages.len(), 2);
    }

    #[test]
    fn test_map_hits_drops_near_duplicates_and_keeps_raw_ranks() {
        let passages = map_hits(
            hits(vec![
                ("d1", "A", "The treaty was signed in 1648 ending the long war.", 3.0),
                ("d2", "B", "The treaty was signed in 1648 ending the long war.", 2.0),
                ("d3", "C", "A completely different passage about rivers.", 1.0),
            ]),
            2,
            true,
        );

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].id, "d1");
        assert_eq!(passages[1].id, "d3");
        // Survivors keep their raw positions.
        assert_eq!(passages[0].rank, 1);
        assert_eq!(passages[1].rank, 3);
    }

    #[test]
    fn test_map_hits_returns_short_when_few_survive() {
        let body = "Identical content repeated across every hit in the list.";
        let passages = map_hits(
            hits(vec![
                ("d1", "A", body, 3.0),
                ("d2", "B", body, 2.0),
                ("d3", "C", body, 1.0),
            ]),
            2,
            true,
        );
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].id, "d1");
    }
}
