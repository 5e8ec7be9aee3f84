//! Dense vector retrieval over a nearest-neighbour search engine.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use retrieval_core::{assign_probs, Passage, Result, RetrievalError, Retriever};

use crate::corpus::{value_as_text, Corpus};
use crate::dedup::SimilarityFilter;

/// One raw hit from a vector index.
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// Engine-side document id.
    pub docid: String,

    /// Similarity score, higher is better.
    pub score: f64,
}

/// A nearest-neighbour index the dense adapter can query.
pub trait VectorIndex: Send + Sync {
    /// Search the index, returning up to `k` hits best-first.
    ///
    /// `threads` is a parallelism hint for the engine.
    fn search(&self, query: &str, k: usize, threads: usize) -> Result<Vec<VectorHit>>;

    /// Raw JSON payload stored for `docid`, when the index keeps payloads.
    ///
    /// `Ok(None)` means the id is unknown. The default implementation
    /// reports the capability as missing.
    fn doc(&self, docid: &str) -> Result<Option<String>> {
        let _ = docid;
        Err(RetrievalError::dependency_missing(
            "document lookup",
            "this vector index stores no payloads; construct the retriever with a companion corpus",
        ))
    }
}

/// Field mapping and search options for the dense adapter.
#[derive(Debug, Clone)]
pub struct DenseOptions {
    /// Field holding the document id in corpus rows and stored payloads.
    pub id_field: String,

    /// Content fields joined with " | " to form the passage text.
    pub text_fields: Vec<String>,

    /// Parallelism hint passed to the index on every search.
    pub threads: usize,
}

impl Default for DenseOptions {
    fn default() -> Self {
        Self {
            id_field: "_id".to_string(),
            text_fields: vec!["text".to_string()],
            threads: 16,
        }
    }
}

/// Retrieval adapter mapping vector index hits into [`Passage`] records.
///
/// Hit ids resolve to text either through a companion [`Corpus`] (for
/// locally built indexes) or through the index's own stored payloads.
pub struct DenseRetriever {
    index: Box<dyn VectorIndex>,
    corpus: Option<Corpus>,
    id_to_row: HashMap<String, usize>,
    options: DenseOptions,
}

impl DenseRetriever {
    /// Adapter over an index that stores its own document payloads.
    pub fn new(index: Box<dyn VectorIndex>, options: DenseOptions) -> Self {
        Self {
            index,
            corpus: None,
            id_to_row: HashMap::new(),
            options,
        }
    }

    /// Adapter over a locally built index with a companion corpus.
    ///
    /// The id-to-row table is built here, once, so per-hit resolution is
    /// constant-time. Every corpus row must carry the id field.
    pub fn with_corpus(
        index: Box<dyn VectorIndex>,
        corpus: Corpus,
        options: DenseOptions,
    ) -> Result<Self> {
        let mut id_to_row = HashMap::with_capacity(corpus.len());
        for row in 0..corpus.len() {
            let id = corpus.string_field(row, &options.id_field).ok_or_else(|| {
                RetrievalError::configuration(format!(
                    "corpus row {} is missing id field {:?}",
                    row, options.id_field
                ))
            })?;
            id_to_row.insert(id, row);
        }

        Ok(Self {
            index,
            corpus: Some(corpus),
            id_to_row,
            options,
        })
    }

    /// Resolve a hit id to `(passage id, joined text)`.
    fn resolve(&self, docid: &str) -> Result<(String, String)> {
        match &self.corpus {
            Some(corpus) => self.resolve_from_corpus(corpus, docid),
            None => self.resolve_from_payload(docid),
        }
    }

    fn resolve_from_corpus(&self, corpus: &Corpus, docid: &str) -> Result<(String, String)> {
        let row = *self.id_to_row.get(docid).ok_or_else(|| {
            RetrievalError::backend(
                "dense",
                format!("document {} is not present in the companion corpus", docid),
            )
        })?;

        let mut segments = Vec::with_capacity(self.options.text_fields.len());
        for field in &self.options.text_fields {
            let value = corpus.string_field(row, field).ok_or_else(|| {
                RetrievalError::backend(
                    "dense",
                    format!("corpus row {} is missing content field {:?}", row, field),
                )
            })?;
            segments.push(value);
        }

        Ok((docid.to_string(), segments.join(" | ")))
    }

    fn resolve_from_payload(&self, docid: &str) -> Result<(String, String)> {
        let raw = self.index.doc(docid)?.ok_or_else(|| {
            RetrievalError::backend("dense", format!("document {} not found in index", docid))
        })?;
        let payload: Map<String, Value> = serde_json::from_str(&raw).map_err(|e| {
            RetrievalError::backend(
                "dense",
                format!("malformed payload for document {}: {}", docid, e),
            )
        })?;

        let mut segments = Vec::with_capacity(self.options.text_fields.len());
        for field in &self.options.text_fields {
            let value = payload.get(field).and_then(value_as_text).ok_or_else(|| {
                RetrievalError::backend(
                    "dense",
                    format!("payload for document {} is missing field {:?}", docid, field),
                )
            })?;
            segments.push(value);
        }

        let pid = payload
            .get(&self.options.id_field)
            .and_then(value_as_text)
            .unwrap_or_else(|| docid.to_string());

        Ok((pid, segments.join(" | ")))
    }
}

impl fmt::Debug for DenseRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseRetriever")
            .field("corpus", &self.corpus.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl Retriever for DenseRetriever {
    fn search(&self, query: &str, k: usize, remove_similar: bool) -> Result<Vec<Passage>> {
        let fetch_k = if remove_similar { k * 2 } else { k };
        let hits = self.index.search(query, fetch_k, self.options.threads)?;

        debug!(hits = hits.len(), k, remove_similar, "dense search");

        let mut kept = Vec::with_capacity(k.min(hits.len()));
        let mut filter = SimilarityFilter::default();

        for (position, hit) in hits.iter().enumerate() {
            if kept.len() == k {
                break;
            }
            let (pid, joined) = self.resolve(&hit.docid)?;
            let passage = Passage::from_joined(pid, joined, hit.score, position + 1);
            if remove_similar && !filter.admit(&passage.long_text) {
                debug!(id = %passage.id, rank = passage.rank, "dropped near-duplicate passage");
                continue;
            }
            kept.push(passage);
        }

        assign_probs(&mut kept);
        Ok(kept)
    }
}
