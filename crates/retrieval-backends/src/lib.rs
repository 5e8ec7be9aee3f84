//! retrieval-backends - Search backend adapters
//!
//! This crate adapts concrete search engines into the [`Retriever`]
//! capability: a lexical BM25 index reached over HTTP, and a dense vector
//! index queried through the [`VectorIndex`] trait with passage text
//! resolved from a companion corpus or from stored payloads.
//!
//! # Features
//!
//! - BM25 search against an Elasticsearch-compatible `_search` endpoint
//! - Dense nearest-neighbour search over any [`VectorIndex`] implementation
//! - Near-duplicate suppression with over-fetching (2k raw hits)
//! - Batch probability normalization for downstream ensembling
//!
//! # Example
//!
//! ```rust,ignore
//! use retrieval_backends::{Bm25Index, LexicalRetriever};
//! use retrieval_core::Retriever;
//!
//! let index = Bm25Index::new("wiki", "http://localhost", Some(9200));
//! let retriever = LexicalRetriever::new(index);
//! let passages = retriever.search("eiffel tower", 3, false)?;
//! ```

mod corpus;
mod dedup;
mod dense;
mod lexical;

pub use corpus::Corpus;
pub use dedup::SimilarityFilter;
pub use dense::{DenseOptions, DenseRetriever, VectorHit, VectorIndex};
pub use lexical::{Bm25Index, LexicalHits, LexicalRetriever};

// Re-export for convenience
pub use retrieval_core::{Passage, Retriever};
