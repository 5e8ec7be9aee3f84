//! Multi-query ensemble retrieval.
//!
//! # Features
//!
//! - Single-query retrieval with optional reranker re-sorting
//! - Reranker ensemble ranking passages by mean score across queries
//! - Score/probability ensemble summing contributions per passage
//! - [`RetrieveStage`] wrapping the ensemble behind one `forward` call
//!
//! # Example
//!
//! ```rust,ignore
//! use retrieval_ensemble::{RetrieveStage, Settings};
//!
//! let settings = Settings::new().with_retriever(retriever);
//! let stage = RetrieveStage::with_k(settings, 5);
//! let result = stage.forward("who wrote the iliad")?;
//! for text in result.passages {
//!     println!("{}", text);
//! }
//! ```

mod ensemble;
mod stage;

pub use ensemble::{retrieve, retrieve_ensemble, retrieve_rerank_ensemble, EnsembleOptions};
pub use stage::{RetrieveStage, StageState, DEFAULT_K};

// Re-export for convenience
pub use retrieval_core::{QueryInput, Retrieval, Settings};
