//! Runtime wiring of search collaborators.

use std::fmt;
use std::sync::Arc;

use crate::traits::{Reranker, Retriever};

/// Explicit registry of the collaborators a retrieval pipeline may use.
///
/// Built once, passed to every component that needs backend access.
/// Clones are cheap and share the underlying collaborators.
#[derive(Clone, Default)]
pub struct Settings {
    retriever: Option<Arc<dyn Retriever>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl Settings {
    /// Create empty settings with no collaborators configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the retriever backend.
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Attach the reranker.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// The configured retriever, if any.
    pub fn retriever(&self) -> Option<&dyn Retriever> {
        self.retriever.as_deref()
    }

    /// The configured reranker, if any.
    pub fn reranker(&self) -> Option<&dyn Reranker> {
        self.reranker.as_deref()
    }

    /// Whether a retriever is configured.
    pub fn has_retriever(&self) -> bool {
        self.retriever.is_some()
    }

    /// Whether a reranker is configured.
    pub fn has_reranker(&self) -> bool {
        self.reranker.is_some()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("retriever", &self.retriever.is_some())
            .field("reranker", &self.reranker.is_some())
            .finish()
    }
}
