//! Error types for the retrieval pipeline.

use thiserror::Error;

/// Result type alias using RetrievalError.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval pipeline.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// A required collaborator is missing or wired inconsistently.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An external search engine call failed or returned unusable data.
    #[error("Backend error ({backend}): {message}")]
    Backend { backend: String, message: String },

    /// An optional capability was exercised without its supporting dependency.
    #[error("Missing dependency for {capability}: {message}")]
    DependencyMissing { capability: String, message: String },

    /// Failed to load a dataset archive or file.
    #[error("Failed to load dataset from {path}: {message}")]
    DatasetLoad { path: String, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RetrievalError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a backend error.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a missing-dependency error.
    pub fn dependency_missing(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DependencyMissing {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Create a dataset load error.
    pub fn dataset_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatasetLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
