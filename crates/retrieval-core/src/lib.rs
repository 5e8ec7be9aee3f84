//! retrieval-core - Core types and traits for passage retrieval
//!
//! This crate provides the passage data model, the capability traits
//! implemented by search collaborators, the explicit settings object that
//! wires them together, error handling, and the character n-gram
//! similarity check used for near-duplicate detection.

pub mod error;
pub mod settings;
pub mod similar;
pub mod traits;
pub mod types;

pub use error::{Result, RetrievalError};
pub use settings::Settings;
pub use similar::{chrf, is_similar, NEAR_DUPLICATE_THRESHOLD};
pub use traits::*;
pub use types::*;
