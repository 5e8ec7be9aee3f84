//! Benchmark dataset loaders.
//!
//! # Features
//!
//! - NQ-open question answering splits loaded straight from the
//!   distribution zip archive
//! - Optional filtering to examples with exactly one accepted answer
//!
//! # Example
//!
//! ```rust,ignore
//! use retrieval_datasets::NaturalQuestionsOpen;
//!
//! let dataset = NaturalQuestionsOpen::load("open-domain-qa-data.zip", true)?;
//! println!("{} training questions", dataset.train.len());
//! ```

mod nq_open;

pub use nq_open::{NaturalQuestionsOpen, QaExample};
