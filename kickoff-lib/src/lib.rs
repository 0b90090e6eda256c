//! Kickoff - natural-language interpretation of sports-scheduling constraints
//!
//! Turns free-text requests such as "no team plays more than 2 away games in
//! a row" into one of three canonical constraint templates, with extracted
//! parameters and a rendered sentence.
//!
//! # Architecture
//!
//! ```text
//! Query -> Extract ------------------------------+
//!   |                                            |
//!   +----> Detectors (rule tables) --+           v
//!   |                                +-> Classify -> Render -> Outcome
//!   +----> Embedder -> Store -> Rerank --+  (fused scores)
//!                       ^
//! Canonical corpus -----+
//! ```
//!
//! The embedding path is optional: [`classify::Classifier`] works on the
//! detectors alone, [`search::SearchEngine::interpret`] fuses both.
//!
//! # Example
//!
//! ```ignore
//! use kickoff_lib::{classify::Classifier, render::render_outcome};
//!
//! let classifier = Classifier::new();
//! let result = classifier.classify("Schedule at least 2 rivalry games on weekends on ESPN")?;
//! let outcome = render_outcome(&result, classifier.thresholds(), false);
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! ```

pub mod classify;
pub mod embed;
pub mod error;
pub mod extract;
pub mod render;
pub mod rerank;
pub mod search;
pub mod store;
pub mod template;

pub use error::{Error, Result};
