//! Corpus storage backends
//!
//! The corpus holds canonical example phrasings for each template family,
//! with their embeddings. It is written once by a seeding step and is
//! read-only on the interpretation path.
//!
//! # Storage Model
//!
//! Each stored item consists of:
//! - Example: the owning template family and the phrasing text
//! - Embedding: the vector representation of the text
//!
//! Items are keyed by `(family, text)`; inserting the same key again replaces
//! the earlier embedding.
//!
//! # Usage
//!
//! ```ignore
//! use kickoff_lib::store::{canonical_corpus, CorpusStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.insert(&examples, &embeddings)?;
//!
//! // Nearest phrasings, closest first
//! let neighbors = store.search(&query_embedding, 5)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::embed::Embedding;
use crate::template::TemplateFamily;
use crate::Result;

/// A canonical phrasing owned by one template family.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorpusExample {
    pub family: TemplateFamily,
    pub text: String,
}

impl CorpusExample {
    pub fn new(family: TemplateFamily, text: impl Into<String>) -> Self {
        Self {
            family,
            text: text.into(),
        }
    }
}

/// A nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The matched example
    #[serde(flatten)]
    pub example: CorpusExample,
    /// Non-negative dissimilarity (lower is more similar)
    pub distance: f32,
}

/// Trait for corpus storage backends
pub trait CorpusStore: Send + Sync {
    /// Insert examples with their embeddings
    ///
    /// # Arguments
    /// * `examples` - The phrasings to store
    /// * `embeddings` - Corresponding embeddings (must be same length)
    fn insert(&mut self, examples: &[CorpusExample], embeddings: &[Embedding]) -> Result<()>;

    /// Find the examples nearest to a query
    ///
    /// # Returns
    /// At most `k` neighbours sorted by distance (closest first); fewer when
    /// the corpus is small
    fn search(&self, query_embedding: &Embedding, k: usize) -> Result<Vec<Neighbor>>;

    /// Get total number of stored examples
    fn len(&self) -> usize;

    /// Check if store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored data
    fn clear(&mut self);
}

mod corpus;
mod memory;

pub use corpus::*;
pub use memory::*;
