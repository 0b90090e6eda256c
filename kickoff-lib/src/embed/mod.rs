//! Text embedding providers
//!
//! Two providers are available:
//! - [`BgeEmbedder`]: local ONNX inference via the fastembed crate
//! - [`JinaEmbedder`]: the Jina AI embeddings HTTP API
//!
//! Any failure (download, network, auth, rate limit, malformed response)
//! surfaces as [`Error::Embedding`](crate::Error::Embedding) and is terminal
//! for the request that triggered it.
//!
//! # Usage
//!
//! ```ignore
//! use kickoff_lib::embed::{BgeEmbedder, Embedder};
//!
//! let mut embedder = BgeEmbedder::new()?;
//!
//! // Embed corpus phrasings (for indexing)
//! let doc_embeddings = embedder.embed_documents(&["Schedule rivalry games on weekends"])?;
//!
//! // Embed a query (for searching)
//! let query_embedding = embedder.embed_query("two rivalry games on ESPN")?;
//! ```

use crate::Result;

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Returns one vector per input, in input order.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Some models use different prompts or tasks for queries vs documents.
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod bge;
mod jina;

pub use bge::*;
pub use jina::*;
