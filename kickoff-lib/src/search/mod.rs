//! High-level search and interpretation interface
//!
//! Combines embedder, corpus store, and classifier into a unified API.
//!
//! # Usage
//!
//! ```ignore
//! use kickoff_lib::search::SearchEngine;
//!
//! // Similarity search over the canonical corpus
//! let mut engine = SearchEngine::new(embedder, store);
//! engine.seed()?;
//! let neighbors = engine.search("no back-to-back road games", 5)?;
//!
//! // Lexically re-ranked shortlist, fused with the detectors
//! let mut engine = SearchEngine::with_rerank(embedder, store, LexicalReranker);
//! engine.seed()?;
//! let result = engine.interpret("each team gets at least 4 home games")?;
//! ```

mod fusion;

pub use fusion::*;

use tracing::{debug, warn};

use crate::classify::{detect_all, validate_query, ClassificationResult, Classifier, Thresholds};
use crate::embed::Embedder;
use crate::rerank::{NoReranker, Reranker};
use crate::store::{canonical_corpus, CorpusExample, CorpusStore, Neighbor};
use crate::Result;

/// Interpretation engine combining embedding, corpus storage, optional
/// re-ranking, and the heuristic classifier.
pub struct SearchEngine<E: Embedder, S: CorpusStore, R: Reranker = NoReranker> {
    embedder: E,
    store: S,
    reranker: Option<R>,
    classifier: Classifier,
    fusion: FusionConfig,
}

// Constructor for engines without re-ranking
impl<E: Embedder, S: CorpusStore> SearchEngine<E, S, NoReranker> {
    /// Create a new engine without re-ranking.
    #[must_use]
    pub fn new(embedder: E, store: S) -> Self {
        Self {
            embedder,
            store,
            reranker: None,
            classifier: Classifier::new(),
            fusion: FusionConfig::default(),
        }
    }
}

impl<E: Embedder, S: CorpusStore, R: Reranker> SearchEngine<E, S, R> {
    /// Create a new engine with re-ranking enabled.
    #[must_use]
    pub fn with_rerank(embedder: E, store: S, reranker: R) -> Self {
        Self {
            embedder,
            store,
            reranker: Some(reranker),
            classifier: Classifier::new(),
            fusion: FusionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    /// Embed examples and store them.
    pub fn index(&mut self, examples: &[CorpusExample]) -> Result<()> {
        if examples.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&texts)?;
        self.store.insert(examples, &embeddings)?;

        debug!(
            count = examples.len(),
            model = self.embedder.model_name(),
            "indexed corpus examples"
        );
        Ok(())
    }

    /// Index the built-in canonical corpus.
    pub fn seed(&mut self) -> Result<()> {
        self.index(&canonical_corpus())
    }

    /// Nearest corpus phrasings by embedding similarity alone.
    pub fn search(&mut self, query: &str, k: usize) -> Result<Vec<Neighbor>> {
        let query_embedding = self.embedder.embed_query(query)?;
        self.store.search(&query_embedding, k)
    }

    /// Two-stage search: retrieve `n` candidates, re-rank, keep the best `k`.
    ///
    /// Falls back to basic search if no re-ranker is configured.
    pub fn search_reranked(&mut self, query: &str, k: usize, n: usize) -> Result<Vec<Neighbor>> {
        let query_embedding = self.embedder.embed_query(query)?;

        let Some(reranker) = &self.reranker else {
            return self.store.search(&query_embedding, k);
        };

        let candidates = self.store.search(&query_embedding, n.max(k))?;
        let mut ranked = reranker.rerank(query, candidates);
        ranked.truncate(k);
        Ok(ranked)
    }

    /// Interpret a query by fusing detector scores with the re-ranked
    /// shortlist.
    ///
    /// Blank queries are rejected before any embedding call. With an empty
    /// corpus the detectors decide alone.
    pub fn interpret(&mut self, query: &str) -> Result<ClassificationResult> {
        let query = validate_query(query)?;
        let detector = detect_all(query);

        if self.store.is_empty() {
            warn!("corpus is empty, interpreting with detectors only");
            return self.classifier.classify_with_scores(query, detector);
        }

        let shortlist = self.search_reranked(query, self.fusion.top_k, self.fusion.candidates)?;
        let fused = fuse_scores(&detector, &shortlist, self.fusion.similarity_weight);
        debug!(?shortlist, ?fused, "fused family scores");

        self.classifier.classify_with_scores(query, fused)
    }

    /// Interpret a query with the detectors alone; no embedding call.
    pub fn classify_local(&self, query: &str) -> Result<ClassificationResult> {
        self.classifier.classify(query)
    }

    #[must_use]
    pub fn thresholds(&self) -> &Thresholds {
        self.classifier.thresholds()
    }

    /// Returns the number of indexed examples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no examples are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
