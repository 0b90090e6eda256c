use std::collections::BTreeMap;

use crate::embed::Embedding;
use crate::store::{CorpusExample, CorpusStore, Neighbor};
use crate::{Error, Result};

/// In-memory corpus store.
///
/// Uses brute-force cosine distance. The canonical corpus is a few dozen
/// phrasings, far below the point where an index would pay off.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<CorpusExample, Embedding>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CorpusStore for MemoryStore {
    fn insert(&mut self, examples: &[CorpusExample], embeddings: &[Embedding]) -> Result<()> {
        if examples.len() != embeddings.len() {
            return Err(Error::Store(format!(
                "{} examples but {} embeddings",
                examples.len(),
                embeddings.len()
            )));
        }
        for (example, embedding) in examples.iter().zip(embeddings) {
            self.entries.insert(example.clone(), embedding.clone());
        }
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<Neighbor>> {
        let mut neighbors = Vec::with_capacity(self.entries.len());

        for (example, embedding) in &self.entries {
            if embedding.len() != query.len() {
                return Err(Error::Store(format!(
                    "query has {} dimensions but stored embedding has {}",
                    query.len(),
                    embedding.len()
                )));
            }
            neighbors.push(Neighbor {
                example: example.clone(),
                distance: cosine_distance(query, embedding),
            });
        }

        // Stable sort keeps key order among equal distances
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Compute cosine distance between two vectors.
///
/// Returns `1 - cosine similarity`, a value in [0, 2] where 0 means identical
/// direction. A zero vector has no direction and gets distance 1.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}
