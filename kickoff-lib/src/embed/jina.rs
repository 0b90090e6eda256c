use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Jina AI embeddings endpoint.
pub const JINA_ENDPOINT: &str = "https://api.jina.ai/v1/embeddings";
/// Environment variable holding the Jina API key.
pub const JINA_API_KEY_ENV: &str = "JINA_API_KEY";

const QUERY_TASK: &str = "retrieval.query";
const PASSAGE_TASK: &str = "retrieval.passage";

/// Settings for [`JinaEmbedder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JinaConfig {
    pub endpoint: String,
    pub model: String,
    /// Falls back to the `JINA_API_KEY` environment variable when unset
    pub api_key: Option<String>,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

impl Default for JinaConfig {
    fn default() -> Self {
        Self {
            endpoint: JINA_ENDPOINT.to_string(),
            model: "jina-embeddings-v3".to_string(),
            api_key: None,
            dimensions: 1024,
            timeout_secs: 30,
        }
    }
}

/// Embedder backed by the Jina AI embeddings API.
///
/// Queries and corpus phrasings are embedded with the `retrieval.query` and
/// `retrieval.passage` tasks respectively. Calls are single-shot: there is no
/// retry, and any failure is returned to the caller.
pub struct JinaEmbedder {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    task: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl JinaEmbedder {
    /// Create an embedder from configuration.
    pub fn from_config(config: &JinaConfig) -> Result<Self> {
        let api_key = resolve_api_key(
            config.api_key.as_deref(),
            std::env::var(JINA_API_KEY_ENV).ok(),
        )?;

        if config.timeout_secs == 0 {
            return Err(Error::Embedding("timeout must be > 0".to_string()));
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        Ok(Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            dimension: config.dimensions,
        })
    }

    fn request(&self, texts: &[&str], task: &str) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            task,
            dimensions: self.dimension,
        };

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_json(&request)
            .map_err(error_from_ureq)?;

        let body: EmbeddingResponse = response
            .into_json()
            .map_err(|e| Error::Embedding(format!("failed to parse response: {e}")))?;

        order_embeddings(body.data, texts.len())
    }
}

impl Embedder for JinaEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.request(texts, PASSAGE_TASK)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.request(&[text], QUERY_TASK)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("provider returned no embeddings".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn resolve_api_key(explicit: Option<&str>, from_env: Option<String>) -> Result<String> {
    explicit
        .map(str::to_string)
        .or(from_env)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            Error::Embedding(format!(
                "API key not provided and {JINA_API_KEY_ENV} env var not set"
            ))
        })
}

/// Put embeddings back in input order and check one came back per input.
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Embedding>> {
    if data.len() != expected {
        warn!(expected, received = data.len(), "embedding count mismatch");
        return Err(Error::Embedding(format!(
            "expected {expected} embeddings, provider returned {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(Error::Embedding("provider returned duplicate indices".to_string()));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

fn error_from_ureq(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(401 | 403, _) => {
            Error::Embedding("authentication rejected by embedding provider".to_string())
        }
        ureq::Error::Status(429, _) => {
            Error::Embedding("rate limited by embedding provider".to_string())
        }
        ureq::Error::Status(status, response) => {
            let detail = response
                .into_string()
                .unwrap_or_else(|_| "unknown error".to_string());
            Error::Embedding(format!("provider error ({status}): {detail}"))
        }
        ureq::Error::Transport(transport) => {
            Error::Embedding(format!("request failed: {transport}"))
        }
    }
}
