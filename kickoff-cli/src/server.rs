//! HTTP front end for the interpretation engine.
//!
//! Endpoints:
//! - POST /api/interpret  `{"query": "...", "debug": false}` -> outcome
//! - POST /api/search     `{"query": "...", "k": 5}` -> re-ranked shortlist
//!
//! A missing, non-string, or blank `query` is rejected with 400
//! `{"error":"invalid_query"}`. Embedding or store failures return 500 with a
//! fixed error code; details go to the log only.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use kickoff_lib::{
    embed::Embedder,
    render::{render_outcome, Outcome},
    rerank::LexicalReranker,
    search::SearchEngine,
    store::{MemoryStore, Neighbor},
    Error,
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

pub type Engine = SearchEngine<Box<dyn Embedder>, MemoryStore, LexicalReranker>;

const DEFAULT_K: usize = 5;
const MAX_K: usize = 50;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Mutex<Engine>>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` against the engine on the blocking pool.
    ///
    /// Embedding calls block, so they never run on the async workers.
    async fn with_engine<T, F>(&self, f: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut Engine) -> Result<T, Error> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| Error::Store("engine lock poisoned".to_string()))?;
            f(&mut engine)
        })
        .await
        .map_err(|e| Error::Store(format!("engine task failed: {e}")))?
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    results: Vec<Neighbor>,
}

/// The fields a request body may carry.
#[derive(Debug, PartialEq)]
struct QueryRequest {
    query: String,
    debug: bool,
    k: usize,
}

/// Parse a request body, or `None` when it has no usable `query` text.
///
/// Bodies are parsed by hand rather than through `Json<T>` so every
/// malformed shape gets the same 400.
fn parse_request(body: &[u8]) -> Option<QueryRequest> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let query = value.get("query")?.as_str()?.trim();
    if query.is_empty() {
        return None;
    }

    let k = value
        .get("k")
        .and_then(Value::as_u64)
        .map_or(DEFAULT_K, |k| usize::try_from(k).unwrap_or(MAX_K))
        .clamp(1, MAX_K);

    Some(QueryRequest {
        query: query.to_string(),
        debug: value.get("debug").and_then(Value::as_bool).unwrap_or(false),
        k,
    })
}

fn error_response(status: StatusCode, code: &'static str) -> Response {
    (status, Json(ErrorResponse { error: code })).into_response()
}

fn failure_response(err: &Error, code: &'static str) -> Response {
    if let Error::InvalidInput(reason) = err {
        warn!(%reason, "rejected query");
        return error_response(StatusCode::BAD_REQUEST, "invalid_query");
    }
    error!(error = %err, "{code}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, code)
}

/// POST /api/interpret
async fn interpret_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(request) = parse_request(&body) else {
        warn!("interpret request without query text");
        return error_response(StatusCode::BAD_REQUEST, "invalid_query");
    };

    let result = state
        .with_engine(move |engine| {
            let result = engine.interpret(&request.query)?;
            Ok(render_outcome(&result, engine.thresholds(), request.debug))
        })
        .await;

    match result {
        Ok(outcome) => {
            if let Outcome::Unclear { best_guess, confidence, .. } = &outcome {
                debug!(%best_guess, confidence, "unclear interpretation");
            }
            info!(interpreted = outcome.is_interpreted(), "interpret request served");
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => failure_response(&e, "interpretation_failed"),
    }
}

/// POST /api/search
async fn search_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(request) = parse_request(&body) else {
        warn!("search request without query text");
        return error_response(StatusCode::BAD_REQUEST, "invalid_query");
    };

    let result = state
        .with_engine(move |engine| {
            engine.search_reranked(&request.query, request.k, request.k.max(10))
        })
        .await;

    match result {
        Ok(results) => (StatusCode::OK, Json(SearchResponse { results })).into_response(),
        Err(e) => failure_response(&e, "search_failed"),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/interpret", post(interpret_handler))
        .route("/api/search", post(search_handler))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use kickoff_lib::embed::Embedding;
    use kickoff_lib::store::CorpusStore;
    use tower::ServiceExt;

    /// Maps text onto keyword counts so the canonical corpus separates.
    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed_documents(&mut self, texts: &[&str]) -> kickoff_lib::Result<Vec<Embedding>> {
            texts.iter().map(|t| self.embed_query(t)).collect()
        }

        fn embed_query(&mut self, text: &str) -> kickoff_lib::Result<Embedding> {
            let lower = text.to_lowercase();
            let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count() as f32;
            Ok(vec![
                count(&["schedul", "network", "espn", "rivalry", "weekend"]),
                count(&["sequence", "back-to-back", "consecutive", "bye"]),
                count(&["team", "each", "every", "home", "away"]),
                0.1,
            ])
        }

        fn dimension(&self) -> usize {
            4
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed_documents(&mut self, _texts: &[&str]) -> kickoff_lib::Result<Vec<Embedding>> {
            Err(Error::Embedding("secret-upstream-detail".to_string()))
        }

        fn embed_query(&mut self, _text: &str) -> kickoff_lib::Result<Embedding> {
            Err(Error::Embedding("secret-upstream-detail".to_string()))
        }

        fn dimension(&self) -> usize {
            4
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn seeded_app() -> Router {
        let mut engine: Engine = SearchEngine::with_rerank(
            Box::new(KeywordEmbedder) as Box<dyn Embedder>,
            MemoryStore::new(),
            LexicalReranker,
        );
        engine.seed().unwrap();
        router(AppState::new(engine))
    }

    fn failing_app() -> Router {
        let mut engine: Engine = SearchEngine::with_rerank(
            Box::new(FailingEmbedder) as Box<dyn Embedder>,
            MemoryStore::new(),
            LexicalReranker,
        );
        engine
            .store_mut()
            .insert(
                &[kickoff_lib::store::CorpusExample::new(
                    kickoff_lib::template::TemplateFamily::Sequence,
                    "back-to-back road games",
                )],
                &[vec![0.0, 1.0, 0.0, 0.1]],
            )
            .unwrap();
        router(AppState::new(engine))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_parse_request() {
        let request = parse_request(br#"{"query": "  no byes  ", "debug": true, "k": 3}"#).unwrap();
        assert_eq!(
            request,
            QueryRequest {
                query: "no byes".to_string(),
                debug: true,
                k: 3
            }
        );

        let request = parse_request(br#"{"query": "no byes", "k": 0}"#).unwrap();
        assert_eq!(request.k, 1);
        let request = parse_request(br#"{"query": "no byes", "k": 1000}"#).unwrap();
        assert_eq!(request.k, MAX_K);
    }

    #[test]
    fn test_parse_request_rejects_bad_shapes() {
        assert!(parse_request(b"not json").is_none());
        assert!(parse_request(br#"{}"#).is_none());
        assert!(parse_request(br#"{"query": 42}"#).is_none());
        assert!(parse_request(br#"{"query": null}"#).is_none());
        assert!(parse_request(br#"{"query": "   "}"#).is_none());
        assert!(parse_request(br#"["query"]"#).is_none());
    }

    #[tokio::test]
    async fn test_interpret_missing_query() {
        let (status, body) = post_json(seeded_app(), "/api/interpret", r#"{"text": "hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "invalid_query"}));
    }

    #[tokio::test]
    async fn test_interpret_non_string_query() {
        let (status, body) = post_json(seeded_app(), "/api/interpret", r#"{"query": ["a"]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_query");
    }

    #[tokio::test]
    async fn test_interpret_game_scheduling() {
        let (status, body) = post_json(
            seeded_app(),
            "/api/interpret",
            r#"{"query": "Ensure at least 2 and at most 5 rivalry games are scheduled across weekend rounds on ESPN."}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "interpreted");
        assert_eq!(body["family"], "game_scheduling");
        assert_eq!(body["template"], "Template 1: Game Scheduling Constraints");
        assert!(body.get("debug").is_none());
    }

    #[tokio::test]
    async fn test_interpret_debug_scores() {
        let (status, body) = post_json(
            seeded_app(),
            "/api/interpret",
            r#"{"query": "no back-to-back road games", "debug": true}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["debug"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_interpret_unclear_is_not_an_error() {
        let (status, body) =
            post_json(seeded_app(), "/api/interpret", r#"{"query": "make it fair"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unclear");
    }

    #[tokio::test]
    async fn test_interpret_collaborator_failure_hides_details() {
        let (status, body) =
            post_json(failing_app(), "/api/interpret", r#"{"query": "back to back"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "interpretation_failed"}));
    }

    #[tokio::test]
    async fn test_search_returns_k_results() {
        let (status, body) = post_json(
            seeded_app(),
            "/api/search",
            r#"{"query": "each team gets 4 home games", "k": 3}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["family"], "team_pattern");
        assert!(results[0]["distance"].is_number());
    }

    #[tokio::test]
    async fn test_search_failure() {
        let (status, body) =
            post_json(failing_app(), "/api/search", r#"{"query": "back to back"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "search_failed");
    }

    #[tokio::test]
    async fn test_search_invalid_body() {
        let (status, _) = post_json(seeded_app(), "/api/search", "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
