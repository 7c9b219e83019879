//! Backend tests against a local OpenAI-compatible stub server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use sales_agent_core::{ChatMessage, CompletionOptions};
use sales_agent_llm::{BackendConfig, CallRouter, LlmError, OpenAiCompatibleBackend, RouterConfig};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}/v1", addr.port())
}

fn backend(base_url: &str, retries: u32) -> OpenAiCompatibleBackend {
    let config = BackendConfig::new("stub", base_url, "stub-model")
        .with_api_key("sk-test")
        .with_timeout(Duration::from_secs(2))
        .with_retries(retries, Duration::from_millis(5));
    OpenAiCompatibleBackend::new(config).unwrap()
}

#[tokio::test]
async fn test_parses_completion_and_usage() {
    async fn handler(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["model"], "stub-model");
        assert_eq!(body["messages"][0]["role"], "system");
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Olá!"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14}
        }))
    }
    let base = spawn(Router::new().route("/v1/chat/completions", post(handler))).await;

    let completion = backend(&base, 0)
        .generate(
            &[ChatMessage::system("Você é um vendedor"), ChatMessage::user("Oi")],
            &CompletionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(completion.text, "Olá!");
    assert_eq!(completion.usage.unwrap().total_tokens, 14);
}

#[tokio::test]
async fn test_retries_server_errors() {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn handler(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Json<Value>) {
        if hits.fetch_add(1, Ordering::SeqCst) < 2 {
            return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "busy"})));
        }
        (
            StatusCode::OK,
            Json(json!({"choices": [{"message": {"content": "ok"}}]})),
        )
    }
    let router = Router::new()
        .route("/v1/chat/completions", post(handler))
        .with_state(hits.clone());
    let base = spawn(router).await;

    let completion = backend(&base, 2)
        .generate(&[ChatMessage::user("Oi")], &CompletionOptions::default())
        .await
        .unwrap();

    assert_eq!(completion.text, "ok");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn handler(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, &'static str) {
        hits.fetch_add(1, Ordering::SeqCst);
        (StatusCode::UNAUTHORIZED, "invalid key")
    }
    let router = Router::new()
        .route("/v1/chat/completions", post(handler))
        .with_state(hits.clone());
    let base = spawn(router).await;

    let err = backend(&base, 3)
        .generate(&[ChatMessage::user("Oi")], &CompletionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Api { status: 401, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_router_falls_back_to_second_backend() {
    async fn broken() -> StatusCode {
        StatusCode::BAD_REQUEST
    }
    async fn healthy() -> Json<Value> {
        Json(json!({"choices": [{"message": {"content": "from secondary"}}]}))
    }
    let broken_base = spawn(Router::new().route("/v1/chat/completions", post(broken))).await;
    let healthy_base = spawn(Router::new().route("/v1/chat/completions", post(healthy))).await;

    let router = CallRouter::new(
        vec![
            Arc::new(backend(&broken_base, 0)),
            Arc::new(OpenAiCompatibleBackend::new(
                BackendConfig::new("secondary", healthy_base, "m").with_api_key("k"),
            )
            .unwrap()),
        ],
        RouterConfig::default(),
    );

    let routed = router.complete_default(&[ChatMessage::user("Oi")]).await;
    assert_eq!(routed.provider, "secondary");
    assert_eq!(routed.text, "from secondary");
}
