//! HTTP Endpoints
//!
//! REST API for chat sessions and vehicle search.

use std::time::Duration;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sales_agent_agent::{StartedSession, TurnResponse};
use sales_agent_core::{ConversationSession, VehicleFilters};
use sales_agent_rag::{SearchHit, SearchStats, SyncReport};

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_SIMILAR_LIMIT: usize = 5;
const MAX_LIMIT: usize = 50;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.request_timeout_secs.max(1));

    Router::new()
        // Chat endpoints
        .route("/api/chat/start", post(start_chat))
        .route("/api/chat/sessions/count", get(session_count))
        .route("/api/chat/:session_id/message", post(send_message))
        .route("/api/chat/:session_id/state", get(session_state))
        .route("/api/chat/:session_id", delete(delete_session))
        // Search endpoints
        .route("/api/search", post(search))
        .route("/api/search/similar/:vehicle_id", get(similar_vehicles))
        .route("/api/search/stats", get(search_stats))
        .route("/api/search/sync-embeddings", post(sync_embeddings))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// - disabled: permissive
/// - no valid origins: any origin without credentials
/// - otherwise only the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        if !origins.is_empty() {
            tracing::error!("All configured CORS origins are invalid, allowing any origin");
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StartRequest {
    vehicle_id: Option<String>,
    user_id: Option<String>,
}

async fn start_chat(
    State(state): State<AppState>,
    body: Option<Json<StartRequest>>,
) -> Result<Json<StartedSession>, ServerError> {
    let Json(request) = body.unwrap_or_default();
    let started = state
        .machine
        .start_session(request.vehicle_id.as_deref(), request.user_id.as_deref())
        .await?;
    Ok(Json(started))
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    content: String,
}

async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<TurnResponse>, ServerError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ServerError::InvalidRequest("content must not be empty".into()));
    }

    let turn = state.machine.handle_message(&session_id, content).await?;
    Ok(Json(turn))
}

async fn session_state(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationSession>, ServerError> {
    state
        .sessions()
        .snapshot(&session_id)
        .await
        .map(Json)
        .ok_or(ServerError::SessionNotFound(session_id))
}

async fn delete_session(State(state): State<AppState>, Path(session_id): Path<String>) -> StatusCode {
    state.sessions().clear(&session_id);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCount {
    active_sessions: usize,
}

async fn session_count(State(state): State<AppState>) -> Json<SessionCount> {
    Json(SessionCount {
        active_sessions: state.sessions().count(),
    })
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    filters: Option<VehicleFilters>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchResults {
    results: Vec<SearchHit>,
    count: usize,
}

impl From<Vec<SearchHit>> for SearchResults {
    fn from(results: Vec<SearchHit>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResults>, ServerError> {
    let filters = request.filters.unwrap_or_default();
    let limit = clamp_limit(request.limit, DEFAULT_SEARCH_LIMIT);
    let hits = state.search.hybrid_search(&request.query, &filters, limit).await?;
    Ok(Json(hits.into()))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn similar_vehicles(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<SearchResults>, ServerError> {
    let limit = clamp_limit(query.limit, DEFAULT_SIMILAR_LIMIT);
    let hits = state.search.find_similar(&vehicle_id, limit).await?;
    Ok(Json(hits.into()))
}

async fn search_stats(State(state): State<AppState>) -> Result<Json<SearchStats>, ServerError> {
    Ok(Json(state.search.stats().await?))
}

async fn sync_embeddings(State(state): State<AppState>) -> Result<Json<SyncReport>, ServerError> {
    Ok(Json(state.search.sync_embeddings().await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    llm_available: bool,
    embeddings_available: bool,
    active_sessions: usize,
}

/// Always 200; degraded when no chat provider would answer
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let llm_available = state.llm_available();
    Json(Health {
        status: if llm_available { "ok" } else { "degraded" },
        llm_available,
        embeddings_available: state.search.embeddings_available(),
        active_sessions: state.sessions().count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use sales_agent_agent::{DialogueMachine, SessionStore};
    use sales_agent_config::{RankerConfig, Settings};
    use sales_agent_core::{EmbeddingProvider, InventoryStore, Result, VehicleSummary};
    use sales_agent_rag::{InMemoryInventory, RankerSettings, VectorSearch, VehicleRanker};
    use sales_agent_tools::{FinancingCalculator, TradeInEstimator};

    struct NoEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for NoEmbeddings {
        async fn embed(&self, _: &str) -> Result<Option<Vec<f32>>> {
            Ok(None)
        }

        fn is_available(&self) -> bool {
            false
        }

        fn model_name(&self) -> &str {
            "none"
        }
    }

    fn vehicle(id: &str, model: &str, price: u64) -> VehicleSummary {
        VehicleSummary {
            id: id.into(),
            make: "Toyota".into(),
            model: model.into(),
            year: 2021,
            price,
            mileage: 40_000,
            body_type: "Sedan".into(),
            condition: "used".into(),
            tags: vec![],
            features: vec![],
            transmission: None,
            fuel: None,
            color: None,
            seats: Some(5),
            available: true,
            embedding: None,
        }
    }

    fn app() -> (Router, AppState) {
        let inventory: Arc<dyn InventoryStore> = Arc::new(InMemoryInventory::new(vec![
            vehicle("corolla-21", "Corolla", 95_000),
            vehicle("yaris-21", "Yaris", 75_000),
        ]));
        let search = Arc::new(VectorSearch::new(
            inventory.clone(),
            Arc::new(NoEmbeddings),
            &RankerConfig::default(),
        ));
        let ranker = Arc::new(VehicleRanker::new(search.clone(), RankerSettings::default()));
        let machine = DialogueMachine::new(
            Arc::new(SessionStore::new()),
            inventory,
            ranker,
            None,
            FinancingCalculator::default(),
            TradeInEstimator::default(),
        );
        let state = AppState::new(Settings::default(), machine, search);
        (create_router(state.clone()), state)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn start(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/chat/start", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["greeting"].as_str().unwrap().contains("nome"));
        json["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_start_without_body() {
        let (app, state) = app();
        let response = app.oneshot(empty_request("POST", "/api/chat/start")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.sessions().count(), 1);
    }

    #[tokio::test]
    async fn test_start_with_selected_vehicle() {
        let (app, _) = app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/chat/start",
                serde_json::json!({ "vehicleId": "corolla-21" }),
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["vehicle"]["id"], "corolla-21");
        assert!(json["greeting"].as_str().unwrap().contains("Toyota Corolla 2021"));
    }

    #[tokio::test]
    async fn test_message_flow_and_state() {
        let (app, _) = app();
        let session_id = start(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/chat/{}/message", session_id),
                serde_json::json!({ "content": "Oi, sou Maria" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["currentNode"], "discovery");
        assert!(json["suggestedActions"].is_array());

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/chat/{}/state", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["profile"]["name"], "Maria");
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let (app, _) = app();
        let session_id = start(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/chat/{}/message", session_id),
                serde_json::json!({ "content": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _) = app();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/chat/missing/message",
                serde_json::json!({ "content": "Oi" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(empty_request("GET", "/api/chat/missing/state"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let (app, _) = app();
        let session_id = start(&app).await;

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/chat/sessions/count"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["activeSessions"], 1);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(empty_request("DELETE", &format!("/api/chat/{}", session_id)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = app
            .oneshot(empty_request("GET", "/api/chat/sessions/count"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["activeSessions"], 0);
    }

    #[tokio::test]
    async fn test_search_endpoints() {
        let (app, _) = app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/search",
                serde_json::json!({ "query": "corolla", "limit": 5 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["results"][0]["vehicle"]["id"], "corolla-21");

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/search/stats"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["coverage"], "0.0%");

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/search/similar/corolla-21?limit=3"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["count"], 0);

        let response = app
            .oneshot(empty_request("POST", "/api/search/sync-embeddings"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["processed"], 0);
        assert_eq!(json["failed"], 0);
    }

    #[tokio::test]
    async fn test_health_without_providers_is_degraded() {
        let (app, _) = app();
        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["llmAvailable"], false);
        assert_eq!(json["embeddingsAvailable"], false);
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let (app, _) = app();
        let response = app.oneshot(empty_request("GET", "/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
