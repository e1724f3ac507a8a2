// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface built on axum.
//!
//! A thin layer over the pipeline and the action resolver:
//! - `POST /v1/conversations/{id}/turns` (JSON, or SSE when the client
//!   sends `Accept: text/event-stream`)
//! - `POST /v1/conversations/{id}/actions/{action_id}`
//! - `GET /health`
//!
//! Only validation and persistence failures map to hard HTTP errors;
//! degraded turns still return 200 with `degraded: true`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use hearth_actions::{ActionContext, ActionResolver};
use hearth_core::types::{
    ConversationMode, Identity, IncomingAttachment, TextChunk, TurnRequest,
};
use hearth_core::{HearthError, TurnStore};
use hearth_pipeline::TurnPipeline;

use crate::App;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TurnPipeline>,
    pub resolver: Arc<ActionResolver>,
    pub store: Arc<dyn TurnStore>,
    pub bearer_token: Option<String>,
}

/// Request body for a turn.
#[derive(Debug, Deserialize)]
pub struct TurnBody {
    pub text: String,
    /// chat | agent; defaults to chat.
    #[serde(default)]
    pub mode: Option<ConversationMode>,
    #[serde(default)]
    pub attachments: Vec<IncomingAttachment>,
    /// Authenticated user id; absent means anonymous guest access.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Health response body.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: String,
    pub version: String,
}

/// Run the HTTP server until shutdown.
pub async fn run(app: App) -> Result<(), HearthError> {
    let state = AppState {
        pipeline: Arc::clone(&app.pipeline),
        resolver: Arc::clone(&app.resolver),
        store: Arc::clone(&app.store) as Arc<dyn TurnStore>,
        bearer_token: app.config.server.bearer_token.clone(),
    };

    match state.store.health_check().await {
        Ok(status) => info!(storage = ?status, "storage health check"),
        Err(e) => return Err(e),
    }

    let addr = format!("{}:{}", app.config.server.host, app.config.server.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| HearthError::Config(format!("failed to bind to {addr}: {e}")))?;

    info!("hearth server listening on {addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| HearthError::Internal(format!("server error: {e}")))?;

    Ok(())
}

/// Build the router (exposed separately for tests).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/v1/conversations/{id}/turns", post(post_turn))
        .route(
            "/v1/conversations/{id}/actions/{action_id}",
            post(post_action),
        )
        .route("/v1/conversations/{id}/close", post(post_close))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn get_health(State(_state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = &state.bearer_token else {
        return Ok(());
    };
    let provided = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "missing or invalid bearer token".to_string(),
            }),
        )
            .into_response())
    }
}

fn turn_request(conversation_id: String, body: TurnBody) -> TurnRequest {
    TurnRequest {
        conversation_id,
        identity: body
            .user_id
            .map(Identity::User)
            .unwrap_or(Identity::Anonymous),
        text: body.text,
        attachments: body.attachments,
        mode: body.mode.unwrap_or(ConversationMode::Chat),
    }
}

/// POST /v1/conversations/{id}/turns
async fn post_turn(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TurnBody>,
) -> Response {
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    let wants_sse = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/event-stream"));

    let request = turn_request(conversation_id, body);

    if wants_sse {
        return stream_turn(state, request).await.into_response();
    }

    match state.pipeline.process_turn(request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

/// SSE variant of a turn: `text_delta` events while the reply streams, one
/// `turn_complete` event carrying the full outcome, or an `error` event.
async fn stream_turn(
    state: AppState,
    request: TurnRequest,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    enum SseMsg {
        Chunk(TextChunk),
        Done(Box<hearth_core::types::TurnOutcome>),
        Failed(String),
    }

    let (chunk_tx, mut chunk_rx) = mpsc::channel::<TextChunk>(64);
    let (event_tx, event_rx) = mpsc::channel::<SseMsg>(64);

    // Forward reply chunks as they stream.
    let forward_tx = event_tx.clone();
    tokio::spawn(async move {
        while let Some(chunk) = chunk_rx.recv().await {
            if forward_tx.send(SseMsg::Chunk(chunk)).await.is_err() {
                break;
            }
        }
    });

    // Drive the pipeline; its completion closes the event stream.
    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        let result = pipeline
            .process_turn_streaming(request, Some(chunk_tx), CancellationToken::new())
            .await;
        let message = match result {
            Ok(outcome) => SseMsg::Done(Box::new(outcome)),
            Err(e) => {
                error!(error = %e, "streamed turn failed");
                SseMsg::Failed(e.to_string())
            }
        };
        let _ = event_tx.send(message).await;
    });

    let stream = futures::stream::unfold(event_rx, |mut rx| async move {
        rx.recv().await.map(|msg| {
            let event = match msg {
                SseMsg::Chunk(chunk) => Event::default()
                    .event("text_delta")
                    .data(serde_json::json!({ "text": chunk.text }).to_string()),
                SseMsg::Done(outcome) => Event::default().event("turn_complete").data(
                    serde_json::to_string(&outcome)
                        .unwrap_or_else(|_| "{}".to_string()),
                ),
                SseMsg::Failed(error) => Event::default()
                    .event("error")
                    .data(serde_json::json!({ "error": error }).to_string()),
            };
            (Ok::<_, Infallible>(event), rx)
        })
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// POST /v1/conversations/{id}/actions/{action_id}
async fn post_action(
    State(state): State<AppState>,
    Path((conversation_id, action_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    let conversation = match state.store.get_conversation(&conversation_id).await {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            return error_response(HearthError::NotFound {
                entity: "conversation",
                id: conversation_id,
            });
        }
        Err(e) => return error_response(e),
    };

    let messages = match state.store.get_messages(&conversation_id, Some(50)).await {
        Ok(messages) => messages,
        Err(e) => return error_response(e),
    };

    let ctx = ActionContext {
        conversation,
        messages,
    };

    match state.resolver.resolve(&action_id, &ctx).await {
        Ok(resolution) => (StatusCode::OK, Json(resolution)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/conversations/{id}/close
///
/// Archives a conversation. Conversations are never deleted.
async fn post_close(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.store.get_conversation(&conversation_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(HearthError::NotFound {
                entity: "conversation",
                id: conversation_id,
            });
        }
        Err(e) => return error_response(e),
    }

    match state.store.close_conversation(&conversation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// Map pipeline/resolver errors to HTTP statuses. Only validation and
/// persistence failures reach here from a turn; everything else was
/// absorbed upstream.
fn error_response(e: HearthError) -> Response {
    let status = match &e {
        HearthError::Validation { .. } => StatusCode::BAD_REQUEST,
        HearthError::NotFound { .. } => StatusCode::NOT_FOUND,
        HearthError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        HearthError::Storage { .. } | HearthError::Internal(_) | HearthError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        HearthError::Provider { .. } | HearthError::Tool { .. } => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use hearth_test_utils::{ScriptedReply, TestHarness};
    use tower::ServiceExt;

    /// Builds the HTTP state over a harness. The harness must outlive the
    /// state: it owns the tempdir backing the store.
    fn state_over(harness: &TestHarness) -> AppState {
        let resolver = Arc::new(ActionResolver::new(
            Arc::clone(&harness.generation) as _,
            Arc::clone(&harness.image) as _,
            Arc::clone(&harness.search) as _,
            Arc::clone(&harness.contractors) as _,
            "Austin, TX".into(),
            512,
        ));
        AppState {
            pipeline: Arc::clone(&harness.pipeline),
            resolver,
            store: Arc::clone(&harness.store) as Arc<dyn TurnStore>,
            bearer_token: None,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let harness = TestHarness::new().await;
        let response = router(state_over(&harness))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn turn_endpoint_returns_outcome() {
        let harness = TestHarness::new().await;
        harness
            .generation
            .push(ScriptedReply::Text("Try satin white.".into()))
            .await;

        let request = Request::post("/v1/conversations/conv-http/turns")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"text": "what paint finish for trim?"}).to_string(),
            ))
            .unwrap();
        let response = router(state_over(&harness)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["reply_text"], "Try satin white.");
        assert_eq!(json["degraded"], false);
    }

    #[tokio::test]
    async fn empty_text_maps_to_400_with_constraint() {
        let harness = TestHarness::new().await;

        let request = Request::post("/v1/conversations/conv-http/turns")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({"text": "  "}).to_string()))
            .unwrap();
        let response = router(state_over(&harness)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("text.non_empty"));
    }

    #[tokio::test]
    async fn action_on_missing_conversation_is_404() {
        let harness = TestHarness::new().await;

        let request = Request::post("/v1/conversations/ghost/actions/export_pdf")
            .body(Body::empty())
            .unwrap();
        let response = router(state_over(&harness)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pdf_export_without_plan_returns_needs_input() {
        let harness = TestHarness::new().await;
        // One turn so the conversation exists.
        harness
            .pipeline
            .process_turn(harness.turn(
                "conv-pdf",
                "thinking about redoing the pantry",
                ConversationMode::Chat,
            ))
            .await
            .unwrap();

        let request = Request::post("/v1/conversations/conv-pdf/actions/export_pdf")
            .body(Body::empty())
            .unwrap();
        let response = router(state_over(&harness)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["outcome"], "needs_input");
        assert!(json["prompt"].as_str().unwrap().contains("create one first"));
    }

    #[tokio::test]
    async fn close_endpoint_archives_the_conversation() {
        let harness = TestHarness::new().await;
        harness
            .pipeline
            .process_turn(harness.turn("conv-close", "hello there", ConversationMode::Chat))
            .await
            .unwrap();

        let request = Request::post("/v1/conversations/conv-close/close")
            .body(Body::empty())
            .unwrap();
        let response = router(state_over(&harness)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let conversation = harness
            .store
            .get_conversation("conv-close")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            conversation.status,
            hearth_core::types::ConversationStatus::Closed
        );
    }

    #[tokio::test]
    async fn bearer_auth_rejects_missing_token() {
        let harness = TestHarness::new().await;
        let mut state = state_over(&harness);
        state.bearer_token = Some("sekrit".into());

        let request = Request::post("/v1/conversations/c/turns")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({"text": "hi"}).to_string()))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_auth_accepts_valid_token() {
        let harness = TestHarness::new().await;
        let mut state = state_over(&harness);
        state.bearer_token = Some("sekrit".into());

        let request = Request::post("/v1/conversations/c/turns")
            .header("content-type", "application/json")
            .header("authorization", "Bearer sekrit")
            .body(Body::from(serde_json::json!({"text": "hi"}).to_string()))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
