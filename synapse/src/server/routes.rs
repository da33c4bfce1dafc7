//! A2A HTTP routes

use axum::{
    extract::State,
    http::Uri,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::card::AgentCard;
use super::error::ApiError;
use super::jsonrpc::{
    A2aMessage, JsonRpcRequest, JsonRpcResponse, MessageSendParams, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::agent::OrchestrateAgent;

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    /// The tool-calling agent answering `message/send`
    pub agent: Arc<OrchestrateAgent>,
    /// The published agent card
    pub card: Arc<AgentCard>,
    /// Server start time, for uptime reporting
    pub started_at: Instant,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server started
    pub uptime_seconds: u64,
}

/// Create all A2A routes
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/.well-known/agent.json", get(agent_card))
        .route("/health", get(health))
        .route("/", post(rpc))
        .fallback(not_found)
        .with_state(state)
}

/// JSON 404 for anything outside the A2A surface
async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

/// Serve the agent card
async fn agent_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// JSON-RPC endpoint.
///
/// The body is taken as raw text so malformed JSON can be answered with a
/// proper -32700 instead of a bare HTTP 400. Valid JSON that is not a
/// conformant request object gets the distinct -32600.
async fn rpc(State(state): State<AppState>, body: String) -> Json<JsonRpcResponse> {
    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            return Json(JsonRpcResponse::failure(
                serde_json::Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };

    let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Json(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ));
        }
    };

    match request.method.as_str() {
        "message/send" => Json(message_send(&state, id, request.params).await),
        other => Json(JsonRpcResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        )),
    }
}

async fn message_send(
    state: &AppState,
    id: serde_json::Value,
    params: serde_json::Value,
) -> JsonRpcResponse {
    let params: MessageSendParams = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(e) => {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    let query = params.message.text();
    if query.trim().is_empty() {
        return JsonRpcResponse::failure(
            id,
            INVALID_PARAMS,
            "Message carries no text parts".to_string(),
        );
    }

    info!("message/send: {} chars of input", query.len());

    match state.agent.run(&query).await {
        Ok(reply) => {
            let message = A2aMessage::agent_reply(reply, params.message.context_id.clone());
            match serde_json::to_value(&message) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::failure(
                    id,
                    INTERNAL_ERROR,
                    format!("Failed to encode reply: {}", e),
                ),
            }
        }
        Err(e) => {
            error!("Agent run failed: {}", e);
            JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string())
        }
    }
}
