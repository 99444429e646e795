use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::llm_client::prompts::PING_MESSAGE;
use crate::llm_client::{ChatMessage, CompletionOptions};
use crate::state::AppState;

const PING_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 16,
    temperature: 0.0,
};

/// GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "app": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ready"
    }))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /api/test-connection
/// Sends one tiny chat request; any reply counts as connected.
pub async fn test_connection_handler(State(state): State<AppState>) -> Json<Value> {
    let messages = [ChatMessage::system(PING_MESSAGE)];
    let connected = match state.llm.complete(&messages, &PING_OPTIONS).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Model connection test failed: {e}");
            false
        }
    };
    Json(json!({ "connected": connected }))
}
