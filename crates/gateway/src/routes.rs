use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    serde::{Deserialize, Serialize},
    tracing::{debug, error},
};

use zaprelay_common::InboundMessage;

use crate::state::GatewayState;

const CHAT_ID_SUFFIX: &str = "@c.us";

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/send-message", post(send_message))
        .route("/inbound", post(inbound))
        .with_state(state)
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    timestamp: String,
}

async fn status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    let status = if state.client.is_ready().await {
        "ready"
    } else {
        "initializing"
    };
    Json(StatusResponse {
        status,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Deserialize)]
struct SendMessageRequest {
    phone: Option<String>,
    message: Option<String>,
}

async fn send_message(
    State(state): State<GatewayState>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let (Some(phone), Some(message)) = (req.phone, req.message) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: phone and message",
            None,
        );
    };
    if phone.is_empty() || message.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: phone and message",
            None,
        );
    }

    if !state.client.is_ready().await {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Chat client is not ready yet",
            None,
        );
    }

    let chat_id = format!("{phone}{CHAT_ID_SUFFIX}");
    match state.client.send_text(&chat_id, &message).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Message sent successfully"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(%chat_id, error = %e, "outbound send failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message",
                Some(e.to_string()),
            )
        },
    }
}

/// Inbound chat events. Each message is dispatched on its own task so the
/// transport gets its acknowledgement immediately and a slow transcode
/// never holds up the next event.
async fn inbound(
    State(state): State<GatewayState>,
    Json(msg): Json<InboundMessage>,
) -> StatusCode {
    debug!(msg_id = %msg.id, kind = ?msg.kind, "inbound event");
    let dispatcher = Arc::clone(&state.dispatcher);
    tokio::spawn(async move {
        dispatcher.dispatch(&msg).await;
    });
    StatusCode::ACCEPTED
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => serde_json::json!({"error": error, "details": details}),
        None => serde_json::json!({"error": error}),
    };
    (status, Json(body)).into_response()
}
