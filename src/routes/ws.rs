//! `/ws`: one WebSocket per client session.
//!
//! Each connection gets its own [`Session`] (and detector); messages are
//! handled strictly one at a time, one reply per inbound message.

use std::time::Instant;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use tracing::Instrument;

use crate::middleware::request_id::RequestId;
use crate::protocol::{ServerMessage, INVALID_FRAME, INVALID_JSON};
use crate::response::AppError;
use crate::session::Session;
use crate::state::{AppState, SessionSlot};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
) -> Result<Response, AppError> {
    let slot = state
        .try_acquire_session()
        .ok_or_else(|| AppError::too_many_requests("Too many active sessions"))?;

    let request_id = request_id.map(|Extension(RequestId(id))| id).unwrap_or_default();
    let max_frame_bytes = state.config().limits.max_frame_bytes;

    Ok(ws
        .max_message_size(max_frame_bytes)
        .on_upgrade(move |socket| run_session(socket, state, slot, request_id)))
}

async fn run_session(socket: WebSocket, state: AppState, slot: SessionSlot, request_id: String) {
    let session = Session::new(state.landmarks(), state.detector_config());
    let span = tracing::info_span!(
        "session",
        session_id = %session.id(),
        request_id = %request_id
    );
    session_loop(socket, state, session, slot).instrument(span).await;
}

async fn session_loop(mut socket: WebSocket, state: AppState, mut session: Session, _slot: SessionSlot) {
    tracing::info!(active_sessions = state.active_sessions(), "Client connected");
    let mut shutdown_rx = state.shutdown_rx();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let message = match incoming {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WebSocket receive failed");
                        let frame = CloseFrame {
                            code: receive_error_close_code(&e),
                            reason: INVALID_FRAME.into(),
                        };
                        let _ = socket.send(Message::Close(Some(frame))).await;
                        break;
                    }
                    None => break,
                };

                let received_at = Instant::now();
                let reply = match message {
                    Message::Text(text) => session.handle_text(&text, received_at).await,
                    Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                        Ok(text) => session.handle_text(text, received_at).await,
                        Err(_) => ServerMessage::error(INVALID_JSON),
                    },
                    Message::Ping(_) | Message::Pong(_) => continue,
                    Message::Close(_) => break,
                };

                if let Err(e) = send_reply(&mut socket, &reply).await {
                    tracing::warn!(error = %e, "WebSocket send failed");
                    break;
                }
            }
            _ = shutdown_rx.recv() => {
                tracing::info!("Closing session for shutdown");
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }

    let stats = session.stats();
    tracing::info!(
        messages = stats.messages,
        awake = stats.awake,
        sleeping = stats.sleeping,
        no_face = stats.no_face,
        errors = stats.errors,
        "Client disconnected"
    );
}

/// Oversized messages surface from the codec as a capacity error; anything
/// else unreadable is a protocol violation.
fn receive_error_close_code(error: &axum::Error) -> u16 {
    if error.to_string().contains("Message too long") {
        close_code::SIZE
    } else {
        close_code::PROTOCOL
    }
}

async fn send_reply(socket: &mut WebSocket, reply: &ServerMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(reply).map_err(axum::Error::new)?;
    socket.send(Message::Text(text)).await
}
