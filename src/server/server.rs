//! WebSocket feedback host.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::Nugget;
use crate::protocol::{ClientMessage, ServerMessage};

use super::state::ServerState;

/// Shared host state wrapped in Arc<Mutex> for async access.
pub type SharedState = Arc<Mutex<ServerState>>;

/// Bind the configured address and serve the nugget until the process exits.
pub async fn run(config: &Config, nugget: Nugget) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.address()).await?;
    info!(
        address = %listener.local_addr()?,
        title = %nugget.title,
        quizzes = nugget.quiz_count(),
        "feedback host listening"
    );

    let state = Arc::new(Mutex::new(ServerState::new(nugget, config.retry)));
    serve(listener, state).await;
    Ok(())
}

/// Accept connections forever.
pub async fn serve(listener: TcpListener, state: SharedState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(handle_connection(stream, addr, state));
            }
            Err(e) => {
                warn!("failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%addr, "websocket handshake failed: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let session_id = state.lock().await.open_session(addr, tx);
    info!(%addr, %session_id, "learner connected");

    // Forward messages from the session channel to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!("failed to encode message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(%session_id, "connection error: {}", e);
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                let state = state.lock().await;
                if let Some(session) = state.sessions.get(&session_id) {
                    session.send(ServerMessage::Rejected {
                        reason: format!("malformed message: {}", e),
                    });
                }
                continue;
            }
        };

        debug!(%session_id, ?client_msg, "received");
        state.lock().await.dispatch(&session_id, client_msg);
    }

    state.lock().await.close_session(&session_id);
    info!(%session_id, "learner disconnected");
    send_task.abort();
}
