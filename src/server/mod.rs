pub mod protocol;
pub mod state_stream;

use crate::config::Config;
use crate::simulation::SimulationState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State as AxumState, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientMessage, ServerMessage};
use state_stream::StateStream;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use tower_http::services::ServeDir;

#[derive(Clone)]
struct AppState {
    stream: StateStream,
    config: Config,
}

pub fn router(config: Config, state: Arc<RwLock<SimulationState>>) -> Router {
    let app_state = AppState {
        stream: StateStream::new(state),
        config,
    };

    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/state", get(state_handler))
        // The view's own assets live in ./static
        .nest_service("/", ServeDir::new("static"))
        .with_state(app_state)
}

pub async fn run_server(
    config: Config,
    state: Arc<RwLock<SimulationState>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.address, config.server.port);
    let app = router(config, state);

    log::info!("HTTP server with WebSocket listening on: {}", addr);
    log::info!("WebSocket endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn state_handler(AxumState(state): AxumState<AppState>) -> impl IntoResponse {
    Json(state.stream.update_message().await)
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

async fn send(sender: &mut futures_util::stream::SplitSink<WebSocket, Message>, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            log::error!("Failed to encode server message: {}", e);
            true
        }
    }
}

async fn handle_websocket(socket: WebSocket, app_state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut update_interval = interval(Duration::from_millis(
        1000 / app_state.config.server.update_rate_hz.max(1),
    ));

    loop {
        tokio::select! {
            _ = update_interval.tick() => {
                let message = app_state.stream.update_message().await;
                if !send(&mut sender, &message).await {
                    log::info!("Client disconnected");
                    break;
                }
            }

            Some(msg) = receiver.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::GetState) => app_state.stream.update_message().await,
                            Ok(ClientMessage::ApplyAction { slot }) => app_state.stream.apply_action(slot).await,
                            Ok(ClientMessage::GetHistory { parameter }) => {
                                app_state.stream.history_message(parameter).await
                            }
                            Err(e) => {
                                log::warn!("Ignoring malformed client message: {}", e);
                                continue;
                            }
                        };
                        if !send(&mut sender, &reply).await {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        log::info!("Client requested close");
                        break;
                    }
                    Err(e) => {
                        log::error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    log::info!("WebSocket connection closed");
}
