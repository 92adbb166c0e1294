use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use beacon_core::ConnId;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::gateway::GatewayEvent;
use crate::signaling::SignalingService;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let conn = ConnId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, conn, service))
}

async fn handle_socket(socket: WebSocket, conn: ConnId, service: SignalingService) {
    info!("New WebSocket connection: {}", conn);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service
        .emit(GatewayEvent::Connected { conn, sender: tx })
        .await;

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Binary(data) => {
                        service.emit(GatewayEvent::Frame { conn, data }).await;
                    }
                    Message::Close(_) => break,
                    // The protocol runs over binary frames only.
                    _ => debug!("ignoring non-binary frame from {}", conn),
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.emit(GatewayEvent::Disconnected { conn }).await;
    info!("WebSocket disconnected: {}", conn);
}
