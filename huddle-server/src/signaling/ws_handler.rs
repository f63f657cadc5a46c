use crate::room::RelayCommand;
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, PeerId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    // Identity is assigned here, never taken from the client.
    let peer_id = PeerId::new();
    info!(%peer_id, "new websocket connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(peer_id.clone(), tx);
    service.send_message(
        peer_id.clone(),
        ServerMessage::Welcome {
            peer_id: peer_id.clone(),
        },
    );
    service.send_message(
        peer_id.clone(),
        ServerMessage::IceConfig {
            ice_servers: service.ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Join { session_id }) => {
                            let cmd = RelayCommand::Join {
                                peer_id: peer_id.clone(),
                                session_id,
                            };
                            if let Err(e) = service.relay_tx.send(cmd).await {
                                error!("relay died: {e}");
                                break;
                            }
                        }
                        Ok(ClientMessage::Signal { to, payload }) => {
                            let cmd = RelayCommand::Signal {
                                peer_id: peer_id.clone(),
                                to,
                                payload,
                            };
                            let _ = service.relay_tx.send(cmd).await;
                        }
                        Ok(ClientMessage::Leave) => break,
                        // A malformed frame is discarded; the connection
                        // itself stays up.
                        Err(e) => warn!(%peer_id, "invalid client message: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Explicit leave and abrupt transport loss converge here.
    let _ = service
        .relay_tx
        .send(RelayCommand::Disconnect {
            peer_id: peer_id.clone(),
        })
        .await;

    service.remove_peer(&peer_id);
    info!(%peer_id, "websocket disconnected");
}
