use crate::room::{JoinOutcome, RelayCommand, RoomRegistry};
use crate::signaling::SignalingOutput;
use huddle_core::ServerMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The rendezvous service: owns the room registry and performs pure
/// forwarding of signal envelopes between the two occupants of a room.
///
/// All registry mutation happens on this task; connection handlers only
/// talk to it through the command channel, which also gives envelopes a
/// single ordered path per sender.
pub struct Relay {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn SignalingOutput>,
}

impl Relay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Join {
                peer_id,
                session_id,
            } => match self.registry.join(session_id.clone(), peer_id.clone()) {
                JoinOutcome::Waiting => {
                    info!(%peer_id, %session_id, "peer waiting for a partner");
                    self.output
                        .send(
                            peer_id,
                            ServerMessage::JoinAck {
                                ok: true,
                                other_peer_id: None,
                                error: None,
                            },
                        )
                        .await;
                }

                JoinOutcome::Paired(other) => {
                    info!(%peer_id, %other, %session_id, "peers paired");
                    self.output
                        .send(
                            other.clone(),
                            ServerMessage::PeerJoined {
                                peer_id: peer_id.clone(),
                            },
                        )
                        .await;
                    self.output
                        .send(
                            peer_id,
                            ServerMessage::JoinAck {
                                ok: true,
                                other_peer_id: Some(other),
                                error: None,
                            },
                        )
                        .await;
                }

                JoinOutcome::Rejected(error) => {
                    warn!(%peer_id, %session_id, %error, "join rejected");
                    self.output
                        .send(
                            peer_id,
                            ServerMessage::JoinAck {
                                ok: false,
                                other_peer_id: None,
                                error: Some(error),
                            },
                        )
                        .await;
                }
            },

            RelayCommand::Signal {
                peer_id,
                to,
                payload,
            } => {
                // Disconnect races are expected; an envelope addressed to a
                // departed peer is dropped, never an error.
                if !self.output.is_connected(&to) {
                    debug!(from = %peer_id, %to, "dropping signal, target unreachable");
                    return;
                }

                // `from` is always the server-assigned sender id.
                self.output
                    .send(
                        to,
                        ServerMessage::Signal {
                            from: peer_id,
                            payload,
                        },
                    )
                    .await;
            }

            RelayCommand::Disconnect { peer_id } => {
                if let Some(session_id) = self.registry.resolve(&peer_id) {
                    info!(%peer_id, %session_id, "peer leaving its room");
                }

                if let Some(other) = self.registry.leave(&peer_id) {
                    self.output
                        .send(other, ServerMessage::PeerLeft { peer_id })
                        .await;
                }
            }
        }
    }
}
