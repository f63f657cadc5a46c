use crate::media::{MediaConstraints, MediaError, MediaHandle, MediaSource};
use crate::transport::{PathDiscoveryConfig, PeerTransport, TransportError};
use huddle_core::{ClientMessage, IceServerConfig, JoinError, PeerId, ServerMessage, SignalPayload};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Negotiation role, a pure function of join order: the first peer into a
/// room initiates, the second responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("the session is already full")]
    RoomFull,
    #[error("the peer did not complete negotiation in time")]
    Timeout,
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("negotiation failed: {0}")]
    Negotiation(String),
}

/// Local negotiation state. `Closed` and `Failed` are terminal; both
/// guarantee the media handle is released and the transport closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    New,
    LocalMediaReady,
    AwaitingPeer,
    Negotiating(Role),
    Connected,
    Closed,
    Failed(FailureReason),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed(_))
    }
}

/// Typed inbound events, processed one at a time. Everything that can move
/// the session — network or local — arrives through here, so there is no
/// implicit re-entrancy.
#[derive(Debug)]
pub enum SessionEvent {
    IceConfigReceived {
        ice_servers: Vec<IceServerConfig>,
    },
    JoinResult {
        other_peer: Option<PeerId>,
        error: Option<JoinError>,
    },
    PeerJoined {
        peer_id: PeerId,
    },
    SignalReceived {
        from: PeerId,
        payload: SignalPayload,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    EndCall,
    NegotiationTimedOut,
}

impl SessionEvent {
    /// Maps a relayed server message onto a session event. `Welcome`
    /// configures the connection layer and carries no transition.
    pub fn from_server(message: ServerMessage) -> Option<Self> {
        match message {
            ServerMessage::IceConfig { ice_servers } => {
                Some(SessionEvent::IceConfigReceived { ice_servers })
            }
            ServerMessage::JoinAck {
                other_peer_id,
                error,
                ..
            } => Some(SessionEvent::JoinResult {
                other_peer: other_peer_id,
                error,
            }),
            ServerMessage::PeerJoined { peer_id } => Some(SessionEvent::PeerJoined { peer_id }),
            ServerMessage::Signal { from, payload } => {
                Some(SessionEvent::SignalReceived { from, payload })
            }
            ServerMessage::PeerLeft { peer_id } => Some(SessionEvent::PeerLeft { peer_id }),
            ServerMessage::Welcome { .. } => None,
        }
    }
}

/// One participant's negotiation state machine. Exclusively owned by the
/// local application; the relay never sees it.
pub struct CallSession {
    state: SessionState,
    remote_peer: Option<PeerId>,
    media: Arc<dyn MediaSource>,
    transport: Arc<dyn PeerTransport>,
    media_handle: Option<MediaHandle>,
    /// Candidates that arrived before the remote description, kept in
    /// arrival order.
    pending_candidates: Vec<String>,
    remote_description_set: bool,
}

impl CallSession {
    pub fn new(media: Arc<dyn MediaSource>, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            state: SessionState::New,
            remote_peer: None,
            media,
            transport,
            media_handle: None,
            pending_candidates: Vec::new(),
            remote_description_set: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn remote_peer(&self) -> Option<&PeerId> {
        self.remote_peer.as_ref()
    }

    /// Whether the offer/answer exchange has completed locally. A settled
    /// negotiation is no longer subject to the negotiation deadline, even
    /// on the responder side where the state stays `Negotiating`.
    pub fn negotiation_settled(&self) -> bool {
        self.remote_description_set
    }

    /// Acquire the local camera/microphone. Must happen before joining;
    /// a denial is surfaced to the caller and ends the session.
    pub async fn acquire_media(&mut self, constraints: MediaConstraints) -> Result<(), MediaError> {
        if self.state != SessionState::New {
            warn!(state = ?self.state, "acquire_media called twice, ignoring");
            return Ok(());
        }

        match self.media.acquire(constraints).await {
            Ok(handle) => {
                self.media_handle = Some(handle);
                self.state = SessionState::LocalMediaReady;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed(FailureReason::Media(e.clone()));
                Err(e)
            }
        }
    }

    /// Apply one event and return the envelopes to send through the relay.
    /// Errors never escape: unrecoverable ones resolve to `Failed` with
    /// resources released, strays are discarded.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Vec<ClientMessage> {
        match event {
            SessionEvent::IceConfigReceived { ice_servers } => {
                debug!(count = ice_servers.len(), "configuring path discovery");
                self.transport
                    .configure_paths(PathDiscoveryConfig { ice_servers })
                    .await;
                Vec::new()
            }
            SessionEvent::JoinResult { other_peer, error } => {
                self.on_join_result(other_peer, error).await
            }
            SessionEvent::PeerJoined { peer_id } => self.on_peer_joined(peer_id).await,
            SessionEvent::SignalReceived { from, payload } => self.on_signal(from, payload).await,
            SessionEvent::PeerLeft { peer_id } => {
                if !self.state.is_terminal() {
                    info!(%peer_id, "peer left, closing call");
                    self.shutdown(SessionState::Closed).await;
                }
                Vec::new()
            }
            SessionEvent::EndCall => {
                // One-shot and idempotent.
                if !self.state.is_terminal() {
                    self.shutdown(SessionState::Closed).await;
                }
                Vec::new()
            }
            SessionEvent::NegotiationTimedOut => {
                if matches!(self.state, SessionState::Negotiating(_)) && !self.remote_description_set
                {
                    self.fail(FailureReason::Timeout).await;
                }
                Vec::new()
            }
        }
    }

    async fn on_join_result(
        &mut self,
        other_peer: Option<PeerId>,
        error: Option<JoinError>,
    ) -> Vec<ClientMessage> {
        if self.state != SessionState::LocalMediaReady {
            warn!(state = ?self.state, "unexpected join result, ignoring");
            return Vec::new();
        }

        if let Some(error) = error {
            let reason = match error {
                JoinError::RoomFull => FailureReason::RoomFull,
            };
            self.fail(reason).await;
            return Vec::new();
        }

        match other_peer {
            None => {
                // First into the room; the offer is ours to make once the
                // peer arrives.
                self.state = SessionState::AwaitingPeer;
            }
            Some(other) => {
                info!(%other, "paired as responder");
                self.remote_peer = Some(other);
                self.state = SessionState::Negotiating(Role::Responder);
            }
        }
        Vec::new()
    }

    async fn on_peer_joined(&mut self, peer_id: PeerId) -> Vec<ClientMessage> {
        if self.state != SessionState::AwaitingPeer {
            warn!(state = ?self.state, %peer_id, "unexpected peer-joined, ignoring");
            return Vec::new();
        }

        info!(%peer_id, "paired as initiator");
        self.remote_peer = Some(peer_id.clone());

        match self.transport.create_offer().await {
            Ok(offer) => {
                self.state = SessionState::Negotiating(Role::Initiator);
                vec![ClientMessage::Signal {
                    to: peer_id,
                    payload: SignalPayload::Offer(offer),
                }]
            }
            Err(e) => {
                self.fail(FailureReason::Negotiation(e.to_string())).await;
                Vec::new()
            }
        }
    }

    async fn on_signal(&mut self, from: PeerId, payload: SignalPayload) -> Vec<ClientMessage> {
        // A stray envelope from anyone but the recorded peer is dropped
        // without touching state.
        if self.remote_peer.as_ref() != Some(&from) {
            warn!(%from, "discarding signal from unexpected sender");
            return Vec::new();
        }

        match (self.state.clone(), payload) {
            (SessionState::Negotiating(Role::Responder), SignalPayload::Offer(remote))
                if !self.remote_description_set =>
            {
                match self.transport.accept_offer(remote).await {
                    Ok(answer) => {
                        self.remote_description_set = true;
                        if self.flush_pending_candidates().await.is_err() {
                            return Vec::new();
                        }
                        vec![ClientMessage::Signal {
                            to: from,
                            payload: SignalPayload::Answer(answer),
                        }]
                    }
                    Err(e) => {
                        self.fail(FailureReason::Negotiation(e.to_string())).await;
                        Vec::new()
                    }
                }
            }

            (SessionState::Negotiating(Role::Initiator), SignalPayload::Answer(remote)) => {
                match self.transport.apply_answer(remote).await {
                    Ok(()) => {
                        self.remote_description_set = true;
                        if self.flush_pending_candidates().await.is_err() {
                            return Vec::new();
                        }
                        self.state = SessionState::Connected;
                        Vec::new()
                    }
                    Err(e) => {
                        self.fail(FailureReason::Negotiation(e.to_string())).await;
                        Vec::new()
                    }
                }
            }

            (
                SessionState::Negotiating(_) | SessionState::Connected,
                SignalPayload::Candidate(candidate),
            ) => {
                if self.remote_description_set {
                    if let Err(e) = self.transport.apply_candidate(candidate).await {
                        self.fail(FailureReason::Negotiation(e.to_string())).await;
                    }
                } else {
                    debug!("buffering candidate until the remote description is set");
                    self.pending_candidates.push(candidate);
                }
                Vec::new()
            }

            // Duplicate offers/answers, or signals in a state that has no
            // use for them: discard, keep state.
            (state, payload) => {
                warn!(state = ?state, ?payload, "discarding signal with no matching transition");
                Vec::new()
            }
        }
    }

    /// Replays buffered candidates in arrival order. Called exactly when
    /// the remote description flips to set.
    async fn flush_pending_candidates(&mut self) -> Result<(), TransportError> {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.apply_candidate(candidate).await {
                self.fail(FailureReason::Negotiation(e.to_string())).await;
                return Err(e);
            }
        }
        Ok(())
    }

    async fn fail(&mut self, reason: FailureReason) {
        warn!(%reason, "negotiation failed");
        self.shutdown(SessionState::Failed(reason)).await;
    }

    /// Release media, close the transport and settle on a terminal state.
    /// Safe to reach from any state; double release cannot happen because
    /// the handle is taken out.
    async fn shutdown(&mut self, terminal: SessionState) {
        if let Some(handle) = self.media_handle.take() {
            self.media.release(handle).await;
        }
        self.transport.close().await;
        self.pending_candidates.clear();
        self.state = terminal;
    }
}
