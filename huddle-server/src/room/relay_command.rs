use huddle_core::{PeerId, SessionId, SignalPayload};

/// Commands flowing from the connection layer (WebSocket) into the relay.
#[derive(Debug)]
pub enum RelayCommand {
    /// A peer asks to be paired under a session id.
    Join {
        peer_id: PeerId,
        session_id: SessionId,
    },

    /// An opaque negotiation envelope to forward to another peer.
    Signal {
        peer_id: PeerId,
        to: PeerId,
        payload: SignalPayload,
    },

    /// The peer's connection ended, gracefully or not.
    Disconnect { peer_id: PeerId },
}
