use huddle_core::{PeerId, ServerMessage};
use async_trait::async_trait;

/// Outbound side of the relay: whatever terminates the connections
/// (the WebSocket layer in production, a capture mock in tests) implements
/// this so the relay can push messages to peers.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver a message to a peer. Delivery to a peer that is gone is a
    /// silent no-op.
    async fn send(&self, peer_id: PeerId, message: ServerMessage);

    /// Whether the peer currently has a live connection.
    fn is_connected(&self, peer_id: &PeerId) -> bool;
}
