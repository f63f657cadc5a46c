use async_trait::async_trait;
use huddle_core::{PeerId, ServerMessage};
use huddle_server::SignalingOutput;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock SignalingOutput that stands in for the WebSocket layer: tracks
/// which peers are "connected" and captures every outgoing message.
#[derive(Clone)]
pub struct MockSignalingOutput {
    connected: Arc<Mutex<HashSet<PeerId>>>,
    messages: Arc<Mutex<Vec<(PeerId, ServerMessage)>>>,
    tx: mpsc::UnboundedSender<(PeerId, ServerMessage)>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(PeerId, ServerMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mock = Self {
            connected: Arc::new(Mutex::new(HashSet::new())),
            messages: Arc::new(Mutex::new(Vec::new())),
            tx,
        };
        (mock, rx)
    }

    /// Registers a peer as having a live connection.
    pub fn connect(&self, peer_id: &PeerId) {
        self.connected.lock().unwrap().insert(peer_id.clone());
    }

    pub fn disconnect(&self, peer_id: &PeerId) {
        self.connected.lock().unwrap().remove(peer_id);
    }

    /// All messages delivered to a specific peer, in delivery order.
    pub fn messages_for(&self, peer_id: &PeerId) -> Vec<ServerMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == peer_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, peer_id: PeerId, message: ServerMessage) {
        tracing::debug!(%peer_id, ?message, "[MockSignaling] send");
        self.messages
            .lock()
            .unwrap()
            .push((peer_id.clone(), message.clone()));
        let _ = self.tx.send((peer_id, message));
    }

    fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.connected.lock().unwrap().contains(peer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_captures_messages_per_peer() {
        let (mock, mut rx) = MockSignalingOutput::new();
        let peer = PeerId::new();

        mock.send(
            peer.clone(),
            ServerMessage::PeerJoined {
                peer_id: PeerId::new(),
            },
        )
        .await;

        assert_eq!(mock.messages_for(&peer).len(), 1);
        assert!(rx.recv().await.is_some());
    }

    #[test]
    fn connectivity_tracking() {
        let (mock, _rx) = MockSignalingOutput::new();
        let peer = PeerId::new();

        assert!(!mock.is_connected(&peer));
        mock.connect(&peer);
        assert!(mock.is_connected(&peer));
        mock.disconnect(&peer);
        assert!(!mock.is_connected(&peer));
    }
}
