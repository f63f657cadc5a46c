use huddle_core::{JoinError, PeerId, SessionId};
use std::collections::HashMap;

/// Result of resolving a join request against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The peer is the first occupant and waits for the other side.
    Waiting,
    /// The peer completed a pair; the existing member is returned.
    Paired(PeerId),
    /// The room already holds two members; nothing changed.
    Rejected(JoinError),
}

/// In-memory map from session id to the peers currently joined under it.
///
/// Rooms hold at most two members, a peer occupies at most one room at a
/// time, and an empty room is removed immediately. All mutation happens on
/// the relay task, so no internal locking is needed.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<SessionId, Vec<PeerId>>,
    peers: HashMap<PeerId, SessionId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, session_id: SessionId, peer_id: PeerId) -> JoinOutcome {
        if self.rooms.get(&session_id).is_some_and(|m| m.len() >= 2) {
            return JoinOutcome::Rejected(JoinError::RoomFull);
        }

        // A peer joining a new session implicitly leaves its old one.
        self.leave(&peer_id);

        let members = self.rooms.entry(session_id.clone()).or_default();
        members.push(peer_id.clone());
        self.peers.insert(peer_id.clone(), session_id);

        // Join order is significant: members[0] joined first and will act
        // as the initiator once the pair is complete.
        match members.iter().find(|m| **m != peer_id) {
            Some(other) => JoinOutcome::Paired(other.clone()),
            None => JoinOutcome::Waiting,
        }
    }

    /// Removes the peer from its room, deleting the room if it becomes
    /// empty. Returns the remaining co-member, if any, so the caller can
    /// send a peer-left notification. Leaving twice is a no-op.
    pub fn leave(&mut self, peer_id: &PeerId) -> Option<PeerId> {
        let session_id = self.peers.remove(peer_id)?;
        let members = self.rooms.get_mut(&session_id)?;
        members.retain(|m| m != peer_id);

        if members.is_empty() {
            self.rooms.remove(&session_id);
            return None;
        }

        members.first().cloned()
    }

    /// Looks up the session a peer currently occupies, used for cleanup
    /// on abrupt disconnect.
    pub fn resolve(&self, peer_id: &PeerId) -> Option<&SessionId> {
        self.peers.get(peer_id)
    }

    pub fn members(&self, session_id: &SessionId) -> &[PeerId] {
        self.rooms.get(session_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
