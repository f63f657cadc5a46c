use crate::model::peer::PeerId;
use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Why a join request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum JoinError {
    #[error("room is already full")]
    RoomFull,
}

/// Opaque negotiation payload carried between peers. The relay forwards
/// these verbatim and never inspects the contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum SignalPayload {
    Offer(String),
    Answer(String),
    Candidate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    Join {
        session_id: SessionId,
    },
    Signal {
        to: PeerId,
        payload: SignalPayload,
    },
    /// Graceful departure; the server treats it like a transport close.
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    /// First message after connect: the server-assigned identifier.
    Welcome {
        peer_id: PeerId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    JoinAck {
        ok: bool,
        other_peer_id: Option<PeerId>,
        error: Option<JoinError>,
    },
    /// A relayed envelope. `from` is stamped by the server, never taken
    /// from the sender.
    Signal {
        from: PeerId,
        payload: SignalPayload,
    },
    PeerJoined {
        peer_id: PeerId,
    },
    PeerLeft {
        peer_id: PeerId,
    },
}
