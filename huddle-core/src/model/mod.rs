mod peer;
mod session;
mod signaling;

pub use peer::PeerId;
pub use session::SessionId;
pub use signaling::{ClientMessage, IceServerConfig, JoinError, ServerMessage, SignalPayload};
