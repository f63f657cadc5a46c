use async_trait::async_trait;
use huddle_core::IceServerConfig;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// The negotiation side of the real-time media transport. The session
/// drives it with opaque descriptions and candidates; what they contain is
/// the transport's business.
///
/// `accept_offer` and `apply_answer` both set the remote description;
/// candidates may only be applied after one of them has succeeded.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Hand over the path-discovery configuration. Arrives once, right
    /// after connecting, before any offer is produced.
    async fn configure_paths(&self, config: PathDiscoveryConfig);

    /// Produce the local capability offer (initiator side).
    async fn create_offer(&self) -> Result<String, TransportError>;

    /// Apply a remote offer and produce the answer (responder side).
    async fn accept_offer(&self, remote: String) -> Result<String, TransportError>;

    /// Apply the remote answer (initiator side).
    async fn apply_answer(&self, remote: String) -> Result<(), TransportError>;

    /// Apply one discovered network-path candidate.
    async fn apply_candidate(&self, candidate: String) -> Result<(), TransportError>;

    /// Tear down the negotiation context. Must tolerate repeat calls.
    async fn close(&self);
}

/// Startup configuration for the path-discovery assistive service.
/// Supplied by the application (usually from the server's `IceConfig`
/// message); never negotiated at runtime.
#[derive(Debug, Clone, Default)]
pub struct PathDiscoveryConfig {
    pub ice_servers: Vec<IceServerConfig>,
}
