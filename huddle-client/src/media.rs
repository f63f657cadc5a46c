use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// What to capture. A call wants both by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}

/// Acquisition failures are fatal to starting a call and must be shown to
/// the user; retrying requires fresh user consent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("permission to use the camera or microphone was denied")]
    PermissionDenied,
    #[error("no camera or microphone was detected")]
    DeviceNotFound,
    #[error("media capture is not supported on this device")]
    Unsupported,
}

/// Opaque handle to a running local capture stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaHandle(pub Uuid);

impl MediaHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The local camera/microphone capability. Acquisition carries
/// user-interaction latency (permission prompt), so it is async.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<MediaHandle, MediaError>;

    async fn release(&self, handle: MediaHandle);
}
