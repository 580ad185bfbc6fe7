use thiserror::Error;
use url::Url;
use crate::transport::event::{EventSink, SignalingFailure};

/// Requested video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            width: 1280,
            height: 720,
        }
    }
}

/// Options passed to the transport when a session is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Receive video
    pub video_enabled: bool,

    /// Receive audio
    pub audio_enabled: bool,

    /// Receive-only session (no local media is sent)
    pub recv_only: bool,

    /// Requested resolution
    pub resolution: Resolution,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            video_enabled: true,
            audio_enabled: false,
            recv_only: true,
            resolution: Resolution::default(),
        }
    }
}

/// Errors a transport may return when opening a session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The underlying WebRTC client/runtime is missing
    #[error("WebRTC client unavailable: {0}")]
    Unavailable(String),

    /// Signaling endpoint rejected the session
    #[error("Signaling failed: {0}")]
    Signaling(SignalingFailure),

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Factory for media sessions against a signaling endpoint
#[async_trait::async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Open a session. Events for the session must be pushed through `events`.
    async fn open(
        &self,
        signaling_url: &Url,
        options: &SessionOptions,
        events: EventSink,
    ) -> std::result::Result<Box<dyn TransportSession>, TransportError>;
}

/// An open media session
#[async_trait::async_trait]
pub trait TransportSession: Send + Sync {
    /// Close the session. Must be safe to call more than once.
    async fn close(&mut self);
}
