use crate::transport::{PeerState, SignalingFailure, TransportError, TransportEvent};

/// How a failure is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Resolved by trying the next stream format
    Negotiable,

    /// Resolved by backoff retry
    Transient,

    /// Remote appliance restarting, retried like `Transient`
    DegradedRemote,

    /// No retry
    Fatal,
}

/// Categories of transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    StreamNotFound,
    ConnectionLost,
    IceNegotiationFailed,
    PlaybackError,
    ServerRestart,
    TransportUnavailable,
}

impl FailureKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FailureKind::StreamNotFound => ErrorCategory::Negotiable,
            FailureKind::ConnectionLost
            | FailureKind::IceNegotiationFailed
            | FailureKind::PlaybackError => ErrorCategory::Transient,
            FailureKind::ServerRestart => ErrorCategory::DegradedRemote,
            FailureKind::TransportUnavailable => ErrorCategory::Fatal,
        }
    }

    /// User-facing description
    pub fn describe(&self) -> &'static str {
        match self {
            FailureKind::StreamNotFound => "Stream not found",
            FailureKind::ConnectionLost => "Connection lost",
            FailureKind::IceNegotiationFailed => "ICE negotiation failed",
            FailureKind::PlaybackError => "Playback error",
            FailureKind::ServerRestart => "Server unavailable",
            FailureKind::TransportUnavailable => "WebRTC client unavailable",
        }
    }
}

/// Result of classifying a transport event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Media is flowing
    Connected,

    /// Informational, no transition
    Ignored,

    Failure(FailureKind),
}

/// Classify an event emitted by an open session
pub fn classify_event(event: &TransportEvent) -> Classification {
    match event {
        TransportEvent::RemoteStreamReceived => Classification::Connected,
        TransportEvent::ConnectionStateChanged(state) => match state {
            PeerState::Connected => Classification::Connected,
            PeerState::Connecting => Classification::Ignored,
            PeerState::Failed | PeerState::Disconnected => {
                Classification::Failure(FailureKind::ConnectionLost)
            }
        },
        TransportEvent::IceCandidateError(_) => Classification::Failure(FailureKind::IceNegotiationFailed),
        TransportEvent::OfferAnswerExchangeFailed(failure) => {
            Classification::Failure(classify_signaling(failure))
        }
        TransportEvent::PlaybackError(_) => Classification::Failure(FailureKind::PlaybackError),
    }
}

/// Classify a signaling endpoint failure
pub fn classify_signaling(failure: &SignalingFailure) -> FailureKind {
    if failure.status == Some(404) || failure.message.to_lowercase().contains("not found") {
        return FailureKind::StreamNotFound;
    }

    match failure.status {
        Some(status) if (400..500).contains(&status) => FailureKind::ServerRestart,
        _ => FailureKind::ConnectionLost,
    }
}

/// Classify an error returned while opening a session
pub fn classify_open_error(error: &TransportError) -> FailureKind {
    match error {
        TransportError::Unavailable(_) => FailureKind::TransportUnavailable,
        TransportError::Signaling(failure) => classify_signaling(failure),
        TransportError::Other(_) => FailureKind::ConnectionLost,
    }
}
