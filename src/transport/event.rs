use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;
use crate::backoff::TimerKind;

/// Peer connection state reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Negotiation in progress
    Connecting,

    /// Media path established
    Connected,

    /// Connection failed
    Failed,

    /// Connection dropped after being established
    Disconnected,
}

/// Failure reported by the signaling endpoint during offer/answer exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalingFailure {
    /// HTTP status of the signaling response, if one was received
    pub status: Option<u16>,

    /// Application-level code from the response body
    pub code: Option<i32>,

    /// Human readable message
    pub message: String,
}

impl SignalingFailure {
    pub fn new(status: Option<u16>, code: Option<i32>, message: impl Into<String>) -> Self {
        SignalingFailure {
            status,
            code,
            message: message.into(),
        }
    }

    /// Failure carrying only an HTTP status
    pub fn http(status: u16) -> Self {
        SignalingFailure::new(Some(status), None, format!("HTTP {}", status))
    }
}

impl fmt::Display for SignalingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.code) {
            (Some(status), Some(code)) => write!(f, "{} (status {}, code {})", self.message, status, code),
            (Some(status), None) => write!(f, "{} (status {})", self.message, status),
            (None, Some(code)) => write!(f, "{} (code {})", self.message, code),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Events emitted by a transport session
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Remote media track arrived
    RemoteStreamReceived,

    /// Peer connection state changed
    ConnectionStateChanged(PeerState),

    /// ICE candidate gathering or checking failed
    IceCandidateError(String),

    /// SDP offer/answer exchange with the signaling endpoint failed
    OfferAnswerExchangeFailed(SignalingFailure),

    /// Media element failed to play the received stream
    PlaybackError(String),
}

/// Payload of an envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Transport(TransportEvent),
    TimerFired(TimerKind),
}

/// Message delivered to the connection manager, stamped with the token of
/// the session or timer that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub token: u64,
    pub signal: Signal,
}

impl Envelope {
    pub fn transport(token: u64, event: TransportEvent) -> Self {
        Envelope {
            token,
            signal: Signal::Transport(event),
        }
    }

    pub fn timer(token: u64, kind: TimerKind) -> Self {
        Envelope {
            token,
            signal: Signal::TimerFired(kind),
        }
    }
}

/// Sending side handed to a transport session.
///
/// Every event is stamped with the token of the session it was created for,
/// so events from a superseded session are recognised and dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    token: u64,
    session_id: Uuid,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSink {
    pub(crate) fn new(token: u64, session_id: Uuid, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        EventSink { token, session_id, tx }
    }

    /// Session token
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Session identifier used in logs
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Emit an event. Returns false once the manager is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx.send(Envelope::transport(self.token, event)).is_ok()
    }

    /// Check if the receiving manager has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
