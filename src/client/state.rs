use std::fmt;
use chrono::{DateTime, Utc};
use crate::negotiation::StreamTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Nothing requested yet
    Idle,

    /// Session being opened for a candidate
    Connecting,

    /// Waiting for a backoff retry
    Reconnecting,

    /// Media flowing
    Playing,

    /// Terminal failure, needs connect or manual retry
    Error,

    /// Appliance restarting, waiting for a backoff retry
    ServerDown,
}

impl ConnectionStatus {
    /// Check if a session or retry is in progress
    pub fn is_active(&self) -> bool {
        matches!(self,
            ConnectionStatus::Connecting |
            ConnectionStatus::Reconnecting |
            ConnectionStatus::ServerDown)
    }

    /// Validate transition
    pub fn can_transition_to(&self, next: ConnectionStatus) -> bool {
        match (*self, next) {
            (_, ConnectionStatus::Connecting) => true,
            (_, ConnectionStatus::Error) => true,
            (ConnectionStatus::Connecting, ConnectionStatus::Playing) => true,
            (ConnectionStatus::Connecting, ConnectionStatus::Reconnecting) => true,
            (ConnectionStatus::Playing, ConnectionStatus::Reconnecting) => true,
            (ConnectionStatus::Connecting, ConnectionStatus::ServerDown) => true,
            (ConnectionStatus::Reconnecting, ConnectionStatus::ServerDown) => true,
            (ConnectionStatus::Playing, ConnectionStatus::ServerDown) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Idle => "idle",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Playing => "playing",
            ConnectionStatus::Error => "error",
            ConnectionStatus::ServerDown => "server_down",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the manager for UI observers
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub status: ConnectionStatus,
    pub status_message: String,
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub max_attempts: u32,
    pub target: Option<StreamTarget>,
    pub candidate_index: usize,
    pub candidate_count: usize,
    pub changed_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub(crate) fn initial(max_attempts: u32) -> Self {
        StatusSnapshot {
            status: ConnectionStatus::Idle,
            status_message: String::new(),
            error_message: None,
            retry_count: 0,
            max_attempts,
            target: None,
            candidate_index: 0,
            candidate_count: 0,
            changed_at: crate::utils::now_utc(),
        }
    }
}
