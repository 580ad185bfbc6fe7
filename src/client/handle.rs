use log::warn;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use crate::{Error, Result};
use crate::client::state::StatusSnapshot;
use crate::negotiation::StreamTarget;

/// Operations forwarded to a spawned manager
#[derive(Debug, Clone)]
pub(crate) enum Command {
    Connect(StreamTarget),
    Disconnect,
    ManualRetry,
    Destroy,
}

/// Handle to a manager running on its own task
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<StatusSnapshot>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        snapshots: watch::Receiver<StatusSnapshot>,
        task: JoinHandle<()>,
    ) -> Self {
        ConnectionHandle {
            commands,
            snapshots,
            task,
        }
    }

    pub fn connect(&self, target: StreamTarget) -> Result<()> {
        self.send(Command::Connect(target))
    }

    pub fn disconnect(&self) -> Result<()> {
        self.send(Command::Disconnect)
    }

    pub fn manual_retry(&self) -> Result<()> {
        self.send(Command::ManualRetry)
    }

    /// Destroy the manager. The task exits once the command is handled.
    pub fn destroy(&self) -> Result<()> {
        if self.commands.is_closed() {
            return Ok(());
        }
        self.send(Command::Destroy)
    }

    /// Subscribe to status snapshots
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait for the manager task to finish
    pub async fn join(self) -> Result<()> {
        self.task.await
            .map_err(|e| Error::invalid_state(format!("Manager task failed: {}", e)))
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|e| {
            warn!("Manager task gone, dropping {:?}", e.0);
            Error::channel_closed("connection manager task has stopped")
        })
    }
}
