use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use url::Url;
use uuid::Uuid;
use crate::Result;
use crate::backoff::{BackoffScheduler, RetryBudget, TimerKind};
use crate::classify::{classify_event, classify_open_error, Classification, ErrorCategory, FailureKind};
use crate::client::config::ManagerConfig;
use crate::client::handle::{Command, ConnectionHandle};
use crate::client::state::{ConnectionStatus, StatusSnapshot};
use crate::negotiation::{CandidateList, StreamTarget};
use crate::transport::{
    build_signaling_url, Envelope, EventSink, Signal, TransportAdapter, TransportError,
    TransportEvent, TransportSession,
};
use crate::utils::{format_delay, now_utc};

/// Session currently owned by the manager
struct ActiveSession {
    token: u64,
    id: Uuid,
    candidate: StreamTarget,
    session: Box<dyn TransportSession>,
}

/// Connection lifecycle and retry orchestrator.
///
/// Owns the only transport session and the only timer. Status changes only
/// through the four public operations and `dispatch`.
pub struct ConnectionManager<T: TransportAdapter> {
    /// Manager configuration
    config: Arc<ManagerConfig>,

    /// Parsed signaling base endpoint
    signaling_base: Url,

    /// Injected transport
    transport: T,

    status: ConnectionStatus,
    status_message: String,
    error_message: Option<String>,

    /// Target of the current connection
    target: Option<StreamTarget>,

    /// Candidates for `target`
    candidates: Option<CandidateList>,

    budget: RetryBudget,
    scheduler: BackoffScheduler,
    session: Option<ActiveSession>,

    /// Last issued session/timer token
    last_token: u64,

    destroyed: bool,

    /// Single inbound channel for transport events and timers
    events_tx: mpsc::UnboundedSender<Envelope>,
    events_rx: mpsc::UnboundedReceiver<Envelope>,

    snapshot_tx: watch::Sender<StatusSnapshot>,

    /// Command channel while running as a spawned task
    commands: Option<mpsc::UnboundedReceiver<Command>>,

    /// Command that cut an in-flight `open` short
    interrupted: Option<Command>,
}

/// How an interruptible `open` ended
enum Opening {
    Done(std::result::Result<Box<dyn TransportSession>, TransportError>),
    Interrupted(Command),
}

impl<T: TransportAdapter> ConnectionManager<T> {
    /// Create a manager bound to `transport`
    pub fn new(config: ManagerConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let signaling_base = config.signaling_base()?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(StatusSnapshot::initial(config.max_attempts));

        Ok(ConnectionManager {
            budget: RetryBudget::new(config.max_attempts),
            scheduler: BackoffScheduler::new(config.backoff_policy()),
            config: Arc::new(config),
            signaling_base,
            transport,
            status: ConnectionStatus::Idle,
            status_message: String::new(),
            error_message: None,
            target: None,
            candidates: None,
            session: None,
            last_token: 0,
            destroyed: false,
            events_tx,
            events_rx,
            snapshot_tx,
            commands: None,
            interrupted: None,
        })
    }

    /// Start connecting to `target`, tearing down whatever was in flight
    pub async fn connect(&mut self, target: StreamTarget) {
        if self.destroyed {
            warn!("connect({}) ignored: manager destroyed", target);
            return;
        }

        self.teardown().await;
        self.budget.reset();

        if !target.is_specified() {
            self.target = Some(target);
            self.candidates = None;
            self.fail("No stream specified".to_string());
            return;
        }

        let candidates = CandidateList::new(target.clone(), &self.config.namespaces);
        info!("Connecting to {} ({} candidate formats)", candidates.target(), candidates.len());
        debug!(
            "Candidates: {}",
            candidates.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
        );

        self.target = Some(target);
        self.candidates = Some(candidates);

        let message = self.connecting_message("Connecting to");
        self.transition(ConnectionStatus::Connecting, message);
        self.open_current().await;
    }

    /// Cancel the pending timer and close the open session. Status is left as is.
    pub async fn disconnect(&mut self) {
        self.teardown().await;
    }

    /// Reset the retry budget and reconnect to the current target
    pub async fn manual_retry(&mut self) {
        if self.destroyed {
            warn!("manual_retry ignored: manager destroyed");
            return;
        }

        self.budget.reset();
        self.scheduler.cancel();

        let target = self.target.clone().unwrap_or_default();
        info!("Manual retry for {}", target);
        self.connect(target).await;
    }

    /// Tear down and block every further transition. Idempotent.
    pub async fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.teardown().await;
        info!("Connection manager destroyed");
    }

    /// Await the next transport event or timer and dispatch it.
    ///
    /// Returns true if it caused a state change attempt, false if it was stale.
    pub async fn process_next(&mut self) -> bool {
        if self.destroyed {
            return false;
        }

        match self.events_rx.recv().await {
            Some(envelope) => self.dispatch(envelope).await,
            None => false,
        }
    }

    /// Single entry point for transport events and timers
    pub async fn dispatch(&mut self, envelope: Envelope) -> bool {
        if self.destroyed {
            debug!("Dropping envelope #{} after destroy", envelope.token);
            return false;
        }

        match envelope.signal {
            Signal::Transport(event) => {
                let live = self.session.as_ref()
                    .filter(|active| active.token == envelope.token)
                    .map(|active| active.id);

                match live {
                    Some(session_id) => {
                        debug!("Session {} event: {:?}", session_id, event);
                        self.on_transport_event(event).await;
                        true
                    }
                    None => {
                        debug!("Dropping stale event from session #{}: {:?}", envelope.token, event);
                        false
                    }
                }
            }
            Signal::TimerFired(_) => match self.scheduler.take_fired(envelope.token) {
                Some(kind) => {
                    self.on_timer(kind).await;
                    true
                }
                None => {
                    debug!("Dropping stale timer #{}", envelope.token);
                    false
                }
            },
        }
    }

    /// Move the manager onto its own task and return a handle to it
    pub fn spawn(self) -> ConnectionHandle
    where
        T: 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let snapshots = self.subscribe();
        let task = tokio::spawn(self.run(command_rx));
        ConnectionHandle::new(command_tx, snapshots, task)
    }

    async fn run(mut self, commands: mpsc::UnboundedReceiver<Command>) {
        self.commands = Some(commands);

        loop {
            let command = match self.interrupted.take() {
                Some(command) => command,
                None => tokio::select! {
                    command = next_command(&mut self.commands) => command,
                    Some(envelope) = self.events_rx.recv() => {
                        self.dispatch(envelope).await;
                        continue;
                    }
                },
            };

            match command {
                Command::Connect(target) => self.connect(target).await,
                Command::Disconnect => self.disconnect().await,
                Command::ManualRetry => self.manual_retry().await,
                Command::Destroy => {
                    self.destroy().await;
                    break;
                }
            }
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Error text, only set in `Error`
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Backoff reconnects consumed since the last success or connect
    pub fn retry_count(&self) -> u32 {
        self.budget.attempt()
    }

    pub fn current_target(&self) -> Option<&StreamTarget> {
        self.target.as_ref()
    }

    /// Candidate being tried
    pub fn current_candidate(&self) -> Option<&StreamTarget> {
        self.candidates.as_ref().and_then(|list| list.current())
    }

    /// Delay of the pending timer
    pub fn pending_delay(&self) -> Option<Duration> {
        self.scheduler.pending_delay()
    }

    pub fn pending_timer(&self) -> Option<TimerKind> {
        self.scheduler.pending_kind()
    }

    pub fn has_open_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            status_message: self.status_message.clone(),
            error_message: self.error_message.clone(),
            retry_count: self.budget.attempt(),
            max_attempts: self.budget.max_attempts(),
            target: self.target.clone(),
            candidate_index: self.candidates.as_ref().map_or(0, |list| list.index()),
            candidate_count: self.candidates.as_ref().map_or(0, |list| list.len()),
            changed_at: now_utc(),
        }
    }

    async fn on_transport_event(&mut self, event: TransportEvent) {
        match classify_event(&event) {
            Classification::Connected => self.on_connected(),
            Classification::Ignored => {}
            Classification::Failure(kind) => {
                warn!("Transport failure {:?}: {:?}", kind, event);
                self.handle_failure(kind).await;
            }
        }
    }

    fn on_connected(&mut self) {
        if self.status == ConnectionStatus::Playing {
            return;
        }

        self.budget.reset();
        let candidate = self.current_candidate()
            .map(|c| c.to_string())
            .unwrap_or_default();
        info!("Playing {}", candidate);
        self.transition(ConnectionStatus::Playing, format!("Playing {}", candidate));
    }

    async fn on_timer(&mut self, kind: TimerKind) {
        let message = match kind {
            TimerKind::Reconnect => format!(
                "Reconnecting to {} (attempt {}/{})",
                self.current_candidate().map(|c| c.to_string()).unwrap_or_default(),
                self.budget.attempt(),
                self.budget.max_attempts(),
            ),
            TimerKind::NextFormat => self.connecting_message("Trying"),
        };

        self.transition(ConnectionStatus::Connecting, message);
        self.open_current().await;
    }

    async fn handle_failure(&mut self, kind: FailureKind) {
        match kind.category() {
            ErrorCategory::Negotiable => self.advance_format().await,
            ErrorCategory::Transient | ErrorCategory::DegradedRemote => self.schedule_retry(kind).await,
            ErrorCategory::Fatal => {
                self.teardown().await;
                self.fail(kind.describe().to_string());
            }
        }
    }

    /// Move to the next candidate after a short pause, or fail when none remain
    async fn advance_format(&mut self) {
        self.close_session().await;

        let next = self.candidates.as_mut().and_then(|list| list.advance().cloned());
        match next {
            Some(candidate) => {
                debug!("Stream not found, next format {}", candidate);
                let token = self.issue_token();
                self.scheduler.schedule(
                    TimerKind::NextFormat,
                    self.config.format_retry_delay,
                    token,
                    self.events_tx.clone(),
                );
                let message = self.connecting_message("Stream not found, trying");
                self.transition(ConnectionStatus::Connecting, message);
            }
            None => {
                self.scheduler.cancel();
                self.fail("Stream not found (tried all formats)".to_string());
            }
        }
    }

    /// Schedule a backoff retry of the current candidate, or fail when the budget is spent
    async fn schedule_retry(&mut self, kind: FailureKind) {
        self.close_session().await;

        let attempt_index = self.budget.attempt();
        let Some(attempt) = self.budget.try_consume() else {
            self.scheduler.cancel();
            self.fail(format!("{} (Max retries reached)", kind.describe()));
            return;
        };

        let token = self.issue_token();
        let delay = self.scheduler.schedule_backoff(attempt_index, token, self.events_tx.clone());
        let max = self.budget.max_attempts();

        let (status, message) = match kind {
            FailureKind::ServerRestart => (
                ConnectionStatus::ServerDown,
                format!("Server unavailable, retrying in {} ({}/{})", format_delay(delay), attempt, max),
            ),
            _ => (
                ConnectionStatus::Reconnecting,
                format!("{}, reconnecting in {} ({}/{})", kind.describe(), format_delay(delay), attempt, max),
            ),
        };
        info!("{}", message);
        self.transition(status, message);
    }

    /// Open a session for the current candidate
    async fn open_current(&mut self) {
        let Some(candidate) = self.current_candidate().cloned() else {
            self.fail("Stream not found (tried all formats)".to_string());
            return;
        };

        let url = build_signaling_url(&self.signaling_base, &candidate);
        let token = self.issue_token();
        let id = Uuid::new_v4();
        let sink = EventSink::new(token, id, self.events_tx.clone());

        debug!("Opening session {} (#{}) for {}", id, token, candidate);

        let open = self.transport.open(&url, &self.config.session, sink);
        let opening = match self.commands.as_mut() {
            // A command arriving mid-open wins; dropping the open future discards its session
            Some(commands) => tokio::select! {
                result = open => Opening::Done(result),
                command = commands.recv() => Opening::Interrupted(command.unwrap_or(Command::Destroy)),
            },
            None => Opening::Done(open.await),
        };

        let result = match opening {
            Opening::Done(result) => result,
            Opening::Interrupted(command) => {
                info!("Open of session {} for {} abandoned by {:?}", id, candidate, command);
                self.interrupted = Some(command);
                return;
            }
        };

        match result {
            Ok(session) => {
                self.session = Some(ActiveSession {
                    token,
                    id,
                    candidate,
                    session,
                });
            }
            Err(err) => {
                error!("Failed to open session for {}: {}", candidate, err);
                self.handle_failure(classify_open_error(&err)).await;
            }
        }
    }

    async fn close_session(&mut self) {
        if let Some(mut active) = self.session.take() {
            active.session.close().await;
            debug!("Closed session {} (#{}) for {}", active.id, active.token, active.candidate);
        }
    }

    async fn teardown(&mut self) {
        self.scheduler.cancel();
        self.close_session().await;
    }

    fn issue_token(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    fn connecting_message(&self, verb: &str) -> String {
        match (&self.candidates, self.current_candidate()) {
            (Some(list), Some(candidate)) => format!(
                "{} {} (format {}/{})",
                verb,
                candidate,
                list.index() + 1,
                list.len()
            ),
            _ => verb.to_string(),
        }
    }

    fn fail(&mut self, message: String) {
        error!("{}", message);
        self.error_message = Some(message.clone());
        self.set_status(ConnectionStatus::Error, message);
    }

    fn transition(&mut self, status: ConnectionStatus, message: String) {
        self.error_message = None;
        self.set_status(status, message);
    }

    fn set_status(&mut self, status: ConnectionStatus, message: String) {
        if !self.status.can_transition_to(status) {
            warn!("Unexpected transition {} -> {}", self.status, status);
        }
        debug!("Status {} -> {}: {}", self.status, status, message);

        self.status = status;
        self.status_message = message;
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Next command, or never when not running as a task
async fn next_command(commands: &mut Option<mpsc::UnboundedReceiver<Command>>) -> Command {
    match commands {
        Some(rx) => rx.recv().await.unwrap_or(Command::Destroy),
        None => std::future::pending().await,
    }
}
