use std::time::Duration;
use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use crate::backoff::policy::BackoffPolicy;
use crate::transport::Envelope;
use crate::utils::format_delay;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Backoff retry of the current candidate
    Reconnect,

    /// Short pause before trying the next stream format
    NextFormat,
}

struct PendingTimer {
    token: u64,
    kind: TimerKind,
    delay: Duration,
    handle: JoinHandle<()>,
}

/// Owner of the single outstanding timer
pub struct BackoffScheduler {
    policy: BackoffPolicy,
    pending: Option<PendingTimer>,
}

impl BackoffScheduler {
    pub fn new(policy: BackoffPolicy) -> Self {
        BackoffScheduler {
            policy,
            pending: None,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Schedule a backoff retry for 0-indexed `attempt`, returning the delay
    pub fn schedule_backoff(
        &mut self,
        attempt: u32,
        token: u64,
        tx: mpsc::UnboundedSender<Envelope>,
    ) -> Duration {
        let delay = self.policy.delay(attempt);
        self.schedule(TimerKind::Reconnect, delay, token, tx);
        delay
    }

    /// Schedule a timer, cancelling any pending one first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &mut self,
        kind: TimerKind,
        delay: Duration,
        token: u64,
        tx: mpsc::UnboundedSender<Envelope>,
    ) {
        self.cancel();

        debug!("Scheduling {:?} timer #{} in {}", kind, token, format_delay(delay));

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Envelope::timer(token, kind));
        });

        self.pending = Some(PendingTimer {
            token,
            kind,
            delay,
            handle,
        });
    }

    /// Cancel the pending timer. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(timer) => {
                timer.handle.abort();
                debug!("Cancelled {:?} timer #{}", timer.kind, timer.token);
                true
            }
            None => false,
        }
    }

    /// Claim a fired timer. Returns its kind if `token` is the pending timer.
    pub fn take_fired(&mut self, token: u64) -> Option<TimerKind> {
        if self.pending_token() != Some(token) {
            return None;
        }
        self.pending.take().map(|timer| timer.kind)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_token(&self) -> Option<u64> {
        self.pending.as_ref().map(|timer| timer.token)
    }

    pub fn pending_kind(&self) -> Option<TimerKind> {
        self.pending.as_ref().map(|timer| timer.kind)
    }

    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.as_ref().map(|timer| timer.delay)
    }
}

impl Drop for BackoffScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
