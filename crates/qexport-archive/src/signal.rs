//! Abort and timeout signalling

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Triggers the abort of an export
#[derive(Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by the assembler: once raised no further entries are opened
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl AbortSignal {
    /// A connected handle/signal pair
    pub fn new() -> (AbortHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (AbortHandle { tx }, Self { rx, deadline: None })
    }

    /// A signal that only ever fires through its deadline, if one is set
    pub fn never() -> Self {
        Self::new().1
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow() || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Completes once the signal is raised or the deadline passes
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        let raised = async move {
            // a dropped handle can no longer raise the signal
            let closed = rx.wait_for(|aborted| *aborted).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                () = raised => {}
                () = tokio::time::sleep_until(deadline) => {}
            },
            None => raised.await,
        }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::never()
    }
}
