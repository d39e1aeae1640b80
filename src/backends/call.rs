//! Per-call deadline and cancellation.
//!
//! Every backend request runs inside a [`CallContext`]: it either completes,
//! hits its deadline, or is cancelled through a [`CancelToken`]. A hung
//! backend therefore never hangs its caller past the deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Result, StorageError};

/// Owner side of a cancellation signal.
///
/// Cloning shares the signal; cancelling any clone trips every token.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A token observing this handle.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Trip the signal. In-flight and later calls fail with `Cancelled`.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        CancelHandle::new().token()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal is tripped.
    ///
    /// Pends forever if the handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Deadline and cancellation for one backend call.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Duration,
    token: CancelToken,
}

impl CallContext {
    /// A context with the given deadline and no cancellation.
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            token: CancelToken::never(),
        }
    }

    /// Attach a cancel token.
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` to completion unless the deadline passes or the token trips.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(StorageError::cancelled(operation));
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!(operation, "call cancelled");
                Err(StorageError::cancelled(operation))
            }
            outcome = tokio::time::timeout(self.deadline, fut) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!(operation, deadline = ?self.deadline, "call timed out");
                    Err(StorageError::timeout(operation, self.deadline))
                }
            },
        }
    }
}
