//! Awaitable completion of a durable sync request
//!
//! A [`SyncToken`] is returned by every sync request. It resolves exactly
//! once, with the outcome of the flush that covered the request. Callers may:
//! - `.await` it from async code
//! - [`SyncToken::wait`] on it from synchronous code
//! - poll it with [`SyncToken::try_result`]
//! - drop it, which makes the request fire-and-forget
//!
//! The producing side holds the matching [`SyncCompleter`]. Dropping a
//! completer without calling [`SyncCompleter::complete`] resolves the token
//! with [`Error::SyncAborted`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Completion signal for a durable sync request
#[derive(Debug)]
#[must_use = "drop the token explicitly to make a sync request fire-and-forget"]
pub struct SyncToken {
    rx: oneshot::Receiver<Result<()>>,
}

/// Producer half of a [`SyncToken`]
#[derive(Debug)]
pub struct SyncCompleter {
    tx: oneshot::Sender<Result<()>>,
}

impl SyncToken {
    /// Create a pending token and its completer
    pub fn pending() -> (SyncCompleter, SyncToken) {
        let (tx, rx) = oneshot::channel();
        (SyncCompleter { tx }, SyncToken { rx })
    }

    /// Create a token that is already resolved
    ///
    /// Used by media with nothing to flush.
    pub fn ready(result: Result<()>) -> SyncToken {
        let (completer, token) = SyncToken::pending();
        completer.complete(result);
        token
    }

    /// Block the current thread until the sync completes
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; use
    /// `.await` there instead.
    pub fn wait(self) -> Result<()> {
        self.rx.blocking_recv().unwrap_or(Err(Error::SyncAborted))
    }

    /// Non-blocking check for completion
    ///
    /// Returns `None` while the sync is still in flight. Once a result has
    /// been returned the token is spent and further calls yield
    /// `Some(Err(Error::SyncAborted))`.
    pub fn try_result(&mut self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(Error::SyncAborted)),
        }
    }
}

impl Future for SyncToken {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(Error::SyncAborted)))
    }
}

impl SyncCompleter {
    /// Resolve the token with `result`
    ///
    /// A token that has already been dropped is ignored.
    pub fn complete(self, result: Result<()>) {
        let _ = self.tx.send(result);
    }

    /// Check whether the token side is still interested
    pub fn is_waiting(&self) -> bool {
        !self.tx.is_closed()
    }
}
