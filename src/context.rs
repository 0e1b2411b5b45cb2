//! Request-scoped context.
//!
//! A [`Context`] travels by value through every middleware step: each step
//! receives the context produced by the previous one and returns the context
//! the next one will see. It carries three things:
//!
//! - **Values** — typed, keyed by their Rust type (`with_value` / `value`).
//! - **Cancellation** — a token that can be cancelled from outside the chain,
//!   plus an optional deadline.
//! - **Failure** — set by a step that wants the chain to stop (`fail`).
//!
//! [`Context::err`] folds the last two into one observation. The chain only
//! checks whether it is `Some`.
//!
//! ```rust
//! use chainware::Context;
//!
//! #[derive(Clone)]
//! struct UserId(u64);
//!
//! let cx = Context::background().with_value(UserId(7));
//! assert_eq!(cx.value::<UserId>().map(|u| u.0), Some(7));
//! assert!(cx.err().is_none());
//!
//! let cx = cx.fail("no session");
//! assert!(cx.err().is_some());
//! ```

use std::error::Error as StdError;
use std::time::Duration;

use http::Extensions;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Request-scoped carrier of values, cancellation and failure state.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: Extensions,
    token: CancellationToken,
    deadline: Option<Instant>,
    failure: Option<Error>,
}

impl Context {
    /// An empty context: no values, never cancelled, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    // ── Values ───────────────────────────────────────────────────────────────

    /// Stores `value`, replacing any earlier value of the same type.
    pub fn with_value<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.values.insert(value);
        self
    }

    pub fn value<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.values.get::<T>()
    }

    // ── Cancellation ─────────────────────────────────────────────────────────

    /// Derives a cancellable child.
    ///
    /// Cancelling the returned handle cancels the child only. Cancelling a
    /// parent handle cancels every child derived from it.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        self.token = self.token.child_token();
        let handle = CancelHandle(self.token.clone());
        (self, handle)
    }

    /// Sets a deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    ///
    /// A stored failure does not resolve it: failure stops the chain, it does
    /// not cancel work already running.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => tokio::select! {
                () = self.token.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => {}
            },
            None => self.token.cancelled().await,
        }
    }

    // ── Failure ──────────────────────────────────────────────────────────────

    /// Marks the context as failed, which stops the chain after the current
    /// step. The first failure wins; later calls keep it.
    pub fn fail(mut self, err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        if self.failure.is_none() {
            self.failure = Some(Error::halt(err));
        }
        self
    }

    /// The error observation: the stored failure, else cancellation, else an
    /// expired deadline. `None` means the chain may continue.
    pub fn err(&self) -> Option<Error> {
        if let Some(failure) = &self.failure {
            return Some(failure.clone());
        }
        if self.token.is_cancelled() {
            return Some(Error::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.err().is_some()
    }
}

/// Cancels the context returned alongside it by [`Context::with_cancel`].
#[derive(Clone, Debug)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}
