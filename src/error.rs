//! Why a chain stopped.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// The error observed on a [`Context`](crate::Context) once a chain must stop.
///
/// The chain itself never looks past "present or absent": any variant halts
/// it. The variants only exist so that whoever inspects the context afterwards
/// can tell a cancelled request from one that a middleware step rejected.
#[derive(Clone, Debug)]
pub enum Error {
    /// The context (or one of its parents) was cancelled.
    Canceled,
    /// The context's deadline has passed.
    DeadlineExceeded,
    /// A middleware step stopped the chain with an arbitrary failure.
    Halted(Arc<dyn StdError + Send + Sync + 'static>),
}

impl Error {
    /// Wraps any failure value as [`Error::Halted`].
    pub fn halt(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self::Halted(Arc::from(err.into()))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canceled         => f.write_str("context canceled"),
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
            Self::Halted(cause)    => write!(f, "chain halted: {cause}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Halted(cause) => Some(&**cause),
            _ => None,
        }
    }
}
