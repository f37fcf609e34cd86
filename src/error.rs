//! Error taxonomy for command registration and replay.

use core::fmt::{self, Display, Formatter};
use thiserror::Error;

/// The error type returned by an action's forward or backward operation.
///
/// The engine never inspects these; they pass through to the caller as-is
/// inside [`Error::Operation`].
pub type OperationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized result type for history operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The errors surfaced by this crate.
///
/// There is no variant for a corrupted history: a failure while replaying a
/// recorded unit clears the whole history and returns the operation's own
/// error, so afterwards the history is empty rather than inconsistent.
#[derive(Debug, Error)]
pub enum Error {
    /// A command was called before both of its operations were attached.
    ///
    /// This leaves the history untouched.
    #[error("command is missing its {0} operation")]
    Unconfigured(OpKind),
    /// An error raised by a forward or backward operation, passed through
    /// unmodified.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl Error {
    /// Attempts to downcast an [`Error::Operation`] to the concrete error
    /// type raised by the operation.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Operation(err) => err.downcast_ref(),
            Error::Unconfigured(_) => None,
        }
    }
}

/// Which of the two operations of a command a configuration error refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OpKind {
    /// The forward operation.
    Do,
    /// The backward operation.
    Undo,
}

impl Display for OpKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            OpKind::Do => f.write_str("do"),
            OpKind::Undo => f.write_str("undo"),
        }
    }
}
