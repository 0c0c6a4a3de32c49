//! Error types.
//!
//! Inconsistency and cancellation are ordinary control-flow states, not
//! errors; only programmer errors and broken internal invariants surface
//! through [`Error`].

use thiserror::Error;

/// Errors raised by the preprocessing core.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// An operation was invoked in a state its contract forbids, e.g.
    /// seeding a non-empty store or popping more scopes than were pushed.
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    /// An internal self-check failed. The store may be corrupted.
    #[error("invariant broken: {0}")]
    MissingInvariant(String),
}

impl Error {
    /// Shorthand for a [`Error::PreconditionViolated`].
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionViolated(msg.into())
    }

    /// Shorthand for a [`Error::MissingInvariant`].
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::MissingInvariant(msg.into())
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
