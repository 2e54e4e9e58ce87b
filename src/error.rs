//! Error types for the bot core.
//!
//! Only connection-level failures leave the [`Session`](crate::session::Session);
//! everything that goes wrong while handling a single message is reported as a
//! [`HookError`], logged by the dispatch loop, and dropped.

use std::time::Duration;

use kaa_proto::{ConnectionError, TransportClosed};
use thiserror::Error;

// ============================================================================
// Session Errors
// ============================================================================

/// Errors surfaced by [`Session`](crate::session::Session) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("connection closed: {0}")]
    Closed(#[from] TransportClosed),

    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,
}

impl From<OutboxClosed> for SessionError {
    fn from(_: OutboxClosed) -> Self {
        Self::NotConnected
    }
}

// ============================================================================
// Hook Errors
// ============================================================================

/// Per-message dispatch failures.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook did not finish within its deadline and was aborted.
    #[error("hook for {command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("hook for {command} failed: {source:#}")]
    Failed {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("hook for {command} panicked")]
    Panicked { command: String },
}

impl HookError {
    /// Static label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Failed { .. } => "failed",
            Self::Panicked { .. } => "panicked",
        }
    }
}

/// The outbound queue is gone: the connection was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("outbound queue closed")]
pub struct OutboxClosed;
