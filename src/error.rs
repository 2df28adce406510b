//! Error types shared by the transport and the client façade.
//!
//! Every fallible operation returns one of these; nothing is stored in a
//! process-wide slot. [`ErrorKind`] is the cheap, `Copy` classification a
//! client remembers for [`crate::Client::last_error`].

use crate::globals::GlobalSet;
use thiserror::Error;

/// Failures raised by a [`crate::transport::Transport`] or the event loop guard.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to display server: {0}")]
    Connect(String),

    #[error("registry object unavailable")]
    RegistryUnavailable,

    /// Another reader already declared intent to read.
    #[error("a read is already prepared on this connection")]
    AlreadyReading,

    /// Events are queued but not dispatched yet; call `dispatch_pending` first.
    #[error("queued events must be dispatched before preparing a read")]
    PendingEvents,

    /// `read_events` without a matching `prepare_read`.
    #[error("read_events called without a prepared read")]
    NotPrepared,

    /// The outbound buffer is full; retry once the fd is writable.
    #[error("outbound buffer full, flush would block")]
    WouldBlock,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced by [`crate::Client`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// `check_globals` ran but some required globals are still missing.
    #[error("required globals not bound yet (missing: {0:?})")]
    MissingGlobals(GlobalSet),

    #[error("global {0} is required for this operation but not bound")]
    GlobalNotBound(&'static str),

    #[error("invalid toplevel size {width}x{height}")]
    InvalidSize { width: f32, height: f32 },
}

/// Classification of the most recent failure observed by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connect,
    Registry,
    Usage,
    WouldBlock,
    Protocol,
    Io,
    MissingGlobals,
    InvalidArgument,
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Connect(_) => ErrorKind::Connect,
            TransportError::RegistryUnavailable => ErrorKind::Registry,
            TransportError::AlreadyReading
            | TransportError::PendingEvents
            | TransportError::NotPrepared => ErrorKind::Usage,
            TransportError::WouldBlock => ErrorKind::WouldBlock,
            TransportError::Protocol(_) => ErrorKind::Protocol,
            TransportError::Io(_) => ErrorKind::Io,
        }
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(e) => e.kind(),
            ClientError::MissingGlobals(_) | ClientError::GlobalNotBound(_) => {
                ErrorKind::MissingGlobals
            }
            ClientError::InvalidSize { .. } => ErrorKind::InvalidArgument,
        }
    }
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
pub type ClientResult<T> = std::result::Result<T, ClientError>;
