//! # Dispatch Errors
//!
//! The registry adds exactly two failure kinds of its own. Anything a handler
//! returns is passed through untouched.

use crate::key::{MessageKind, MessageTypeKey};
use thiserror::Error;

/// Result type returned by command and query dispatch.
pub type MediatorResult<T> = Result<T, MediatorError>;

/// Errors surfaced by `send_command` and `send_query`.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// No entry exists for the message type.
    #[error("no {kind} handler registered for {message_type}")]
    NoHandlerRegistered {
        kind: MessageKind,
        message_type: &'static str,
    },

    /// An entry exists but does not satisfy the requested type contract.
    ///
    /// This is a registration defect, not a transient condition.
    #[error("handler type mismatch for {kind} type {message_type}")]
    HandlerTypeMismatch {
        kind: MessageKind,
        message_type: &'static str,
    },

    /// The handler's own error, verbatim.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl MediatorError {
    pub(crate) fn no_handler(kind: MessageKind, key: MessageTypeKey) -> Self {
        Self::NoHandlerRegistered {
            kind,
            message_type: key.name(),
        }
    }

    pub(crate) fn type_mismatch(kind: MessageKind, key: MessageTypeKey) -> Self {
        Self::HandlerTypeMismatch {
            kind,
            message_type: key.name(),
        }
    }

    /// True for [`MediatorError::NoHandlerRegistered`].
    #[must_use]
    pub fn is_no_handler(&self) -> bool {
        matches!(self, Self::NoHandlerRegistered { .. })
    }

    /// True for [`MediatorError::HandlerTypeMismatch`].
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::HandlerTypeMismatch { .. })
    }

    /// The handler-internal error, if this is one.
    #[must_use]
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Handler(e) => Some(e),
            _ => None,
        }
    }
}
