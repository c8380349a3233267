//! Error types used across the engine.
//!
//! - [`SessionError`] — failures raised by the external session collaborator.
//! - [`ProduceError`] — how a producer body ends abnormally.
//! - [`HandlerError`] — a handler-local failure; logged by the dispatch loop,
//!   never stops the engine.
//! - [`SupervisorError`] — failures of the process-level restart loop itself.

use std::path::PathBuf;

use thiserror::Error;

use crate::exit::ExitCode;

/// Errors raised by the external session/protocol collaborator.
///
/// [`SessionError::Auth`] is the distinguished session-fault signal: the poll
/// producer translates it into [`ExitCode::SessionFault`], everything else into
/// its own producer-specific fault code.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionError {
    /// Session or authentication state with the remote service was lost.
    #[error("session lost: {reason}")]
    Auth {
        /// What the collaborator reported.
        reason: String,
    },

    /// The remote service answered with something the collaborator cannot handle.
    #[error("protocol error: {reason}")]
    Protocol {
        /// What the collaborator reported.
        reason: String,
    },

    /// Transport-level failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Shorthand for [`SessionError::Auth`].
    pub fn auth(reason: impl Into<String>) -> Self {
        SessionError::Auth {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SessionError::Protocol`].
    pub fn protocol(reason: impl Into<String>) -> Self {
        SessionError::Protocol {
            reason: reason.into(),
        }
    }

    /// True if this is the distinguished session/auth-loss signal.
    pub fn is_auth(&self) -> bool {
        matches!(self, SessionError::Auth { .. })
    }
}

/// How a producer body terminates abnormally.
///
/// A producer that observes cancellation returns [`ProduceError::Canceled`] (or
/// plain `Ok(())`); a fatal failure carries the exit code the engine must stop
/// with.
#[derive(Error, Debug)]
pub enum ProduceError {
    /// The producer was asked to stop and exited cooperatively.
    #[error("producer cancelled")]
    Canceled,

    /// Unrecoverable failure; the engine stops with `code`.
    #[error("{reason}")]
    Fatal {
        /// Exit code the engine must terminate with.
        code: ExitCode,
        /// Diagnostic message.
        reason: String,
    },
}

impl ProduceError {
    /// Builds a fatal error from any displayable cause.
    pub fn fatal(code: ExitCode, reason: impl std::fmt::Display) -> Self {
        ProduceError::Fatal {
            code,
            reason: reason.to_string(),
        }
    }

    /// The exit code carried by a fatal error, if any.
    pub fn code(&self) -> Option<ExitCode> {
        match self {
            ProduceError::Canceled => None,
            ProduceError::Fatal { code, .. } => Some(*code),
        }
    }
}

/// A handler-local failure.
///
/// Caught at the dispatch loop and logged; dispatch continues with the next
/// handler.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Builds a handler error from any displayable cause.
    pub fn msg(reason: impl std::fmt::Display) -> Self {
        HandlerError(reason.to_string())
    }
}

impl From<SessionError> for HandlerError {
    fn from(err: SessionError) -> Self {
        HandlerError(err.to_string())
    }
}

/// Errors of the process-level restart loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The child process could not be launched at all.
    #[error("failed to launch {program:?}: {source}")]
    Spawn {
        /// Program the supervisor tried to run.
        program: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
