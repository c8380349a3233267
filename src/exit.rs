//! # Process exit codes: the contract between engine and supervisor.
//!
//! The engine communicates *why* it stopped through the process exit status;
//! the supervisor reads nothing else. Codes above 200 are reserved for the
//! engine's own taxonomy so they cannot collide with conventional shell/tool
//! codes.

/// Why the engine stopped.
///
/// The numeric mapping is stable: it crosses the process boundary between a
/// supervised child and its supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    /// Deliberate, successful shutdown. Never triggers a relaunch.
    Clean,
    /// Explicit restart request; the supervisor relaunches with a fresh login.
    Restart,
    /// The session with the remote service was lost (auth failure).
    SessionFault,
    /// The poll loop failed for a non-auth reason.
    PollFault,
    /// The fetch loop failed for a non-auth reason.
    FetchFault,
    /// Internal fault: silent producer exhaustion, delivery-path closure,
    /// or death by signal.
    Internal,
    /// Any code outside the engine's own taxonomy.
    Other(i32),
}

impl ExitCode {
    /// The numeric process exit code.
    pub const fn code(self) -> i32 {
        match self {
            ExitCode::Clean => 0,
            ExitCode::Restart => 201,
            ExitCode::SessionFault => 202,
            ExitCode::PollFault => 203,
            ExitCode::FetchFault => 204,
            ExitCode::Internal => 210,
            ExitCode::Other(code) => code,
        }
    }

    /// Interprets a raw process exit code.
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => ExitCode::Clean,
            201 => ExitCode::Restart,
            202 => ExitCode::SessionFault,
            203 => ExitCode::PollFault,
            204 => ExitCode::FetchFault,
            210 => ExitCode::Internal,
            other => ExitCode::Other(other),
        }
    }

    /// Short human-readable cause, for logs.
    pub const fn describe(self) -> &'static str {
        match self {
            ExitCode::Clean => "clean shutdown",
            ExitCode::Restart => "restart requested",
            ExitCode::SessionFault => "session lost",
            ExitCode::PollFault => "poll loop failed",
            ExitCode::FetchFault => "fetch loop failed",
            ExitCode::Internal => "internal fault",
            ExitCode::Other(_) => "unrecognized code",
        }
    }

    /// True only for [`ExitCode::Clean`].
    pub const fn is_clean(self) -> bool {
        matches!(self, ExitCode::Clean)
    }
}
