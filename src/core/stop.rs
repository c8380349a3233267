//! # Shutdown state: phase, set-once exit code, cancellation.
//!
//! [`StopHandle`] is the engine's only cancellation primitive. The first
//! `stop(code)` call wins the exit code; every call cancels the runtime token,
//! which propagates to all producer child tokens. Later calls are no-ops with
//! respect to the code but still (idempotently) trigger shutdown.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::exit::ExitCode;

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Built, not yet running.
    Initializing,
    /// Dispatch loop active.
    Running,
    /// Shutdown initiated; producers are being stopped.
    Stopping,
    /// Run finished; exit code final.
    Stopped,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Phase::Initializing,
            1 => Phase::Running,
            2 => Phase::Stopping,
            _ => Phase::Stopped,
        }
    }
}

struct Inner {
    code: OnceLock<ExitCode>,
    token: CancellationToken,
    phase: AtomicU8,
}

/// Cloneable handle over the engine's shutdown state.
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<Inner>,
}

impl StopHandle {
    /// Creates the handle around the engine's runtime token.
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                code: OnceLock::new(),
                token,
                phase: AtomicU8::new(Phase::Initializing as u8),
            }),
        }
    }

    /// Requests shutdown with `code`.
    ///
    /// The exit code is recorded only if none was recorded before (first writer
    /// wins); cancellation is signalled either way. Fire-and-forget: returns
    /// immediately, shutdown is complete when `Engine::run` returns.
    pub fn stop(&self, code: ExitCode) {
        if self.inner.code.set(code).is_ok() {
            debug!(code = code.code(), "exit code recorded");
        }
        if !self.inner.token.is_cancelled() {
            self.set_phase(Phase::Stopping);
            self.inner.token.cancel();
        }
    }

    /// The recorded exit code; `Clean` when `stop` was never called with one.
    pub fn code(&self) -> ExitCode {
        self.inner.code.get().copied().unwrap_or(ExitCode::Clean)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.inner.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.inner.phase.store(phase as u8, Ordering::Release);
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.inner.token
    }
}
