//! # Process-level restart supervisor.
//!
//! The engine runs in a child process so that a restart request (or a session
//! fault) can be honored with a completely fresh process image. The supervisor
//! loop is deliberately dumb: spawn, wait, map the exit status onto a relaunch
//! decision, repeat.
//!
//! ```text
//! ┌────────────┐  spawn --supervised   ┌─────────────┐
//! │ Supervisor │ ────────────────────► │ child: run  │
//! │   (loop)   │ ◄──────────────────── │ one engine  │
//! └────────────┘      exit code        └─────────────┘
//!        │
//!        └─ decide(code): exit, relaunch fresh, or relaunch cached
//! ```
//!
//! Relaunches happen immediately, without backoff or a retry ceiling; the
//! loop runs until a child exits cleanly or relaunching is not allowed.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::SupervisorError;
use crate::exit::ExitCode;

/// What to do after a child exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaunch {
    /// Propagate the child's code; supervision is over.
    Exit(ExitCode),
    /// Relaunch without the cached session token (forces a new login).
    Fresh,
    /// Relaunch reusing the cached session token.
    Cached,
}

/// Maps a child exit code onto a relaunch decision.
///
/// - `Clean` ends supervision.
/// - `Restart` relaunches with a fresh login.
/// - Any other code is an abnormal stop: relaunch with the cached token when
///   `restart_on_disconnect` is set, otherwise propagate the code.
///
/// The decision depends only on the immediately preceding code; there is no
/// retry ceiling.
pub fn decide(code: ExitCode, restart_on_disconnect: bool) -> Relaunch {
    match code {
        ExitCode::Clean => Relaunch::Exit(ExitCode::Clean),
        ExitCode::Restart => Relaunch::Fresh,
        _ if restart_on_disconnect => Relaunch::Cached,
        abnormal => Relaunch::Exit(abnormal),
    }
}

/// How to launch one supervised child.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Binary to execute (normally `std::env::current_exe()`).
    pub program: PathBuf,
    pub identity: Option<String>,
    pub token: Option<String>,
    pub restart_on_disconnect: bool,
    pub term_port: Option<u16>,
}

impl LaunchPlan {
    /// Arguments for the child invocation; always includes `--supervised`.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec!["--supervised".to_string()];
        if let Some(identity) = &self.identity {
            argv.push("--identity".to_string());
            argv.push(identity.clone());
        }
        if let Some(token) = &self.token {
            argv.push("--token".to_string());
            argv.push(token.clone());
        }
        if self.restart_on_disconnect {
            argv.push("--restart-on-disconnect".to_string());
        }
        if let Some(port) = self.term_port {
            argv.push("--term-port".to_string());
            argv.push(port.to_string());
        }
        argv
    }
}

/// Spawns supervised children until a decision says to exit.
pub struct Supervisor {
    plan: LaunchPlan,
}

impl Supervisor {
    pub fn new(plan: LaunchPlan) -> Self {
        Self { plan }
    }

    /// Runs the supervision loop; the returned code is the process exit code.
    pub async fn run(mut self) -> Result<ExitCode, SupervisorError> {
        loop {
            info!(program = %self.plan.program.display(), "launching supervised child");
            let status = Command::new(&self.plan.program)
                .args(self.plan.argv())
                .status()
                .await
                .map_err(|source| SupervisorError::Spawn {
                    program: self.plan.program.clone(),
                    source,
                })?;

            let code = match status.code() {
                Some(c) => ExitCode::from_code(c),
                // Killed by signal; there is no code to interpret.
                None => ExitCode::Internal,
            };
            info!(code = code.code(), cause = code.describe(), "child exited");

            match decide(code, self.plan.restart_on_disconnect) {
                Relaunch::Exit(code) => return Ok(code),
                Relaunch::Fresh => {
                    warn!("relaunching with a fresh login");
                    self.plan.token = None;
                }
                Relaunch::Cached => {
                    warn!("relaunching with the cached session");
                }
            }
        }
    }
}
