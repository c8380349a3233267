//! Command-line surface.
//!
//! The same binary serves two roles: launched plainly it acts as the
//! supervisor, which respawns itself with `--supervised`; launched with
//! `--supervised` it runs one engine lifetime and exits with the engine's
//! code. [`crate::supervisor::LaunchPlan::argv`] must stay in sync with these
//! flags; a round-trip test over there keeps them honest.

use clap::Parser;

/// Long-running messaging agent.
#[derive(Debug, Clone, Parser)]
#[command(name = "relaybot", version, about)]
pub struct Cli {
    /// Account identity to run under.
    #[arg(long)]
    pub identity: Option<String>,

    /// Cached session token; omitted forces a fresh login.
    #[arg(long)]
    pub token: Option<String>,

    /// Run a single engine lifetime instead of supervising.
    #[arg(long)]
    pub supervised: bool,

    /// Relaunch when the session is lost instead of exiting.
    #[arg(long)]
    pub restart_on_disconnect: bool,

    /// TCP port for the local control channel.
    #[arg(long, default_value_t = 8188)]
    pub term_port: u16,
}
