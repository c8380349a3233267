//! # Global engine configuration.
//!
//! [`BotConfig`] centralizes the runtime knobs: shutdown grace, fetch cadence,
//! outbound chunk budget, the human-like reply delay, and the control-channel
//! port.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use relaybot::BotConfig;
//!
//! let mut cfg = BotConfig::default();
//! cfg.fetch_interval = Duration::from_secs(30);
//! cfg.reply_delay = (Duration::ZERO, Duration::ZERO); // no artificial delay
//!
//! assert_eq!(cfg.chunk_limit, 600);
//! ```

use std::time::Duration;

/// Global configuration for the engine and its standard producers.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Maximum time to wait for producers to stop after shutdown is initiated.
    pub grace: Duration,
    /// Pause between fetch-loop runs.
    pub fetch_interval: Duration,
    /// Maximum bytes per outbound message chunk.
    pub chunk_limit: usize,
    /// Randomized delay range applied before a chat reply is sent.
    pub reply_delay: (Duration, Duration),
    /// Local TCP port of the control channel.
    pub term_port: u16,
}

impl Default for BotConfig {
    /// Provides a default configuration:
    /// - `grace = 10s`
    /// - `fetch_interval = 10s`
    /// - `chunk_limit = 600` bytes
    /// - `reply_delay = 1s..4s`
    /// - `term_port = 8188`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
            fetch_interval: Duration::from_secs(10),
            chunk_limit: 600,
            reply_delay: (Duration::from_secs(1), Duration::from_secs(4)),
            term_port: 8188,
        }
    }
}
