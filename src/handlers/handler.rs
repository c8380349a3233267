//! # The handler trait.
//!
//! A handler is a callback bound to one event kind. Handlers run sequentially
//! on the dispatch loop's own task, never concurrently with each other, and
//! receive only the bounded [`BotCtx`] capability (send/reply/stop/lookup) —
//! never the engine itself.
//!
//! A returned [`HandlerError`] is logged by the dispatch loop and does not stop
//! the engine; neither does a panic (it is caught and logged).
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use relaybot::{BotCtx, Event, Handle, HandlerError};
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Handle for Greeter {
//!     async fn on_event(&self, _ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError> {
//!         ev.reply("hello!").await?;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "greeter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::core::BotCtx;
use crate::error::HandlerError;
use crate::events::Event;

/// Callback bound to one event kind.
#[async_trait]
pub trait Handle: Send + Sync + 'static {
    /// Processes one event.
    ///
    /// Called on the dispatch loop's task, in registration order relative to
    /// other handlers of the same kind. May call back into `ctx` (send, stop,
    /// emit) and reply via the event's capability.
    async fn on_event(&self, ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError>;

    /// Name used in dispatch-loop logs. Override for readable diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
