//! Lifecycle logging subscriber.
//!
//! Logs contact bookkeeping and stop events. One of potentially several
//! subscribers on these kinds; registering it never displaces others.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::BotCtx;
use crate::error::HandlerError;
use crate::events::{Event, EventKind};
use crate::handlers::{Handle, HandlerRegistry, Module};

/// Built-in logging handler for lifecycle notifications.
pub struct EventLogger;

#[async_trait]
impl Handle for EventLogger {
    async fn on_event(&self, _ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError> {
        match ev.kind {
            EventKind::ContactAdded => {
                if let Some(contact) = &ev.contact {
                    info!(%contact, "contact added");
                }
            }
            EventKind::ContactLost => {
                if let Some(contact) = &ev.contact {
                    info!(%contact, "contact lost");
                }
            }
            EventKind::Stop => {
                let code = ev.code.map(|c| c.code()).unwrap_or_default();
                info!(code, reason = ev.content.as_deref(), "stop event received");
            }
            EventKind::PollTimeout => debug!("poll timeout"),
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "event-logger"
    }
}

impl Module for EventLogger {
    fn attach(self: Arc<Self>, registry: &mut HandlerRegistry) {
        for kind in [
            EventKind::ContactAdded,
            EventKind::ContactLost,
            EventKind::Stop,
            EventKind::PollTimeout,
        ] {
            registry.on(kind, self.clone());
        }
    }
}
