//! # Reply capabilities.
//!
//! A [`ReplyHandle`] is bound to an event when the event is created and is the
//! only way a handler can answer the event's originator. The handle hides the
//! transport: chat replies go through the outbound path with a human-like
//! delay, control-channel replies write straight back to the caller's socket.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::SessionError;
use crate::outbound::Outbound;
use crate::session::Contact;

/// Transport behind a [`ReplyHandle`].
#[async_trait]
pub trait ReplySink: Send + Sync + 'static {
    /// Delivers non-empty reply content to the originator.
    async fn deliver(&self, content: &str) -> Result<(), SessionError>;
}

/// Cloneable reply capability carried by inbound events.
#[derive(Clone)]
pub struct ReplyHandle {
    sink: Arc<dyn ReplySink>,
}

impl ReplyHandle {
    /// Wraps a sink into a handle.
    pub fn new(sink: Arc<dyn ReplySink>) -> Self {
        Self { sink }
    }

    /// Sends content to the originator; empty content is a no-op.
    pub async fn reply(&self, content: &str) -> Result<(), SessionError> {
        if content.is_empty() {
            return Ok(());
        }
        self.sink.deliver(content).await
    }
}

// Arc<dyn ReplySink> has no useful Debug; keep the derive on Event workable.
impl fmt::Debug for ReplyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReplyHandle")
    }
}

/// Chat reply: waits a randomized human-like delay, then sends through the
/// outbound path (chunked, per the configured byte budget).
pub struct ChatReply {
    outbound: Outbound,
    contact: Contact,
    delay: (Duration, Duration),
}

impl ChatReply {
    /// Builds a reply handle bound to `contact`.
    pub fn handle(outbound: Outbound, contact: Contact, delay: (Duration, Duration)) -> ReplyHandle {
        ReplyHandle::new(Arc::new(Self {
            outbound,
            contact,
            delay,
        }))
    }
}

#[async_trait]
impl ReplySink for ChatReply {
    async fn deliver(&self, content: &str) -> Result<(), SessionError> {
        let (min, max) = self.delay;
        let wait = if max > min {
            let millis = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
            Duration::from_millis(millis)
        } else {
            min
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        self.outbound.send_to(&self.contact, content).await.map(|_| ())
    }
}
