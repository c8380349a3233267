//! # Outbound content delivery.
//!
//! [`Outbound`] bridges handlers to the session collaborator: it resolves a
//! target to recipients, splits long content across the per-message byte
//! budget, and pushes each chunk through the single-message send primitive.

use tracing::info;

use crate::error::SessionError;
use crate::outbound::chunk::split_utf8;
use crate::session::{Contact, ContactKind, ContactsRef, SessionRef};

/// Per-recipient outcome of a [`Outbound::send`] call, in resolution order.
pub type SendResult = (Contact, Result<usize, SessionError>);

/// Outbound delivery path shared by handlers and reply capabilities.
#[derive(Clone)]
pub struct Outbound {
    session: SessionRef,
    contacts: ContactsRef,
    chunk_limit: usize,
}

impl Outbound {
    /// Creates the outbound path with a fixed chunk byte budget.
    pub fn new(session: SessionRef, contacts: ContactsRef, chunk_limit: usize) -> Self {
        Self {
            session,
            contacts,
            chunk_limit,
        }
    }

    /// Shared session handle (used when wiring reply capabilities).
    pub fn session(&self) -> &SessionRef {
        &self.session
    }

    /// Sends `content` to one recipient as an ordered chunk sequence.
    ///
    /// Empty content is a no-op. Stops at the first failing chunk. Returns the
    /// number of chunks sent.
    pub async fn send_to(&self, contact: &Contact, content: &str) -> Result<usize, SessionError> {
        if content.is_empty() {
            return Ok(0);
        }
        let chunks = split_utf8(content, self.chunk_limit);
        for chunk in &chunks {
            self.session.send_one(contact, chunk).await?;
            info!(to = %contact, "sent: {chunk}");
        }
        Ok(chunks.len())
    }

    /// Resolves `query` to zero or more recipients of `kind` and sends
    /// `content` to each, returning ordered per-recipient results.
    pub async fn send(&self, kind: ContactKind, query: &str, content: &str) -> Vec<SendResult> {
        if content.is_empty() {
            return Vec::new();
        }
        let mut results = Vec::new();
        for contact in self.contacts.get(kind, query) {
            let outcome = self.send_to(&contact, content).await;
            results.push((contact, outcome));
        }
        results
    }
}

impl std::fmt::Debug for Outbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbound")
            .field("chunk_limit", &self.chunk_limit)
            .finish_non_exhaustive()
    }
}
