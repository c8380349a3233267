//! # Events flowing through the delivery path.
//!
//! [`EventKind`] classifies everything the dispatch loop can see:
//! - **Inbound traffic**: poll results and the resolved chat messages built from
//!   them.
//! - **Contact bookkeeping**: additions/removals observed by the fetch loop.
//! - **Control**: commands arriving on the local control channel.
//! - **Terminal**: the `Stop` event a producer emits as its very last act.
//!
//! An [`Event`] is immutable once built. Construction is builder-style; only
//! the fields relevant to a kind are set, the rest stay `None` and are ignored
//! by handlers.
//!
//! ## Example
//! ```
//! use relaybot::{Event, EventKind, ExitCode};
//!
//! let ev = Event::stop(ExitCode::PollFault).with_content("poll loop died");
//! assert_eq!(ev.kind, EventKind::Stop);
//! assert_eq!(ev.code, Some(ExitCode::PollFault));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::events::reply::ReplyHandle;
use crate::exit::ExitCode;
use crate::session::{Contact, PollOutcome};

/// Classification of dispatchable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// One poll operation completed; carries the raw [`PollOutcome`].
    PollComplete,
    /// The long-poll window elapsed without traffic.
    PollTimeout,
    /// A resolved inbound user message; carries contact, content, and a reply
    /// capability.
    ChatMessage,
    /// A command read from the local control channel; carries content and a
    /// reply capability writing back to the caller.
    TermCommand,
    /// The fetch loop learned of a new contact/group/member.
    ContactAdded,
    /// The fetch loop learned a contact/group/member disappeared.
    ContactLost,
    /// Terminal event: stop the engine with the carried code.
    Stop,
}

/// Immutable event record.
///
/// Fields are kind-specific and unvalidated by the delivery path; handlers
/// interpret them. The reply capability, when present, is the only way an event
/// can cause outbound traffic back to its originator.
#[derive(Clone, Debug)]
pub struct Event {
    /// Event classification.
    pub kind: EventKind,
    /// Stop code (`Stop` events).
    pub code: Option<ExitCode>,
    /// Raw poll result (`PollComplete` events).
    pub poll: Option<PollOutcome>,
    /// Originating contact (`ChatMessage`, `ContactAdded`, `ContactLost`).
    pub contact: Option<Contact>,
    /// Sending member for group/discussion messages.
    pub member: Option<Contact>,
    /// Text payload (message content, command line, diagnostic reason).
    pub content: Option<Arc<str>>,
    /// Reply capability bound at creation time, present only for events
    /// representing inbound user messages.
    pub(crate) reply: Option<ReplyHandle>,
}

impl Event {
    /// Creates an event of the given kind with no payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            code: None,
            poll: None,
            contact: None,
            member: None,
            content: None,
            reply: None,
        }
    }

    /// Creates a terminal stop event.
    pub fn stop(code: ExitCode) -> Self {
        Self::new(EventKind::Stop).with_code(code)
    }

    /// Creates a `PollComplete` event from a raw poll result.
    pub fn poll_complete(outcome: PollOutcome) -> Self {
        let mut ev = Self::new(EventKind::PollComplete);
        ev.poll = Some(outcome);
        ev
    }

    /// Attaches a stop code.
    #[inline]
    pub fn with_code(mut self, code: ExitCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches the originating contact.
    #[inline]
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Attaches the sending member.
    #[inline]
    pub fn with_member(mut self, member: Contact) -> Self {
        self.member = Some(member);
        self
    }

    /// Attaches a text payload.
    #[inline]
    pub fn with_content(mut self, content: impl Into<Arc<str>>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attaches a reply capability.
    #[inline]
    pub fn with_reply(mut self, reply: ReplyHandle) -> Self {
        self.reply = Some(reply);
        self
    }

    /// True if this event can be replied to.
    pub fn can_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Sends `content` back to this event's originator.
    ///
    /// A no-op when the content is empty or the event carries no reply
    /// capability (e.g. it does not represent an inbound user message).
    pub async fn reply(&self, content: &str) -> Result<(), crate::error::SessionError> {
        match &self.reply {
            Some(handle) => handle.reply(content).await,
            None => Ok(()),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(code) = self.code {
            write!(f, " code={}", code.code())?;
        }
        if let Some(contact) = &self.contact {
            write!(f, " from={contact}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ContactKind, InboundMessage};

    #[test]
    fn builders_set_only_their_field() {
        let ev = Event::new(EventKind::ChatMessage)
            .with_contact(Contact::new(ContactKind::Buddy, "1", "ann"))
            .with_content("hi");
        assert_eq!(ev.kind, EventKind::ChatMessage);
        assert_eq!(ev.content.as_deref(), Some("hi"));
        assert!(ev.code.is_none());
        assert!(ev.poll.is_none());
        assert!(!ev.can_reply());
    }

    #[test]
    fn stop_carries_code() {
        let ev = Event::stop(ExitCode::Restart);
        assert_eq!(ev.kind, EventKind::Stop);
        assert_eq!(ev.code, Some(ExitCode::Restart));
    }

    #[test]
    fn poll_complete_carries_outcome() {
        let ev = Event::poll_complete(PollOutcome::Message(InboundMessage {
            kind: ContactKind::Buddy,
            from_uin: "9".into(),
            member_uin: None,
            content: "yo".into(),
        }));
        assert!(matches!(ev.poll, Some(PollOutcome::Message(_))));
    }

    #[tokio::test]
    async fn reply_without_capability_is_noop() {
        let ev = Event::new(EventKind::ContactAdded);
        assert!(ev.reply("anything").await.is_ok());
    }
}
