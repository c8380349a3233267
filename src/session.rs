//! # External session and contact collaborators.
//!
//! The engine core never speaks the remote service's wire protocol. Everything
//! protocol-specific sits behind two traits:
//!
//! - [`Session`]: long-poll for inbound messages, periodic fetch of contact
//!   bookkeeping events, and the single-message send primitive.
//! - [`Contacts`]: resolve a target description to addressable recipients.
//!
//! Producers and the outbound path hold these as `Arc<dyn _>`, so tests plug in
//! scripted fakes and a real deployment plugs in the actual protocol client.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SessionError;
use crate::events::Event;

/// Shared handle to the session collaborator.
pub type SessionRef = Arc<dyn Session>;

/// Shared handle to the contact collaborator.
pub type ContactsRef = Arc<dyn Contacts>;

/// Category of an addressable contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    /// Direct contact.
    Buddy,
    /// Persistent group chat.
    Group,
    /// Ad-hoc discussion chat.
    Discuss,
    /// Member inside a group or discussion.
    Member,
}

impl ContactKind {
    /// Parses the user-facing spelling (`buddy`, `group`, `discuss`, `member`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buddy" => Some(ContactKind::Buddy),
            "group" => Some(ContactKind::Group),
            "discuss" => Some(ContactKind::Discuss),
            "member" => Some(ContactKind::Member),
            _ => None,
        }
    }

    /// The user-facing spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ContactKind::Buddy => "buddy",
            ContactKind::Group => "group",
            ContactKind::Discuss => "discuss",
            ContactKind::Member => "member",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An addressable recipient known to the contact collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Contact category.
    pub kind: ContactKind,
    /// Stable service-side identifier.
    pub uin: String,
    /// Display name.
    pub name: String,
}

/// Placeholder name for contacts the collaborator cannot resolve.
pub const UNKNOWN_NAME: &str = "##UNKNOWN";

impl Contact {
    /// Creates a contact.
    pub fn new(kind: ContactKind, uin: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            uin: uin.into(),
            name: name.into(),
        }
    }

    /// Creates a placeholder contact for an unresolvable uin.
    pub fn unknown(kind: ContactKind, uin: impl Into<String>) -> Self {
        Self::new(kind, uin, UNKNOWN_NAME)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.uin)
    }
}

/// Raw inbound message as the poll primitive reports it, before contact
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Where the message came from.
    pub kind: ContactKind,
    /// Uin of the originating buddy/group/discussion.
    pub from_uin: String,
    /// Uin of the sending member, for group/discussion messages.
    pub member_uin: Option<String>,
    /// Message text.
    pub content: String,
}

/// Result of one blocking poll operation.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The long-poll window elapsed without traffic.
    Timeout,
    /// An inbound message arrived.
    Message(InboundMessage),
}

/// The remote session collaborator.
///
/// One implementation per protocol; the engine only needs these three
/// primitives. `poll` is expected to block (server-side long poll) and return
/// [`PollOutcome::Timeout`] periodically so cancellation can be observed between
/// operations.
#[async_trait]
pub trait Session: Send + Sync + 'static {
    /// Waits for the next inbound message or a timeout marker.
    async fn poll(&self) -> Result<PollOutcome, SessionError>;

    /// Fetches contact bookkeeping changes accumulated since the last call,
    /// already shaped as dispatchable events.
    async fn fetch(&self) -> Result<Vec<Event>, SessionError>;

    /// Sends a single chunk to one recipient.
    async fn send_one(&self, contact: &Contact, chunk: &str) -> Result<(), SessionError>;
}

/// The contact-resolution collaborator.
///
/// Lookup only; mutation happens inside the collaborator when the fetch loop
/// observes changes. All methods are synchronous reads of its own cache.
pub trait Contacts: Send + Sync + 'static {
    /// Resolves a query (uin, name, ...) to zero or more contacts of `kind`.
    fn get(&self, kind: ContactKind, query: &str) -> Vec<Contact>;

    /// Lists all known contacts of `kind`.
    fn list(&self, kind: ContactKind) -> Vec<Contact>;

    /// Resolves a member uin within a group/discussion contact.
    fn member(&self, _owner: &Contact, _uin: &str) -> Option<Contact> {
        None
    }

    /// Lists the members of a group/discussion contact.
    fn members(&self, _owner: &Contact) -> Vec<Contact> {
        Vec::new()
    }
}
