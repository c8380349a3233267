//! # Ambient handler context.
//!
//! [`BotCtx`] is the capability struct handlers receive instead of the engine
//! itself: outbound delivery, contact lookup, event emission, and shutdown —
//! nothing else. This bounds the blast radius of handler misuse: a handler can
//! never reach into producers or the registry.

use crate::config::BotConfig;
use crate::core::stop::StopHandle;
use crate::events::{BusSender, Event};
use crate::exit::ExitCode;
use crate::outbound::{Outbound, SendResult};
use crate::session::{Contact, ContactKind, ContactsRef};

/// Capabilities exposed to handlers.
#[derive(Clone)]
pub struct BotCtx {
    outbound: Outbound,
    contacts: ContactsRef,
    stop: StopHandle,
    tx: BusSender,
    config: BotConfig,
}

impl BotCtx {
    pub(crate) fn new(
        outbound: Outbound,
        contacts: ContactsRef,
        stop: StopHandle,
        tx: BusSender,
        config: BotConfig,
    ) -> Self {
        Self {
            outbound,
            contacts,
            stop,
            tx,
            config,
        }
    }

    /// The outbound delivery path (used to build reply capabilities).
    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Engine configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Resolves a target to recipients and sends `content` to each.
    pub async fn send(&self, kind: ContactKind, query: &str, content: &str) -> Vec<SendResult> {
        self.outbound.send(kind, query, content).await
    }

    /// Sends `content` to one recipient, chunked.
    pub async fn send_to(
        &self,
        contact: &Contact,
        content: &str,
    ) -> Result<usize, crate::error::SessionError> {
        self.outbound.send_to(contact, content).await
    }

    /// Resolves a query to contacts of `kind`.
    pub fn get(&self, kind: ContactKind, query: &str) -> Vec<Contact> {
        self.contacts.get(kind, query)
    }

    /// Lists all known contacts of `kind`.
    pub fn list(&self, kind: ContactKind) -> Vec<Contact> {
        self.contacts.list(kind)
    }

    /// Resolves a member uin within a group/discussion contact.
    pub fn member(&self, owner: &Contact, uin: &str) -> Option<Contact> {
        self.contacts.member(owner, uin)
    }

    /// Lists the members of a group/discussion contact.
    pub fn members(&self, owner: &Contact) -> Vec<Contact> {
        self.contacts.members(owner)
    }

    /// Pushes a new event onto the delivery path.
    ///
    /// The event is dispatched after the current one finishes; emission from a
    /// handler never recurses into dispatch.
    pub fn emit(&self, ev: Event) {
        self.tx.emit(ev);
    }

    /// Requests engine shutdown with `code` (first writer wins).
    pub fn stop(&self, code: ExitCode) {
        self.stop.stop(code);
    }
}
