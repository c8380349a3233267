//! # The delivery path: multi-producer, single-consumer.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::mpsc::unbounded_channel`].
//! Every producer holds a cloned [`BusSender`]; the dispatch loop owns the sole
//! receiving end.
//!
//! ## Rules
//! - **Never drops under load**: the channel is unbounded, so an event accepted
//!   by [`BusSender::emit`] stays queued until dispatched or the engine shuts
//!   down hard.
//! - **Per-producer FIFO**: a sender's events are delivered in emission order.
//!   No ordering is guaranteed *across* senders beyond "delivery happens-after
//!   production".
//! - **Exactly once**: each event is consumed by exactly one `recv`.

use tokio::sync::mpsc;

use super::event::Event;

/// Producer side of the delivery path. Cheap to clone.
#[derive(Clone, Debug)]
pub struct BusSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl BusSender {
    /// Pushes an event onto the delivery path.
    ///
    /// Silently ignored once the dispatch loop has gone away; producers observe
    /// shutdown through their cancellation token, not through emit failures.
    pub fn emit(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }
}

/// The delivery path. Owned by the engine; the receiving half is not cloneable.
#[derive(Debug)]
pub struct Bus {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Bus {
    /// Creates an empty delivery path.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Creates a new producer handle.
    pub fn sender(&self) -> BusSender {
        BusSender {
            tx: self.tx.clone(),
        }
    }

    /// Takes the next event in delivery order, waiting until one is available.
    ///
    /// Returns `None` only when every sender (including the engine's own) has
    /// been dropped.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn preserves_sender_order() {
        let mut bus = Bus::new();
        let tx = bus.sender();
        tx.emit(Event::new(EventKind::PollTimeout));
        tx.emit(Event::new(EventKind::ContactAdded));
        tx.emit(Event::new(EventKind::ContactLost));

        let kinds: Vec<EventKind> = [bus.recv().await, bus.recv().await, bus.recv().await]
            .into_iter()
            .map(|ev| ev.unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::PollTimeout,
                EventKind::ContactAdded,
                EventKind::ContactLost
            ]
        );
    }

    #[tokio::test]
    async fn emit_after_receiver_drop_is_silent() {
        let bus = Bus::new();
        let tx = bus.sender();
        drop(bus);
        tx.emit(Event::new(EventKind::PollTimeout)); // must not panic
    }
}
