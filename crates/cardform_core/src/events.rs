//! Typed field events
//!
//! Field editors do not receive the owner's callbacks. Each editor gets a
//! [`FieldEmitter`] scoped to its own field and emits [`FieldEvent`]s into a
//! queue. Whoever owns the [`FieldEventBus`] drains the queue on its own turn
//! of the event loop and hands each event to the subscribers.
//!
//! ```rust
//! use cardform_core::events::{FieldEvent, FieldEventBus};
//! use cardform_core::FieldId;
//! use std::sync::{Arc, Mutex};
//!
//! let mut bus = FieldEventBus::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
//!
//! bus.emitter(FieldId::Number).change("4242");
//! assert_eq!(bus.dispatch(), 1);
//! assert_eq!(seen.lock().unwrap()[0].field(), FieldId::Number);
//! ```

use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::field::{FieldId, FieldStatus};

new_key_type! {
    /// Handle returned by [`FieldEventBus::subscribe`]
    pub struct SubscriptionId;
}

/// Event emitted by a field editor
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldEvent {
    /// The editor received keyboard focus from the user
    Focus { field: FieldId },
    /// The editor's text changed
    Change { field: FieldId, value: String },
    /// The editor's text became empty
    BecomeEmpty { field: FieldId },
    /// The editor's text became valid
    BecomeValid { field: FieldId, status: FieldStatus },
}

impl FieldEvent {
    pub fn field(&self) -> FieldId {
        match self {
            FieldEvent::Focus { field }
            | FieldEvent::Change { field, .. }
            | FieldEvent::BecomeEmpty { field }
            | FieldEvent::BecomeValid { field, .. } => *field,
        }
    }
}

/// Field-scoped sending half handed to an editor
#[derive(Clone, Debug)]
pub struct FieldEmitter {
    field: FieldId,
    tx: UnboundedSender<FieldEvent>,
}

impl FieldEmitter {
    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn focus(&self) {
        self.emit(FieldEvent::Focus { field: self.field });
    }

    pub fn change(&self, value: impl Into<String>) {
        self.emit(FieldEvent::Change {
            field: self.field,
            value: value.into(),
        });
    }

    pub fn become_empty(&self) {
        self.emit(FieldEvent::BecomeEmpty { field: self.field });
    }

    pub fn become_valid(&self, status: FieldStatus) {
        self.emit(FieldEvent::BecomeValid {
            field: self.field,
            status,
        });
    }

    fn emit(&self, event: FieldEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("field event for '{}' dropped: form torn down", self.field);
        }
    }
}

type Subscriber = Box<dyn FnMut(&FieldEvent) + Send>;

/// Queue of field events plus the subscribers that receive them
pub struct FieldEventBus {
    tx: UnboundedSender<FieldEvent>,
    rx: UnboundedReceiver<FieldEvent>,
    subscribers: SlotMap<SubscriptionId, Subscriber>,
}

impl std::fmt::Debug for FieldEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for FieldEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldEventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            tx,
            rx,
            subscribers: SlotMap::with_key(),
        }
    }

    /// Create an emitter that tags every event with `field`
    pub fn emitter(&self, field: FieldId) -> FieldEmitter {
        FieldEmitter {
            field,
            tx: self.tx.clone(),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&FieldEvent) + Send + 'static,
    {
        self.subscribers.insert(Box::new(handler))
    }

    /// Remove a subscriber; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver every queued event to every subscriber, in emission order
    ///
    /// Returns the number of events delivered.
    pub fn dispatch(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            tracing::trace!("dispatching {:?}", event);
            for handler in self.subscribers.values_mut() {
                handler(&event);
            }
            delivered += 1;
        }
        delivered
    }

    /// Drop queued events without delivering them
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
