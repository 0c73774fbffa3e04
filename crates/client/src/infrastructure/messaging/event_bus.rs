//! Event Bus for broadcasting changes between views of one session.
//!
//! The EventBus provides a push-based subscription model. Subscribers register
//! callbacks that are invoked synchronously for every published event. Views
//! unsubscribe on teardown with the id returned from `subscribe`.

use std::sync::{Arc, Mutex};

use crate::infrastructure::sync::lock;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

struct Subscribers<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber<E>)>,
}

/// Event bus for one kind of session event.
///
/// The bus holds strong references to subscribers, so they persist until
/// explicitly removed or the bus is dropped. Callbacks run on the publishing
/// task without the subscriber lock held, so a callback may publish or
/// unsubscribe itself.
pub struct EventBus<E> {
    subscribers: Arc<Mutex<Subscribers<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<E: 'static> EventBus<E> {
    /// Create a new EventBus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Subscribers {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }

    /// Subscribe to all events.
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let mut subscribers = lock(&self.subscribers);
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.entries.len();
        subscribers.entries.retain(|(entry_id, _)| *entry_id != id);
        subscribers.entries.len() != before
    }

    /// Dispatch an event to all subscribers.
    pub fn publish(&self, event: E) {
        let targets: Vec<Subscriber<E>> = lock(&self.subscribers)
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in targets {
            callback(&event);
        }
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).entries.len()
    }

    /// Clear all subscribers.
    pub fn clear(&self) {
        lock(&self.subscribers).entries.clear();
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
