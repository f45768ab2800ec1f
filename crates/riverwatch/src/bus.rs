//! Thread-safe event delivery from the dispatch thread to consumers.
//!
//! Each subscription owns its own `std::sync::mpsc` channel, so a slow or
//! vanished consumer never affects delivery to the others. The dispatch
//! thread publishes events in decode order; since a single thread publishes
//! and each channel is FIFO, per-output ordering is preserved end-to-end.
//! No ordering is promised *across* outputs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::event::{EventFilter, StatusEvent};

/// Unique identifier for a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

impl SubscriberId {
    fn new() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Subscriber {
    id: SubscriberId,
    filter: EventFilter,
    tx: mpsc::Sender<StatusEvent>,
}

/// Publish/subscribe hub for [`StatusEvent`]s.
///
/// `publish` is called only from the dispatch thread; `subscribe` and
/// `unsubscribe` may be called from any thread.
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a subscriber; events passing `filter` are queued on the
    /// returned [`Subscription`] until it is dropped.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = SubscriberId::new();
        self.subscribers.lock().push(Subscriber { id, filter, tx });
        Subscription { id, rx }
    }

    /// Remove a subscriber by id.
    ///
    /// Dropping the [`Subscription`] is usually enough (its channel
    /// disconnects and the entry is pruned on the next publish); this exists
    /// for eager removal.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() < before
    }

    /// Deliver `event` to every matching subscriber.
    ///
    /// Subscribers whose receiving end has gone away are pruned here; one
    /// dead consumer never blocks or corrupts delivery to the rest.
    pub fn publish(&self, event: &StatusEvent) {
        trace!("publishing {:?}", event);
        self.subscribers.lock().retain(|subscriber| {
            if !subscriber.filter.matches(event) {
                return true;
            }
            subscriber.tx.send(event.clone()).is_ok()
        });
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a subscription.
///
/// Events are buffered without bound until received; drop the subscription
/// to stop receiving.
pub struct Subscription {
    id: SubscriberId,
    rx: Receiver<StatusEvent>,
}

impl Subscription {
    /// This subscription's id, usable with [`EventBus::unsubscribe`].
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Block until the next matching event, or until the bus is dropped.
    pub fn recv(&self) -> Result<StatusEvent, RecvError> {
        self.rx.recv()
    }

    /// Block up to `timeout` for the next matching event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<StatusEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Non-blocking receive.
    pub fn try_recv(&self) -> Result<StatusEvent, TryRecvError> {
        self.rx.try_recv()
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl IntoIterator for Subscription {
    type Item = StatusEvent;
    type IntoIter = mpsc::IntoIter<StatusEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}
