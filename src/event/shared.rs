use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, instrument};

use super::{
    bus::EventBus,
    dispatch::{self, FaultPolicy},
    error::PublishError,
    name::EventName,
    subscriber::{Entry, Subscriber, Subscription, SubscriptionId},
};
use crate::config::BusConfig;

/// Thread-safe handle over an [`EventBus`]
///
/// All operations go through one mutex. `publish` copies the event's
/// subscriber sequence under the lock and releases it before invoking
/// anyone, so a subscriber may subscribe, unsubscribe or publish on the same
/// bus from inside its callback. Changes made that way apply from the next
/// publish; the dispatch in progress keeps the snapshot it started with.
pub struct SharedEventBus<P> {
    inner: Arc<Mutex<EventBus<P>>>,
}

impl<P> SharedEventBus<P> {
    pub fn new() -> Self {
        Self::from_bus(EventBus::new())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self::from_bus(EventBus::with_config(config))
    }

    pub fn from_bus(bus: EventBus<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bus)),
        }
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.lock().fault_policy()
    }

    #[instrument(skip_all, fields(event = tracing::field::Empty))]
    pub fn subscribe(
        &self,
        event: impl Into<EventName>,
        subscriber: Subscriber<P>,
    ) -> SharedSubscription<P> {
        let event = event.into();
        tracing::Span::current().record("event", event.as_str());

        let subscription = self.lock().subscribe(event, subscriber);
        SharedSubscription {
            subscription,
            bus: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscribe_fn<F>(&self, event: impl Into<EventName>, callback: F) -> SharedSubscription<P>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.subscribe(event, Subscriber::new(callback))
    }

    #[instrument(skip_all, fields(event = event.as_ref()))]
    pub fn unsubscribe(&self, event: impl AsRef<str>, subscriber: &Subscriber<P>) {
        self.lock().unsubscribe(event, subscriber);
    }

    /// Delivers `payload` to a snapshot of the event's subscribers
    #[instrument(skip_all, fields(event = event.as_ref()))]
    pub fn publish(&self, event: impl AsRef<str>, payload: &P) {
        let event = event.as_ref();
        let Some((entries, policy)) = self.snapshot(event) else {
            debug!("No subscribers registered for event");
            return;
        };

        debug!(subscribers = entries.len(), policy = %policy, "Publishing event");
        dispatch::deliver(event, &entries, payload, policy);
    }

    #[instrument(skip_all, fields(event = event.as_ref()))]
    pub fn try_publish(&self, event: impl AsRef<str>, payload: &P) -> Result<(), PublishError> {
        let event = event.as_ref();
        let Some((entries, _)) = self.snapshot(event) else {
            debug!("No subscribers registered for event");
            return Ok(());
        };

        let faults = dispatch::deliver_isolated(event, &entries, payload);
        PublishError::check(event, faults)
    }

    pub fn subscriber_count(&self, event: impl AsRef<str>) -> usize {
        self.lock().subscriber_count(event)
    }

    pub fn has_event(&self, event: impl AsRef<str>) -> bool {
        self.lock().has_event(event)
    }

    pub fn is_subscribed(&self, event: impl AsRef<str>, subscriber: &Subscriber<P>) -> bool {
        self.lock().is_subscribed(event, subscriber)
    }

    fn snapshot(&self, event: &str) -> Option<(Vec<Entry<P>>, FaultPolicy)> {
        let bus = self.lock();
        bus.snapshot(event).map(|entries| (entries, bus.fault_policy()))
    }

    fn lock(&self) -> MutexGuard<'_, EventBus<P>> {
        lock_bus(&self.inner)
    }
}

// Subscribers never run while the lock is held, and every registry update
// completes before the guard drops, so a poisoned registry is still intact.
fn lock_bus<P>(bus: &Mutex<EventBus<P>>) -> MutexGuard<'_, EventBus<P>> {
    bus.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P> Clone for SharedEventBus<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> Default for SharedEventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for SharedEventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedEventBus").field(&*self.lock()).finish()
    }
}

/// Handle returned by [`SharedEventBus::subscribe`] that can remove itself
///
/// Holds only a weak reference to the bus: once every `SharedEventBus`
/// clone is dropped, unsubscribing is a no-op.
pub struct SharedSubscription<P> {
    subscription: Subscription<P>,
    bus: Weak<Mutex<EventBus<P>>>,
}

impl<P> SharedSubscription<P> {
    pub fn id(&self) -> SubscriptionId {
        self.subscription.id()
    }

    pub fn event(&self) -> &EventName {
        self.subscription.event()
    }

    pub fn subscriber(&self) -> &Subscriber<P> {
        self.subscription.subscriber()
    }

    pub fn subscription(&self) -> &Subscription<P> {
        &self.subscription
    }

    /// Same as `unsubscribe(event, subscriber)` on the originating bus
    pub fn unsubscribe(&self) {
        match self.bus.upgrade() {
            Some(bus) => {
                lock_bus(&bus).cancel(&self.subscription);
            }
            None => {
                debug!(event = %self.event(), "Bus already dropped, nothing to unsubscribe");
            }
        }
    }

    /// Removes only the entry this handle was created for
    pub fn unsubscribe_exact(&self) {
        match self.bus.upgrade() {
            Some(bus) => {
                lock_bus(&bus).cancel_exact(&self.subscription);
            }
            None => {
                debug!(event = %self.event(), "Bus already dropped, nothing to unsubscribe");
            }
        }
    }
}

impl<P> Clone for SharedSubscription<P> {
    fn clone(&self) -> Self {
        Self {
            subscription: self.subscription.clone(),
            bus: Weak::clone(&self.bus),
        }
    }
}

impl<P> fmt::Debug for SharedSubscription<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSubscription")
            .field("subscription", &self.subscription)
            .field("bus_alive", &(self.bus.strong_count() > 0))
            .finish()
    }
}
