use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::{
    dispatch::{self, FaultPolicy},
    error::PublishError,
    name::EventName,
    subscriber::{Entry, Subscriber, Subscription, SubscriptionId},
};
use crate::config::BusConfig;

/// Synchronous, in-process event bus
///
/// Owns a registry mapping each event name to the subscribers registered
/// for it, in subscription order. Keys are created on first subscription
/// and never removed, even once their sequence is empty.
///
/// Mutation (`subscribe`, `unsubscribe`, `cancel*`) needs `&mut self` while
/// `publish` only needs `&self`, so a subscriber cannot reach back into the
/// bus it is being dispatched from. Use
/// [`SharedEventBus`](super::SharedEventBus) when subscribers need to do
/// that.
pub struct EventBus<P> {
    registry: HashMap<EventName, Vec<Entry<P>>>,
    next_id: u64,
    config: BusConfig,
}

impl<P> EventBus<P> {
    /// Creates an empty bus with the default (fail-fast) configuration
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            registry: HashMap::new(),
            next_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.config.fault_policy
    }

    /// Appends `subscriber` to the sequence for `event`
    ///
    /// Subscribing the same subscriber twice creates two entries; both are
    /// invoked on publish.
    pub fn subscribe(
        &mut self,
        event: impl Into<EventName>,
        subscriber: Subscriber<P>,
    ) -> Subscription<P> {
        let event = event.into();
        let id = SubscriptionId::new(self.next_id);
        self.next_id += 1;

        let entries = self.registry.entry(event.clone()).or_default();
        entries.push(Entry {
            id,
            subscriber: subscriber.clone(),
        });

        debug!(
            event = %event,
            subscription_id = %id,
            subscribers = entries.len(),
            "Subscriber registered"
        );

        Subscription::new(id, event, subscriber)
    }

    /// Wraps `callback` in a fresh [`Subscriber`] and subscribes it
    pub fn subscribe_fn<F>(&mut self, event: impl Into<EventName>, callback: F) -> Subscription<P>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.subscribe(event, Subscriber::new(callback))
    }

    /// Removes every entry for `event` that is the same subscriber
    ///
    /// Unknown events and absent subscribers are a no-op. The event key is
    /// kept even if its sequence becomes empty.
    pub fn unsubscribe(&mut self, event: impl AsRef<str>, subscriber: &Subscriber<P>) {
        let event = event.as_ref();
        self.remove_where(event, |entry| entry.subscriber.same_as(subscriber));
    }

    /// Undoes a subscription the way its handle was documented to
    ///
    /// Identical to `unsubscribe(subscription.event(), subscription.subscriber())`:
    /// if the same subscriber was registered more than once for the event,
    /// all of those entries go.
    pub fn cancel(&mut self, subscription: &Subscription<P>) {
        self.unsubscribe(subscription.event(), subscription.subscriber());
    }

    /// Removes only the entry created by the `subscribe` call that returned
    /// `subscription`
    pub fn cancel_exact(&mut self, subscription: &Subscription<P>) {
        let id = subscription.id();
        self.remove_where(subscription.event().as_str(), |entry| entry.id == id);
    }

    /// Delivers `payload` to every subscriber of `event`, in subscription order
    ///
    /// Publishing to an event nobody subscribed to does nothing. A panicking
    /// subscriber is handled according to the bus's [`FaultPolicy`].
    pub fn publish(&self, event: impl AsRef<str>, payload: &P) {
        let event = event.as_ref();
        let Some(entries) = self.registry.get(event) else {
            debug!(event = %event, "No subscribers registered for event");
            return;
        };

        debug!(
            event = %event,
            subscribers = entries.len(),
            policy = %self.config.fault_policy,
            "Publishing event"
        );
        dispatch::deliver(event, entries, payload, self.config.fault_policy);
    }

    /// Delivers `payload` to every subscriber regardless of panics, then
    /// reports every subscriber that panicked
    ///
    /// Ignores the configured [`FaultPolicy`]; delivery is always isolated.
    pub fn try_publish(&self, event: impl AsRef<str>, payload: &P) -> Result<(), PublishError> {
        let event = event.as_ref();
        let Some(entries) = self.registry.get(event) else {
            debug!(event = %event, "No subscribers registered for event");
            return Ok(());
        };

        debug!(event = %event, subscribers = entries.len(), "Publishing event (isolated)");
        let faults = dispatch::deliver_isolated(event, entries, payload);
        PublishError::check(event, faults)
    }

    /// Number of entries currently registered for `event`
    pub fn subscriber_count(&self, event: impl AsRef<str>) -> usize {
        self.registry.get(event.as_ref()).map_or(0, Vec::len)
    }

    /// Whether `event` has a registry key, even one with no subscribers left
    pub fn has_event(&self, event: impl AsRef<str>) -> bool {
        self.registry.contains_key(event.as_ref())
    }

    pub fn is_subscribed(&self, event: impl AsRef<str>, subscriber: &Subscriber<P>) -> bool {
        self.registry
            .get(event.as_ref())
            .is_some_and(|entries| entries.iter().any(|e| e.subscriber.same_as(subscriber)))
    }

    /// Every event name seen by `subscribe`, in no particular order
    pub fn events(&self) -> impl Iterator<Item = &EventName> {
        self.registry.keys()
    }

    /// Copy of the sequence for `event`, taken so dispatch can run without
    /// holding a borrow of the registry
    pub(crate) fn snapshot(&self, event: &str) -> Option<Vec<Entry<P>>> {
        self.registry.get(event).cloned()
    }

    fn remove_where<F>(&mut self, event: &str, matches: F)
    where
        F: Fn(&Entry<P>) -> bool,
    {
        let Some(entries) = self.registry.get_mut(event) else {
            debug!(event = %event, "Unsubscribe from unknown event ignored");
            return;
        };

        let before = entries.len();
        entries.retain(|entry| !matches(entry));

        debug!(
            event = %event,
            removed = before - entries.len(),
            remaining = entries.len(),
            "Subscriber removed"
        );
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: HashMap<&str, usize> = self
            .registry
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.len()))
            .collect();

        f.debug_struct("EventBus")
            .field("events", &events)
            .field("config", &self.config)
            .finish()
    }
}
