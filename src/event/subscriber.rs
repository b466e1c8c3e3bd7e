use std::fmt;
use std::sync::Arc;

use super::name::EventName;

type Callback<P> = dyn Fn(&P) + Send + Sync;

/// A callback registered against an event name
///
/// Subscribers are compared by identity, not by value: two subscribers are
/// equal only if they share the same underlying callback. Cloning a
/// `Subscriber` therefore produces the *same* subscriber, while wrapping an
/// identical closure twice produces two different ones.
pub struct Subscriber<P> {
    callback: Arc<Callback<P>>,
}

impl<P> Subscriber<P> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Whether both handles point at the same registered callback
    pub fn same_as(&self, other: &Subscriber<P>) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    pub(crate) fn call(&self, payload: &P) {
        (self.callback)(payload)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.callback) as *const ()
    }
}

impl<P> Clone for Subscriber<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> PartialEq for Subscriber<P> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl<P> Eq for Subscriber<P> {}

impl<P> fmt::Debug for Subscriber<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscriber").field(&self.addr()).finish()
    }
}

/// Identifier handed out once per `subscribe` call, unique within one bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned by `subscribe`
///
/// Captures the event name, the subscriber reference and the id of the
/// registry entry created by that call. Passing it to `EventBus::cancel`
/// behaves exactly like `unsubscribe(event, subscriber)` and so removes
/// *every* entry sharing that subscriber reference; `EventBus::cancel_exact`
/// removes only the entry this handle was created for.
///
/// Dropping a handle does not unsubscribe.
pub struct Subscription<P> {
    id: SubscriptionId,
    event: EventName,
    subscriber: Subscriber<P>,
}

impl<P> Subscription<P> {
    pub(crate) fn new(id: SubscriptionId, event: EventName, subscriber: Subscriber<P>) -> Self {
        Self {
            id,
            event,
            subscriber,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    pub fn subscriber(&self) -> &Subscriber<P> {
        &self.subscriber
    }
}

impl<P> Clone for Subscription<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            event: self.event.clone(),
            subscriber: self.subscriber.clone(),
        }
    }
}

impl<P> fmt::Debug for Subscription<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

/// One slot in an event's subscriber sequence
pub(crate) struct Entry<P> {
    pub(crate) id: SubscriptionId,
    pub(crate) subscriber: Subscriber<P>,
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            subscriber: self.subscriber.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_clone_keeps_identity() {
        let subscriber = Subscriber::<u32>::new(|_| {});
        let clone = subscriber.clone();

        assert!(subscriber.same_as(&clone));
        assert_eq!(subscriber, clone);
    }

    #[test]
    fn test_identical_closures_are_distinct() {
        let first = Subscriber::<u32>::new(|_| {});
        let second = Subscriber::<u32>::new(|_| {});

        assert_ne!(first, second);
    }

    #[test]
    fn test_call_forwards_payload() {
        let seen = Arc::new(AtomicU32::new(0));
        let sink = seen.clone();
        let subscriber = Subscriber::new(move |value: &u32| {
            sink.fetch_add(*value, Ordering::Relaxed);
        });

        subscriber.call(&3);
        subscriber.call(&4);

        assert_eq!(seen.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_subscription_exposes_captured_values() {
        let subscriber = Subscriber::<()>::new(|_| {});
        let subscription =
            Subscription::new(SubscriptionId::new(7), "iphone13".into(), subscriber.clone());

        assert_eq!(subscription.id().as_u64(), 7);
        assert_eq!(subscription.id().to_string(), "#7");
        assert_eq!(subscription.event().as_str(), "iphone13");
        assert!(subscription.subscriber().same_as(&subscriber));
    }
}
