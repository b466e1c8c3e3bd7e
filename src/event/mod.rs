// Publish/subscribe core
//
// Named events, the callbacks registered against them, and the bus that
// owns the registry and dispatches payloads synchronously.

// Public API - what other modules can use
pub use bus::EventBus;
pub use dispatch::FaultPolicy;
pub use error::{PublishError, SubscriberFault};
pub use name::EventName;
pub use shared::{SharedEventBus, SharedSubscription};
pub use subscriber::{Subscriber, Subscription, SubscriptionId};

// Internal modules
mod bus;
mod dispatch;
mod error;
mod name;
mod shared;
mod subscriber;
