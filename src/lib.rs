// Library crate for the in-process publish/subscribe bus
// This file exposes the public API for the demo binary and integration tests

pub mod config;
pub mod event;

// Re-export commonly used types for easier access in tests
pub use config::{BusConfig, ConfigError, FAULT_POLICY_ENV};
pub use event::{
    EventBus, EventName, FaultPolicy, PublishError, SharedEventBus, SharedSubscription,
    Subscriber, SubscriberFault, Subscription, SubscriptionId,
};
