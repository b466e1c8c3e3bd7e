#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::{json, Value};

use pubsub::{BusConfig, EventBus, FaultPolicy, Subscriber, Subscription};

use super::recorder::CallLog;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Product announcement payload used across the workflow tests
pub fn product(name: &str, price: u32) -> Value {
    json!({ "name": name, "price": price })
}

/// Bus wired the way the product launch demo wires it:
/// A and B on `iphone13`, A on `iphone15`
pub struct TestSetup {
    pub bus: EventBus<Value>,
    pub log: CallLog<Value>,
    pub subscriber_a: Subscriber<Value>,
    pub subscriber_b: Subscriber<Value>,
    pub iphone13_a: Subscription<Value>,
    pub iphone13_b: Subscription<Value>,
    pub iphone15_a: Subscription<Value>,
}

pub struct TestSetupBuilder {
    fault_policy: FaultPolicy,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            fault_policy: FaultPolicy::default(),
        }
    }

    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    pub fn build(self) -> TestSetup {
        let config = BusConfig::new().with_fault_policy(self.fault_policy);
        let mut bus = EventBus::with_config(config);
        let log = CallLog::new();

        let subscriber_a = log.subscriber("A");
        let subscriber_b = log.subscriber("B");

        let iphone13_a = bus.subscribe("iphone13", subscriber_a.clone());
        let iphone13_b = bus.subscribe("iphone13", subscriber_b.clone());
        let iphone15_a = bus.subscribe("iphone15", subscriber_a.clone());

        TestSetup {
            bus,
            log,
            subscriber_a,
            subscriber_b,
            iphone13_a,
            iphone13_b,
            iphone15_a,
        }
    }
}
