//! Test assertion helpers - fluent API for verifying deliveries
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::fmt::Debug;

use super::recorder::CallLog;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct DeliveryAssertion<'a, P> {
    log: &'a CallLog<P>,
}

impl<'a, P: Clone + Debug + PartialEq + Send + 'static> DeliveryAssertion<'a, P> {
    pub fn on(log: &'a CallLog<P>) -> Self {
        Self { log }
    }

    /// Assert the exact sequence of subscriber invocations
    pub fn invoked_in_order(self, expected: &[&str]) -> Self {
        assert_eq!(self.log.names(), expected, "unexpected invocation order");
        self
    }

    /// Assert everything `name` received, in order
    pub fn received(self, name: &str, expected: &[P]) -> Self {
        assert_eq!(
            self.log.received_by(name),
            expected,
            "{} received unexpected payloads",
            name
        );
        self
    }

    pub fn received_nothing(self, name: &str) -> Self {
        assert!(
            self.log.received_by(name).is_empty(),
            "{} should not have been invoked",
            name
        );
        self
    }

    /// Assert every recorded call observed the payload at `addr`
    pub fn all_saw_address(self, addr: usize) -> Self {
        for call in self.log.calls() {
            assert_eq!(
                call.addr, addr,
                "{} saw a different payload instance",
                call.subscriber
            );
        }
        self
    }
}
