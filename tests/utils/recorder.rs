//! Recording subscribers - capture every delivery for later inspection
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::{Arc, Mutex};

use pubsub::Subscriber;

// ============================================================================
// Recorded Calls
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Call<P> {
    pub subscriber: &'static str,
    pub payload: P,
    /// Address of the payload as seen by the subscriber
    pub addr: usize,
}

/// Shared log that any number of named subscribers append to, so the
/// interleaving across subscribers is preserved
#[derive(Clone)]
pub struct CallLog<P> {
    calls: Arc<Mutex<Vec<Call<P>>>>,
}

impl<P: Clone + Send + 'static> CallLog<P> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a new, distinct subscriber that records under `name`
    pub fn subscriber(&self, name: &'static str) -> Subscriber<P> {
        let log = self.clone();
        Subscriber::new(move |payload: &P| log.record(name, payload))
    }

    /// Records a delivery by hand, for subscribers built outside this log
    pub fn record(&self, name: &'static str, payload: &P) {
        self.calls.lock().unwrap().push(Call {
            subscriber: name,
            payload: payload.clone(),
            addr: payload as *const P as usize,
        });
    }

    pub fn calls(&self) -> Vec<Call<P>> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the subscribers invoked, in invocation order
    pub fn names(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.subscriber).collect()
    }

    pub fn received_by(&self, name: &str) -> Vec<P> {
        self.calls()
            .into_iter()
            .filter(|c| c.subscriber == name)
            .map(|c| c.payload)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}
