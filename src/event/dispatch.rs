use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, error};

use super::error::{panic_message, SubscriberFault};
use super::subscriber::Entry;

/// What `publish` does when a subscriber panics
///
/// - `FailFast` (default): the panic unwinds out of `publish` and the
///   remaining subscribers for that call are skipped. Nothing is caught.
/// - `Isolate`: each subscriber runs under `catch_unwind`; a panic is logged
///   and delivery moves on to the next subscriber.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FaultPolicy {
    #[default]
    FailFast,
    Isolate,
}

/// Invokes every entry in order according to `policy`
pub(crate) fn deliver<P>(event: &str, entries: &[Entry<P>], payload: &P, policy: FaultPolicy) {
    match policy {
        FaultPolicy::FailFast => {
            for entry in entries {
                entry.subscriber.call(payload);
            }
        }
        FaultPolicy::Isolate => {
            let faults = deliver_isolated(event, entries, payload);
            if !faults.is_empty() {
                debug!(
                    event = %event,
                    faults = faults.len(),
                    "Delivery finished with isolated faults"
                );
            }
        }
    }
}

/// Invokes every entry in order, catching panics, and returns what failed
pub(crate) fn deliver_isolated<P>(
    event: &str,
    entries: &[Entry<P>],
    payload: &P,
) -> Vec<SubscriberFault> {
    let mut faults = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.subscriber.call(payload)));

        if let Err(panic_payload) = outcome {
            let message = panic_message(panic_payload.as_ref());
            error!(
                event = %event,
                subscription_id = %entry.id,
                position = position,
                panic = %message,
                "Subscriber panicked"
            );
            faults.push(SubscriberFault {
                position,
                id: entry.id,
                message,
            });
        }
    }

    faults
}
