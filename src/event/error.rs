use std::any::Any;
use thiserror::Error;

use super::name::EventName;
use super::subscriber::SubscriptionId;

/// A subscriber that panicked while an event was being delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFault {
    /// Index of the subscriber in the event's sequence at dispatch time
    pub position: usize,
    pub id: SubscriptionId,
    pub message: String,
}

/// Errors reported by `try_publish`
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{} subscriber(s) panicked while handling '{event}'", .faults.len())]
    SubscriberPanicked {
        event: EventName,
        faults: Vec<SubscriberFault>,
    },
}

impl PublishError {
    pub(crate) fn check(event: &str, faults: Vec<SubscriberFault>) -> Result<(), PublishError> {
        if faults.is_empty() {
            Ok(())
        } else {
            Err(PublishError::SubscriberPanicked {
                event: EventName::from(event),
                faults,
            })
        }
    }

    pub fn faults(&self) -> &[SubscriberFault] {
        match self {
            PublishError::SubscriberPanicked { faults, .. } => faults,
        }
    }
}

/// Extracts the message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
