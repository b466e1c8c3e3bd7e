use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifies one notification channel on the bus
///
/// Names compare by exact value. There is no hierarchy or pattern matching,
/// so `"iphone13"` and `"iphone13/pro"` are unrelated channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets the registry be queried with a plain `&str`.
impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
