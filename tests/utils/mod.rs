pub mod assertions;
pub mod recorder;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::DeliveryAssertion;
pub use recorder::CallLog;
#[allow(unused_imports)]
pub use setup::{product, TestSetup, TestSetupBuilder};
