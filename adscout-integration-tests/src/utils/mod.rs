//! Shared tools for the integration tests.

pub mod logging;
pub mod metrics;
pub mod test_tools;
