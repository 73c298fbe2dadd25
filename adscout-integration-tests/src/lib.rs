#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
// This is a compromise.
#![allow(dead_code)]

//! Tests for adscout that work by reading from the external API only.
//!
//! Since the URL endpoints adscout exposes to the world are its public API, and
//! other systems depend on them, the paths used in tests here are important
//! details, and used to keep compatibility.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `adscout/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`adscout_test`], which starts a mock of
//! the upstream Graph API, sets up the application for testing, and provides
//! helpers to inspect the state of the app. It then calls the test function
//! that is passed to it, providing the above tools as an argument.
//!
//! ```
//! use adscout_integration_tests::{adscout_test, TestingTools};
//! use reqwest::StatusCode;
//!
//! #[actix_rt::test]
//! async fn health_works() {
//!     adscout_test(
//!         |_| (),
//!         |TestingTools { test_client, .. }| async move {
//!             let response = test_client
//!                 .get("/health")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!
//!             assert_eq!(response.status(), StatusCode::OK);
//!         },
//!     )
//!     .await
//! }
//! ```

mod general;
mod interests;
mod logging;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    metrics::MetricsWatcher,
    test_tools::{adscout_test, TestingTools},
};
