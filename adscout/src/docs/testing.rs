//! # Testing strategies
//!
//! There are two major testing strategies used in this repository: unit tests,
//! and integration tests.
//!
//! Unit tests should appear close to the code they are testing, using standard
//! Rust unit tests. The classification, formatting, and suggestion rules in
//! `adscout-interests` are tested this way, with fine grained control over the
//! inputs.
//!
//! However, many behaviors are difficult to test as unit tests, especially
//! details like the URLs and status codes we expose via the web service. To
//! test these parts of adscout, we have [`adscout-integration-tests`][test-crate],
//! which starts an instance of adscout with a mock upstream API. HTTP requests
//! can then be made to that server in order to test its behavior.
//!
//! [test-crate]: ../../../adscout_integration_tests/
//!
//! ```ignore
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
//!
//! For more details, see the documentation of the `adscout-integration-tests`
//! crate.
