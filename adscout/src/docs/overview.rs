//! # High level overview of adscout
//!
//! This project is structured as a [Cargo Workspace][] that contains one crate
//! for each broad area of behavior for adscout. Each crate can be compiled in
//! parallel, where dependencies allow, and each test suite can be run
//! separately or together.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! ## [`adscout`](../)
//!
//! The main application and the only *binary* crate in the repository. It
//! loads settings, sets up logging and metrics, and starts the web server.
//!
//! ## [`adscout-settings`](../../adscout_settings/index.html)
//!
//! Defines and documents the settings of the application. These settings are
//! loaded by the binary and passed into the other crates to configure them.
//!
//! ## [`adscout-web`](../../adscout_web/index.html)
//!
//! The HTTP API: request validation, authorization, error responses, and
//! observability endpoints.
//!
//! ## [`adscout-interests`](../../adscout_interests/index.html)
//!
//! The *domain* crate. It queries the upstream search API, separates interest
//! categories from behaviors and demographics, formats audience sizes, and
//! produces fallback suggestions.
//!
//! ## [`adscout-integration-tests`](../../adscout_integration_tests/index.html)
//!
//! A separate test system. It starts a complete adscout server against a mock
//! upstream API and exercises it over HTTP.
