#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # adscout Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `ADSCOUT_ENV`. The
//!    settings for that environment are then loaded from `config/${env}.yaml`, if
//!    it exists. The default environment is "development". A "production"
//!    environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is the place for
//!    local secrets such as the upstream access token.
//! 4. Environment variables that begin with `ADSCOUT_` and have a separator for
//!    `__`. For example, `Settings::upstream::access_token` can be controlled
//!    from the environment variable `ADSCOUT_UPSTREAM__ACCESS_TOKEN`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.

mod logging;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::{net::SocketAddr, time::Duration};

/// Top level settings object for adscout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[doc(inline)]
pub struct Settings {
    /// The environment adscout is running in. Should only be set with the
    /// `ADSCOUT_ENV` environment variable.
    pub env: String,

    /// URL to redirect to from the root of the service. If not set, a short
    /// plain text status message is served instead.
    pub public_documentation: Option<String>,

    /// Include the raw query text in request logs. Queries may contain
    /// sensitive text, so this should stay off in production.
    pub log_full_request: bool,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Settings for the upstream interest search API.
    pub upstream: UpstreamSettings,

    /// Settings for checking callers.
    pub auth: AuthSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the Graph API interest search.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Scheme and host of the API, without a trailing slash, such as
    /// `https://graph.facebook.com`.
    pub base_url: String,

    /// The API version path segment, such as `v19.0`.
    pub api_version: String,

    /// The ad account to search through, without the `act_` prefix.
    pub ad_account_id: Option<String>,

    /// The access token sent with every search.
    pub access_token: Option<String>,

    /// The limit used when a caller doesn't give one, or gives an unusable one.
    pub default_limit: u32,

    /// The largest limit forwarded upstream. Larger requests are clamped.
    pub max_limit: u32,

    /// How long to wait to establish a connection to the API.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// How long to wait for a full response from the API.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,
}

impl UpstreamSettings {
    /// The credentials needed to query the API, if both are configured and
    /// non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<UpstreamCredentials> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned)
        };

        Some(UpstreamCredentials {
            ad_account_id: non_empty(&self.ad_account_id)?,
            access_token: non_empty(&self.access_token)?,
        })
    }
}

/// A complete set of upstream credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamCredentials {
    /// The ad account to search through.
    pub ad_account_id: String,
    /// The access token for the API.
    pub access_token: String,
}

/// Settings for checking callers of the API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    /// If set, callers must send `Authorization: Bearer <shared_secret>`.
    pub shared_secret: Option<String>,
}

/// Settings for statsd metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics to.
    pub sink_host: String,

    /// The port to send metrics to.
    pub sink_port: u16,

    /// The maximum number of metrics waiting to be sent. Metrics recorded
    /// while the queue is full are dropped.
    pub max_queue_size: usize,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let adscout_env =
            std::env::var("ADSCOUT_ENV").unwrap_or_else(|_| "development".to_string());

        Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .set_override("env", adscout_env.as_str())?
            .add_source(File::with_name(&format!("config/{}", adscout_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "ADSCOUT_" and have "__"
            // to separate levels. For example, `ADSCOUT_HTTP__LISTEN` maps to
            // `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("ADSCOUT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Load settings from configuration files for tests.
    ///
    /// # Panics
    /// If the test configuration files are missing or invalid.
    pub fn load_for_tests() -> Self {
        Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("../config/base"))
            // Merge in test specific config.
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .add_source(File::with_name("../config/test"))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("../config/local_test").required(false))
            .build()
            .expect("Could not load settings for tests")
            .try_deserialize()
            .expect("Could not convert settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests();
        assert_eq!(settings.env, "test");
        assert_eq!(settings.upstream.default_limit, 10);
        assert!(settings.upstream.max_limit >= settings.upstream.default_limit);
    }

    #[test]
    fn metrics_queue_is_sized_in_entries() {
        let settings = Settings::load_for_tests();
        assert_eq!(settings.metrics.max_queue_size, 32768);
    }

    fn upstream(ad_account_id: Option<&str>, access_token: Option<&str>) -> UpstreamSettings {
        UpstreamSettings {
            base_url: "http://localhost".to_string(),
            api_version: "v19.0".to_string(),
            ad_account_id: ad_account_id.map(ToOwned::to_owned),
            access_token: access_token.map(ToOwned::to_owned),
            default_limit: 10,
            max_limit: 100,
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn credentials_need_both_values() {
        assert_eq!(
            upstream(Some("123"), Some("token")).credentials(),
            Some(UpstreamCredentials {
                ad_account_id: "123".to_string(),
                access_token: "token".to_string(),
            })
        );
        assert_eq!(upstream(Some("123"), None).credentials(), None);
        assert_eq!(upstream(None, Some("token")).credentials(), None);
    }

    #[test]
    fn blank_credentials_are_missing() {
        assert_eq!(upstream(Some("  "), Some("token")).credentials(), None);
        assert_eq!(upstream(Some("123"), Some("")).credentials(), None);
    }
}
