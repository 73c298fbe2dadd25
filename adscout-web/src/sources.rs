//! Tools to manage the upstream interest source.

use std::sync::Arc;

use adscout_interests::{GraphApiClient, InterestSource};
use adscout_settings::Settings;
use anyhow::{Context, Result};

/// The InterestSource stored in Actix's app_data.
///
/// Holds `None` when the deployment has no upstream credentials. Requests are
/// then answered with a configuration error instead of failing at startup.
#[derive(Clone)]
pub struct InterestSourceRef(pub Option<Arc<dyn InterestSource>>);

impl InterestSourceRef {
    /// Initialize the Graph API interest source.
    ///
    /// # Errors
    /// If the source cannot be set up, other than because credentials are missing.
    pub fn init(settings: &Settings) -> Result<Self> {
        let _setup_span = tracing::info_span!("interest_source_setup").entered();
        tracing::info!(
            r#type = "web.configuring-source",
            "Setting up the interest source"
        );

        let source = GraphApiClient::from_settings(&settings.upstream)
            .context("Setting up the Graph API client")?
            .map(|client| Arc::new(client) as Arc<dyn InterestSource>);

        Ok(Self(source))
    }

    /// The configured source, if any.
    pub fn get(&self) -> Option<&dyn InterestSource> {
        self.0.as_deref()
    }
}
