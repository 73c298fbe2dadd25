//! An [`InterestSource`] that searches an ad account through the Graph API.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use adscout_settings::UpstreamSettings;

use crate::{
    domain::{InterestRecord, SearchLimit},
    InterestSource, SetupError, UpstreamError,
};

/// The only search type this service issues.
const SEARCH_TYPE: &str = "adinterest";

/// The fields requested for every result.
const RESULT_FIELDS: &str = "id,name,path,audience_size_lower_bound,audience_size_upper_bound";

/// User-Agent sent to the Graph API.
const REQWEST_USER_AGENT: &str = concat!("adscout/", env!("CARGO_PKG_VERSION"));

/// Searches interests in one ad account.
pub struct GraphApiClient {
    /// The HTTP client to query the API with.
    client: reqwest::Client,
    /// The full URL of the account's targeting search endpoint.
    endpoint: String,
    /// Sent as the `access_token` parameter.
    access_token: String,
}

/// The parts of a successful search response that are used.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// The results, in relevance order. An explicit null counts as none.
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// Read one result, replacing anything that isn't a record with an empty one.
///
/// Empty records have no path, so classification drops them.
fn lenient_record(item: Value) -> InterestRecord {
    serde_json::from_value(item).unwrap_or_else(|error| {
        tracing::debug!(
            r#type = "interests.graph-api.unreadable-record",
            %error,
            "Skipping an unreadable upstream record"
        );
        InterestRecord::default()
    })
}

impl GraphApiClient {
    /// Create a client from settings.
    ///
    /// Returns `Ok(None)` if the ad account or access token is not configured.
    /// That is not a startup failure: requests are rejected as misconfigured
    /// until the deployment is fixed.
    ///
    /// # Errors
    /// If the HTTP client cannot be built.
    pub fn from_settings(settings: &UpstreamSettings) -> Result<Option<Self>, SetupError> {
        let credentials = match settings.credentials() {
            Some(credentials) => credentials,
            None => {
                tracing::warn!(
                    r#type = "interests.graph-api.missing-credentials",
                    "Upstream credentials are not configured, interest searches will fail"
                );
                return Ok(None);
            }
        };

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(REQWEST_USER_AGENT)
            .build()
            .context("Unable to create the Reqwest client")
            .map_err(SetupError::Network)?;

        let endpoint = format!(
            "{}/{}/act_{}/targetingsearch",
            settings.base_url.trim_end_matches('/'),
            settings.api_version,
            credentials.ad_account_id
        );

        Ok(Some(Self {
            client,
            endpoint,
            access_token: credentials.access_token,
        }))
    }
}

#[async_trait]
impl InterestSource for GraphApiClient {
    fn name(&self) -> String {
        "GraphApiClient".to_owned()
    }

    async fn search(
        &self,
        query: &str,
        limit: SearchLimit,
    ) -> Result<Vec<InterestRecord>, UpstreamError> {
        tracing::debug!(
            r#type = "interests.graph-api.search",
            endpoint = %self.endpoint,
            %limit,
            "Searching upstream interests"
        );

        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("type", SEARCH_TYPE),
                ("q", query),
                ("limit", limit.as_str()),
                ("fields", RESULT_FIELDS),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .context("Couldn't reach the Graph API")
            .map_err(UpstreamError::Network)?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .context("Failed to parse the Graph API response as JSON")
            .map_err(UpstreamError::Format)?;

        if let Some(payload) = body.get("error") {
            return Err(UpstreamError::BadQuery {
                payload: payload.clone(),
            });
        }

        if !status.is_success() {
            return Err(UpstreamError::Network(anyhow!(
                "The Graph API responded with status {}",
                status
            )));
        }

        let SearchResponse { data } = serde_json::from_value(body)
            .context("Unexpected shape of the Graph API response")
            .map_err(UpstreamError::Format)?;
        let data: Vec<InterestRecord> = data
            .unwrap_or_default()
            .into_iter()
            .map(lenient_record)
            .collect();

        tracing::debug!(
            r#type = "interests.graph-api.results",
            result_count = data.len(),
            "Received upstream interests"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PathValue;
    use httpmock::{Method::GET, MockServer};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn settings(base_url: String) -> UpstreamSettings {
        UpstreamSettings {
            base_url,
            api_version: "v19.0".to_string(),
            ad_account_id: Some("42".to_string()),
            access_token: Some("secret-token".to_string()),
            default_limit: 10,
            max_limit: 100,
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_millis(500),
        }
    }

    fn client(server: &MockServer) -> GraphApiClient {
        GraphApiClient::from_settings(&settings(server.base_url()))
            .expect("client builds")
            .expect("credentials are configured")
    }

    #[test]
    fn missing_credentials_make_no_client() {
        let mut settings = settings("http://localhost".to_string());
        settings.access_token = None;
        assert!(GraphApiClient::from_settings(&settings)
            .expect("client builds")
            .is_none());
    }

    #[tokio::test]
    async fn search_sends_the_fixed_parameters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v19.0/act_42/targetingsearch")
                    .query_param("type", "adinterest")
                    .query_param("q", "dota")
                    .query_param("limit", "5")
                    .query_param("fields", RESULT_FIELDS)
                    .query_param("access_token", "secret-token");
                then.status(200).json_body(json!({
                    "data": [{
                        "id": "1",
                        "name": "Dota 2",
                        "path": ["Interests", "Games", "MOBA"],
                        "audience_size_lower_bound": 1_000_000,
                        "audience_size_upper_bound": 2_000_000,
                    }],
                }));
            })
            .await;

        let records = client(&server)
            .search("dota", SearchLimit::from_param(Some("5"), 10, 100))
            .await
            .expect("search succeeds");

        mock.assert_async().await;
        assert_eq!(
            records,
            vec![InterestRecord {
                id: "1".to_string(),
                name: "Dota 2".to_string(),
                path: PathValue::from(["Interests", "Games", "MOBA"]),
                audience_lower: Some(1_000_000.0),
                audience_upper: Some(2_000_000.0),
            }]
        );
    }

    #[tokio::test]
    async fn missing_data_is_an_empty_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({}));
            })
            .await;

        let records = client(&server)
            .search("nothing", SearchLimit::from_param(None, 10, 100))
            .await
            .expect("search succeeds");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn null_data_is_an_empty_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({ "data": null }));
            })
            .await;

        let records = client(&server)
            .search("nothing", SearchLimit::from_param(None, 10, 100))
            .await
            .expect("search succeeds");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unreadable_records_become_empty_records() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({
                    "data": [
                        null,
                        "not a record",
                        { "id": 7, "name": "Anime", "path": ["Interests", "Anime"] },
                    ],
                }));
            })
            .await;

        let records = client(&server)
            .search("anime", SearchLimit::from_param(None, 10, 100))
            .await
            .expect("search succeeds");

        assert_eq!(
            records,
            vec![
                InterestRecord::default(),
                InterestRecord::default(),
                InterestRecord {
                    id: "7".to_string(),
                    name: "Anime".to_string(),
                    path: PathValue::from(["Interests", "Anime"]),
                    audience_lower: None,
                    audience_upper: None,
                },
            ]
        );
        assert_eq!(crate::classifier::classify(&records).len(), 1);
    }

    #[tokio::test]
    async fn error_payloads_are_bad_queries() {
        let server = MockServer::start_async().await;
        let error = json!({
            "message": "(#100) Invalid parameter",
            "type": "OAuthException",
            "code": 100,
        });
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(400).json_body(json!({ "error": error.clone() }));
            })
            .await;

        let result = client(&server)
            .search("dota", SearchLimit::from_param(None, 10, 100))
            .await;

        match result {
            Err(UpstreamError::BadQuery { payload }) => assert_eq!(payload, error),
            other => panic!("expected a bad query, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_payloads_win_over_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200)
                    .json_body(json!({ "error": { "message": "nope" }, "data": [] }));
            })
            .await;

        let result = client(&server)
            .search("dota", SearchLimit::from_param(None, 10, 100))
            .await;
        assert!(matches!(result, Err(UpstreamError::BadQuery { .. })));
    }

    #[tokio::test]
    async fn unparsable_bodies_are_format_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let result = client(&server)
            .search("dota", SearchLimit::from_param(None, 10, 100))
            .await;
        assert!(matches!(result, Err(UpstreamError::Format(_))));
    }

    #[tokio::test]
    async fn failed_statuses_without_a_payload_are_network_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503).json_body(json!({ "data": [] }));
            })
            .await;

        let result = client(&server)
            .search("dota", SearchLimit::from_param(None, 10, 100))
            .await;
        assert!(matches!(result, Err(UpstreamError::Network(_))));
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({ "data": [] }));
            })
            .await;

        let result = client(&server)
            .search("dota", SearchLimit::from_param(None, 10, 100))
            .await;
        assert!(matches!(result, Err(UpstreamError::Network(_))));
    }
}
