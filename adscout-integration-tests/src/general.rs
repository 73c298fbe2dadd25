//! Tests adscout's informational endpoints.
#![cfg(test)]

use crate::{adscout_test, TestingTools};
use anyhow::Result;
use pretty_assertions::assert_eq;
use reqwest::{header::HeaderValue, StatusCode};
use serde_json::Value;

#[actix_rt::test]
async fn root_of_services_provides_public_docs() -> Result<()> {
    adscout_test(
        |settings| settings.public_documentation = Some("https://example.com/".to_owned()),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get("location"),
                Some(&HeaderValue::from_static("https://example.com/"))
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_of_services_has_a_fallback_message() -> Result<()> {
    adscout_test(
        |settings| settings.public_documentation = None,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.text().await?,
                "adscout is online. It searches advertising interest categories at /fb/interests?q=<text>."
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn health_reports_online() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/health").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body["status"], "online");
            let timestamp = body["timestamp"]
                .as_str()
                .expect("timestamp should be a string");
            assert!(timestamp.ends_with('Z'), "not UTC: {}", timestamp);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn health_needs_no_credentials() -> Result<()> {
    adscout_test(
        |settings| {
            settings.auth.shared_secret = Some("s3cret".to_owned());
            settings.upstream.access_token = None;
        },
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/health").send().await?;

            assert_eq!(response.status(), StatusCode::OK);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn cross_origin_requests_are_allowed() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/health")
                .header("origin", "https://dashboard.example.com")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get("access-control-allow-origin"),
                Some(&HeaderValue::from_static("https://dashboard.example.com"))
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn only_documented_routes_are_served() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            for path in ["/__heartbeat__", "/__lbheartbeat__", "/__version__", "/__error__"] {
                let response = test_client.get(path).send().await?;
                assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
            }

            Ok(())
        },
    )
    .await
}
