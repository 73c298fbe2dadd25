//! Tests that adscout logs behave as expected.
//!
//! Every test in the binary shares one log stream, so each test here searches
//! for text only it produces.
#![cfg(test)]

use crate::{adscout_test, TestingTools};
use anyhow::Result;
use httpmock::Method::GET;
use serde_json::json;

#[actix_rt::test]
async fn error_handler_writes_logs() -> Result<()> {
    adscout_test(
        |settings| settings.upstream.access_token = None,
        |TestingTools {
             test_client,
             mut log_watcher,
             ..
         }| async move {
            // Without credentials every interest search is a server error.
            test_client.get("/fb/interests?q=server-error").send().await?;

            assert!(log_watcher.has(|event| event.field_contains("message", "Request server error")));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn interest_requests_are_logged() -> Result<()> {
    adscout_test(
        |settings| settings.log_full_request = true,
        |TestingTools {
             test_client,
             upstream_mock,
             mut log_watcher,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            test_client
                .get("/fb/interests?q=logged-query-text")
                .send()
                .await?;

            assert!(log_watcher.has(|event| {
                event.field_contains("type", "web.interests.request")
                    && event.field_contains("query", "logged-query-text")
            }));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn query_text_is_hidden_by_default() -> Result<()> {
    adscout_test(
        |settings| settings.log_full_request = false,
        |TestingTools {
             test_client,
             upstream_mock,
             mut log_watcher,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            test_client
                .get("/fb/interests?q=private-query-text")
                .send()
                .await?;

            assert!(log_watcher.has(|event| event.field_contains("type", "web.interests.request")));
            assert!(!log_watcher.has(|event| {
                event
                    .fields
                    .values()
                    .any(|value| value.to_string().contains("private-query-text"))
            }));

            Ok(())
        },
    )
    .await
}
