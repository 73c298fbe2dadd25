//! Tests adscout's interest search, from the caller's request to the upstream
//! API and back.
#![cfg(test)]

use crate::{adscout_test, TestingTools};
use anyhow::Result;
use httpmock::Method::GET;
use pretty_assertions::assert_eq;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

/// Where the test settings point the upstream client, relative to the mock.
const UPSTREAM_PATH: &str = "/v19.0/act_1234567890/targetingsearch";

#[actix_rt::test]
async fn interests_are_formatted_and_filtered() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(UPSTREAM_PATH)
                        .query_param("type", "adinterest")
                        .query_param("q", "dota")
                        .query_param("limit", "10")
                        .query_param(
                            "fields",
                            "id,name,path,audience_size_lower_bound,audience_size_upper_bound",
                        )
                        .query_param("access_token", "test-access-token");
                    then.status(200).json_body(json!({
                        "data": [
                            {
                                "id": "6003342470823",
                                "name": "Dota 2",
                                "path": ["Interests", "Games", "Dota 2"],
                                "audience_size_lower_bound": 1_200_000,
                                "audience_size_upper_bound": 1_500_000
                            },
                            {
                                "id": "6002714895372",
                                "name": "Frequent gamers",
                                "path": ["Behaviors", "Digital activities", "Frequent gamers"],
                                "audience_size_lower_bound": 90_000_000,
                                "audience_size_upper_bound": 110_000_000
                            },
                            {
                                "id": 6003108826384_u64,
                                "name": "Video games",
                                "path": "Interests > Video games"
                            }
                        ]
                    }));
                })
                .await;

            let response = test_client.get("/fb/interests?q=dota").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                body,
                json!({
                    "query": "dota",
                    "count": 2,
                    "items": [
                        {
                            "id": "6003342470823",
                            "name": "Dota 2",
                            "path": "Interests > Games > Dota 2",
                            "size": "1M–2M"
                        },
                        {
                            "id": "6003108826384",
                            "name": "Video games",
                            "path": "Interests > Video games",
                            "size": "—"
                        }
                    ]
                })
            );
            mock.assert_async().await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn behaviors_only_falls_back_to_suggestions() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             mut metrics_watcher,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(UPSTREAM_PATH)
                        .query_param("q", "football");
                    then.status(200).json_body(json!({
                        "data": [{
                            "id": "6015559470583",
                            "name": "Football fans",
                            "path": ["Behaviors", "Sports fans"],
                            "audience_size_lower_bound": 2_000_000,
                            "audience_size_upper_bound": 2_400_000
                        }]
                    }));
                })
                .await;

            let response = test_client.get("/fb/interests?q=football").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                body,
                json!({
                    "query": "football",
                    "count": 0,
                    "items": [],
                    "suggestions": ["video games", "gamers", "online games", "videojuegos"]
                })
            );
            assert!(metrics_watcher.has_counter("interests.fallback", 1.0));
            assert!(metrics_watcher.has_histogram("interests.items-per", 0.0));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn suggestions_follow_query_stems() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            let response = test_client.get("/fb/interests?q=Mobile%20RPG").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                body["suggestions"],
                json!(["mobile games", "smartphones", "role-playing games", "MMORPG"])
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn family_hints_come_from_rejected_results() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(200).json_body(json!({
                        "data": [{
                            "id": "1",
                            "name": "Console gamers",
                            "path": ["Behaviors", "Games", "Console gamers"]
                        }]
                    }));
                })
                .await;

            let response = test_client.get("/fb/interests?q=consoles").send().await?;

            let body: Value = response.json().await?;
            assert_eq!(
                body["suggestions"],
                json!(["video games", "online games", "gamers", "esports"])
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn limit_is_clamped_before_reaching_upstream() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(UPSTREAM_PATH)
                        .query_param("q", "clamped")
                        .query_param("limit", "100");
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            let response = test_client
                .get("/fb/interests?q=clamped&limit=500")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            mock.assert_async().await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unusable_limit_uses_the_default() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(UPSTREAM_PATH)
                        .query_param("q", "defaulted")
                        .query_param("limit", "10");
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            for limit in ["abc", "0", "-3"] {
                let response = test_client
                    .get(&format!("/fb/interests?q=defaulted&limit={}", limit))
                    .send()
                    .await?;
                assert_eq!(response.status(), StatusCode::OK);
            }
            mock.assert_hits_async(3).await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn missing_query_is_rejected() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            for path in ["/fb/interests", "/fb/interests?q=", "/fb/interests?limit=5"] {
                let response = test_client.get(path).send().await?;
                assert_eq!(response.status(), StatusCode::BAD_REQUEST);
                let body: Value = response.json().await?;
                assert_eq!(body, json!({ "error": "Missing parameter 'q'" }));
            }
            assert_eq!(mock.hits_async().await, 0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn shared_secret_is_required_when_configured() -> Result<()> {
    adscout_test(
        |settings| settings.auth.shared_secret = Some("s3cret".to_owned()),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            // Authorization is checked before the query.
            let response = test_client.get("/fb/interests").send().await?;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "error": "Unauthorized" }));

            let response = test_client
                .get("/fb/interests?q=secret")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(mock.hits_async().await, 0);

            let response = test_client
                .get("/fb/interests?q=secret")
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(mock.hits_async().await, 1);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn malformed_query_strings_are_unauthorized_without_credentials() -> Result<()> {
    adscout_test(
        |settings| settings.auth.shared_secret = Some("s3cret".to_owned()),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            for path in [
                "/fb/interests?q=a&q=b",
                "/fb/interests?q=%zz&limit=ten&limit=5",
                "/fb/interests?&&=",
            ] {
                let response = test_client.get(path).send().await?;
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
                let body: Value = response.json().await?;
                assert_eq!(body, json!({ "error": "Unauthorized" }));
            }
            assert_eq!(mock.hits_async().await, 0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn repeated_parameters_use_the_first_value() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(UPSTREAM_PATH)
                        .query_param("q", "first")
                        .query_param("limit", "3");
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            let response = test_client
                .get("/fb/interests?q=first&limit=3&q=second&limit=50")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body["query"], "first");
            mock.assert_async().await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn query_text_is_forwarded_and_echoed_as_sent() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(UPSTREAM_PATH)
                        .query_param("q", "  spaced out ");
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            let response = test_client
                .get("/fb/interests?q=%20%20spaced%20out%20")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body["query"], "  spaced out ");
            mock.assert_async().await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn missing_credentials_report_a_misconfigured_server() -> Result<()> {
    adscout_test(
        |settings| settings.upstream.access_token = None,
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(200).json_body(json!({ "data": [] }));
                })
                .await;

            let response = test_client.get("/fb/interests?q=dota").send().await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "error": "Server missing environment variables" }));
            assert_eq!(mock.hits_async().await, 0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn upstream_rejections_are_passed_through() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             mut metrics_watcher,
             ..
         }| async move {
            let upstream_error = json!({
                "message": "(#100) Invalid parameter",
                "type": "OAuthException",
                "code": 100
            });
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(400)
                        .json_body(json!({ "error": upstream_error.clone() }));
                })
                .await;

            let response = test_client.get("/fb/interests?q=rejected").send().await?;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await?;
            assert_eq!(
                body,
                json!({ "error": "Bad Request", "details": upstream_error })
            );
            assert!(metrics_watcher.has_counter("interests.upstream-error", 1.0));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unreadable_upstream_responses_are_internal_errors() -> Result<()> {
    adscout_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path(UPSTREAM_PATH);
                    then.status(502).body("<html>Bad Gateway</html>");
                })
                .await;

            let response = test_client.get("/fb/interests?q=garbled").send().await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Internal Server Error"));
            assert!(body["details"].is_string());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn every_request_is_counted() -> Result<()> {
    adscout_test(
        |settings| settings.auth.shared_secret = Some("s3cret".to_owned()),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            test_client.get("/fb/interests?q=counted").send().await?;
            test_client.get("/fb/interests").send().await?;

            assert_eq!(metrics_watcher.count_named("interests.request"), 2);

            Ok(())
        },
    )
    .await
}
