//! Web handlers for the interests API.

use crate::{
    errors::{HandlerError, HandlerErrorKind},
    extractors::{CallerCredential, InterestQueryParameters},
    sources::InterestSourceRef,
};
use actix_web::{
    get,
    web::{Data, ServiceConfig},
    HttpRequest, HttpResponse,
};
use adscout_interests::{find_interests, InterestResponse, SearchLimit};
use adscout_settings::Settings;
use cadence::{CountedExt, Histogrammed, StatsdClient};

/// Configure a route to use the interests service.
pub fn configure(config: &mut ServiceConfig) {
    config.service(interests);
}

/// Search interest categories matching the queried text.
#[get("")]
#[tracing::instrument(skip(request, credential, source, metrics_client, settings))]
async fn interests(
    request: HttpRequest,
    credential: CallerCredential,
    source: Data<InterestSourceRef>,
    metrics_client: Data<StatsdClient>,
    settings: Data<Settings>,
) -> Result<HttpResponse, HandlerError> {
    metrics_client.incr("interests.request").ok();

    if !credential.satisfies(settings.auth.shared_secret.as_deref()) {
        return Err(HandlerErrorKind::Unauthorized.into());
    }

    // Parsed only once the caller is known to be allowed in.
    let query_parameters = InterestQueryParameters::parse(request.query_string());
    let query = query_parameters
        .query()
        .ok_or(HandlerErrorKind::MissingParameter("q"))?;

    let source = source.get().ok_or(HandlerErrorKind::MisconfiguredServer)?;

    let limit = SearchLimit::from_param(
        query_parameters.limit.as_deref(),
        settings.upstream.default_limit,
        settings.upstream.max_limit,
    );

    safe_log_request(settings.log_full_request, query, limit, &source.name());

    let response = find_interests(source, query, limit)
        .await
        .map_err(|error| {
            tracing::error!(%error, r#type = "web.interests.error", "Error searching interests");
            metrics_client.incr("interests.upstream-error").ok();
            HandlerError::from(error)
        })?;

    tracing::debug!(
        r#type = "web.interests.provided-count",
        item_count = response.count(),
        fallback = matches!(response, InterestResponse::Fallback { .. }),
        "Providing interests"
    );
    metrics_client
        .histogram("interests.items-per", response.count() as u64)
        .ok();
    if let InterestResponse::Fallback { .. } = response {
        metrics_client.incr("interests.fallback").ok();
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Log an interest request, respecting the log_query setting passed. Query
/// text can be sensitive, so it is left out unless explicitly enabled.
fn safe_log_request(log_query: bool, query: &str, limit: SearchLimit, source_name: &str) {
    let query = if log_query { query } else { "" };

    tracing::info!(
        r#type = "web.interests.request",
        sensitive = log_query,
        %query,
        %limit,
        source = source_name,
        "handling interest request"
    );
}
