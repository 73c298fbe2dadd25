#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The interest lookup pipeline behind adscout.
//!
//! A query is sent to an [`InterestSource`], the results are [classified] to
//! keep only interest categories, and the survivors are formatted with a
//! [normalized path] and an [audience range]. If nothing survives, a few
//! [fallback keywords] are suggested instead.
//!
//! [classified]: classifier::classify
//! [normalized path]: path::normalize_path
//! [audience range]: audience::format_audience
//! [fallback keywords]: suggestions::suggest

pub mod audience;
pub mod classifier;
mod domain;
mod graph_api;
pub mod path;
pub mod suggestions;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use crate::domain::{
    FormattedInterest, InterestRecord, InterestResponse, PathValue, SearchLimit, SuggestionSet,
};
pub use crate::graph_api::GraphApiClient;

/// A service that can search for interest categories.
#[async_trait]
pub trait InterestSource: Send + Sync {
    /// An operator visible name for the source.
    fn name(&self) -> String;

    /// Search for categories matching `query`, returning at most `limit`
    /// records in upstream order. Exactly one upstream call is made, with no
    /// retries.
    async fn search(
        &self,
        query: &str,
        limit: SearchLimit,
    ) -> Result<Vec<InterestRecord>, UpstreamError>;
}

/// Look up interests for `query`.
///
/// Records that are not interest categories are dropped. If none are left,
/// the response carries suggestions derived from the query and from the paths
/// of every record the source returned.
///
/// # Errors
/// Any failure of the source is returned unchanged.
pub async fn find_interests(
    source: &dyn InterestSource,
    query: &str,
    limit: SearchLimit,
) -> Result<InterestResponse, UpstreamError> {
    let records = source.search(query, limit).await?;
    Ok(respond(query, &records))
}

/// Classify `records` and build the response for `query`.
pub fn respond(query: &str, records: &[InterestRecord]) -> InterestResponse {
    let interests = classifier::classify(records);

    if interests.is_empty() {
        let suggestions = suggestions::suggest(query, records.iter().map(|record| &record.path));
        InterestResponse::Fallback {
            query: query.to_owned(),
            suggestions,
        }
    } else {
        InterestResponse::Found {
            query: query.to_owned(),
            items: interests.into_iter().map(format_interest).collect(),
        }
    }
}

/// Convert a classified record to its display form.
fn format_interest(record: &InterestRecord) -> FormattedInterest {
    FormattedInterest {
        id: record.id.clone(),
        name: record.name.clone(),
        path: path::normalize_path(&record.path),
        size: audience::format_audience(record.audience_lower, record.audience_upper),
    }
}

/// Errors that may occur while setting up an interest source.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum SetupError {
    #[error("There was a network error while setting up this interest source")]
    Network(#[source] anyhow::Error),
}

/// Errors that may occur while searching upstream.
#[derive(Debug, Error)]
#[allow(clippy::missing_docs_in_private_items)]
pub enum UpstreamError {
    /// The upstream API rejected the search. The payload is its error object.
    #[error("The upstream API rejected the search")]
    BadQuery {
        /// The `error` object from the upstream response, unmodified.
        payload: Value,
    },

    /// The API could not be reached, timed out, or reported a failure without
    /// details.
    #[error("There was a network error while searching interests: {0}")]
    Network(#[source] anyhow::Error),

    /// The API answered with something that isn't a search response.
    #[error("The upstream API returned an unusable response: {0}")]
    Format(#[source] anyhow::Error),
}
