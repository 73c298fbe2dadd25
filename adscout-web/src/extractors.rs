//! Types to extract adscout data from requests.

use actix_web::{
    dev::Payload, http::header, web, Error as ActixError, FromRequest, HttpRequest,
};
use futures_util::future::{self, Ready};

/// The bearer token from the `Authorization` header, if the caller sent one.
///
/// Extraction never fails. A missing, non-UTF-8, or non-bearer header is
/// treated the same as no credential.
#[derive(Debug, Default, PartialEq)]
pub struct CallerCredential(pub Option<String>);

impl CallerCredential {
    /// Whether this credential satisfies a configured shared secret.
    ///
    /// With no secret configured (or an empty one) every caller is accepted.
    pub fn satisfies(&self, shared_secret: Option<&str>) -> bool {
        match shared_secret.filter(|secret| !secret.is_empty()) {
            Some(secret) => self.0.as_deref() == Some(secret),
            None => true,
        }
    }
}

impl FromRequest for CallerCredential {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .map(|token| token.trim().to_owned());

        future::ready(Ok(Self(token)))
    }
}

/// The query string accepted by the interests endpoint.
///
/// Parsed from the raw query string inside the handler, after the credential
/// check, not through `web::Query`.
#[derive(Debug, Default, PartialEq)]
pub struct InterestQueryParameters {
    /// The free text to search for.
    pub q: Option<String>,
    /// How many results to ask for. Kept as text so that unparsable values
    /// fall back to the default instead of rejecting the request.
    pub limit: Option<String>,
}

impl InterestQueryParameters {
    /// Parse a raw query string. Never fails.
    ///
    /// When a key is repeated, the first value wins. Unknown keys are ignored.
    pub fn parse(query_string: &str) -> Self {
        let pairs = web::Query::<Vec<(String, String)>>::from_query(query_string)
            .map(web::Query::into_inner)
            .unwrap_or_default();

        pairs
            .into_iter()
            .fold(Self::default(), |mut params, (key, value)| {
                match key.as_str() {
                    "q" if params.q.is_none() => params.q = Some(value),
                    "limit" if params.limit.is_none() => params.limit = Some(value),
                    _ => (),
                }
                params
            })
    }

    /// The query exactly as the caller sent it, unless it is absent or empty.
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use pretty_assertions::assert_eq;

    async fn extract(request: TestRequest) -> CallerCredential {
        let (req, mut payload) = request.to_http_parts();
        CallerCredential::from_request(&req, &mut payload)
            .await
            .expect("extraction never fails")
    }

    #[actix_rt::test]
    async fn bearer_tokens_are_extracted() {
        let credential = extract(
            TestRequest::default().insert_header((header::AUTHORIZATION, "Bearer s3cret")),
        )
        .await;
        assert_eq!(credential, CallerCredential(Some("s3cret".to_string())));
    }

    #[actix_rt::test]
    async fn other_schemes_are_ignored() {
        let credential = extract(
            TestRequest::default().insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz")),
        )
        .await;
        assert_eq!(credential, CallerCredential(None));
    }

    #[actix_rt::test]
    async fn missing_header_is_no_credential() {
        assert_eq!(extract(TestRequest::default()).await, CallerCredential(None));
    }

    #[test]
    fn secrets_must_match_exactly() {
        let credential = CallerCredential(Some("s3cret".to_string()));
        assert!(credential.satisfies(Some("s3cret")));
        assert!(!credential.satisfies(Some("S3CRET")));
        assert!(!CallerCredential(None).satisfies(Some("s3cret")));
    }

    #[test]
    fn no_secret_accepts_everyone() {
        assert!(CallerCredential(None).satisfies(None));
        assert!(CallerCredential(None).satisfies(Some("")));
    }

    #[test]
    fn empty_queries_are_missing() {
        assert_eq!(InterestQueryParameters::parse("").query(), None);
        assert_eq!(InterestQueryParameters::parse("limit=5").query(), None);
        assert_eq!(InterestQueryParameters::parse("q=").query(), None);
    }

    #[test]
    fn queries_are_kept_as_sent() {
        assert_eq!(
            InterestQueryParameters::parse("q=%20dota%20").query(),
            Some(" dota ")
        );
        assert_eq!(InterestQueryParameters::parse("q=+++").query(), Some("   "));
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        assert_eq!(
            InterestQueryParameters::parse("q=a&limit=3&q=b&limit=50"),
            InterestQueryParameters {
                q: Some("a".to_string()),
                limit: Some("3".to_string()),
            }
        );
    }

    #[test]
    fn malformed_query_strings_still_parse() {
        let params = InterestQueryParameters::parse("q=%zz&&=x&limit&other=1");
        assert_eq!(params.query(), Some("%zz"));
        assert_eq!(params.limit.as_deref(), Some(""));
    }
}
