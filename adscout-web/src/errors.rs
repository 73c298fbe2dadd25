//! Any errors that adscout-web might generate, and supporting implementations.

use std::error::Error;
use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use adscout_interests::UpstreamError;
use backtrace::Backtrace;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The Standard Error for most of adscout
pub struct HandlerError {
    /// The wrapped error value.
    kind: HandlerErrorKind,
    /// The backtrace related to the wrapped error.
    pub(crate) backtrace: Backtrace,
}

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerErrorKind {
    /// The caller did not present the configured shared secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// A required query parameter was absent or empty.
    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),

    /// The deployment lacks the upstream credentials.
    #[error("Server missing environment variables")]
    MisconfiguredServer,

    /// The upstream API rejected the search. Holds the upstream error payload.
    #[error("Bad Request")]
    BadUpstreamQuery(Value),

    /// A generic error, with a message describing what went wrong.
    #[error("Internal Server Error")]
    Internal(String),
}

impl HandlerErrorKind {
    /// Convert the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingParameter(_) | Self::BadUpstreamQuery(_) => StatusCode::BAD_REQUEST,
            Self::MisconfiguredServer | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic details to include in the response, if any.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::BadUpstreamQuery(payload) => Some(payload.clone()),
            Self::Internal(message) => Some(Value::String(message.clone())),
            Self::Unauthorized | Self::MissingParameter(_) | Self::MisconfiguredServer => None,
        }
    }

    /// Build an HTTP response reporting the error.
    pub fn error_response(&self) -> HttpResponse {
        /// The JSON body of every error response.
        #[derive(Serialize)]
        struct ErrorBody {
            /// A short summary of the error.
            error: String,
            /// More information, when there is some.
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<Value>,
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details: self.details(),
        })
    }
}

impl From<UpstreamError> for HandlerErrorKind {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::BadQuery { payload } => Self::BadUpstreamQuery(payload),
            error @ (UpstreamError::Network(_) | UpstreamError::Format(_)) => {
                Self::Internal(error.to_string())
            }
        }
    }
}

impl From<HandlerErrorKind> for actix_web::Error {
    fn from(kind: HandlerErrorKind) -> Self {
        let error: HandlerError = kind.into();
        error.into()
    }
}

impl HandlerError {
    /// Access the wrapped error.
    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}

impl<T> From<T> for HandlerError
where
    HandlerErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        HandlerError {
            kind: HandlerErrorKind::from(item),
            backtrace: Backtrace::new(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::fmt::Debug for HandlerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Format the name of this debug struct as `HandlerError/<error name>`
        // so log aggregation can group by error kind.
        fmt.debug_struct(&format!("HandlerError/{:?}", &self.kind))
            .field("kind", &self.kind)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        self.kind().error_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn body_of(error: HandlerErrorKind) -> (StatusCode, Value) {
        let response = HandlerError::from(error).error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body())
            .await
            .expect("body should be readable");
        (
            status,
            serde_json::from_slice(&bytes).expect("body should be JSON"),
        )
    }

    #[actix_rt::test]
    async fn unauthorized() {
        assert_eq!(
            body_of(HandlerErrorKind::Unauthorized).await,
            (StatusCode::UNAUTHORIZED, json!({"error": "Unauthorized"}))
        );
    }

    #[actix_rt::test]
    async fn missing_parameter() {
        assert_eq!(
            body_of(HandlerErrorKind::MissingParameter("q")).await,
            (
                StatusCode::BAD_REQUEST,
                json!({"error": "Missing parameter 'q'"})
            )
        );
    }

    #[actix_rt::test]
    async fn misconfigured_server() {
        assert_eq!(
            body_of(HandlerErrorKind::MisconfiguredServer).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Server missing environment variables"})
            )
        );
    }

    #[actix_rt::test]
    async fn bad_upstream_queries_carry_the_payload() {
        let payload = json!({"message": "Invalid parameter", "code": 100});
        let kind = HandlerErrorKind::from(UpstreamError::BadQuery {
            payload: payload.clone(),
        });

        assert_eq!(
            body_of(kind).await,
            (
                StatusCode::BAD_REQUEST,
                json!({"error": "Bad Request", "details": payload})
            )
        );
    }

    #[actix_rt::test]
    async fn network_errors_are_internal() {
        let kind = HandlerErrorKind::from(UpstreamError::Network(anyhow!("connection refused")));
        let (status, body) = body_of(kind).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Internal Server Error"));
        assert!(body["details"]
            .as_str()
            .map_or(false, |details| details.contains("connection refused")));
    }
}
