//! A liveness endpoint for uptime monitors.

use actix_web::{get, web, HttpResponse};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Configure the health route.
pub fn configure(config: &mut web::ServiceConfig) {
    config.service(health);
}

/// The body of a health response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    /// Always `online` when the server can answer at all.
    status: &'static str,
    /// The current time, in RFC 3339 format.
    timestamp: String,
}

/// Report that the server is up. Always succeeds.
#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "online",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
