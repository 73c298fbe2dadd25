#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [adscout](../adscout/index.html)'s public API.

mod errors;
mod extractors;
mod health;
mod interests;
mod logging;
mod sources;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    get,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use adscout_settings::Settings;
use anyhow::{Context, Result};
use cadence::StatsdClient;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::{logging::AdscoutRootSpanBuilder, sources::InterestSourceRef};

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// # Errors
///
/// Returns an error if the interest source cannot be set up, or if the server
/// cannot be started on the provided listener. Missing upstream credentials are
/// not an error: requests are answered with a configuration error instead.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down. This is used to run adscout as a
/// service, such as in production.
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = adscout_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("adscout", cadence::NopMetricSink);
/// adscout_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> Result<Server> {
    let num_workers = settings.http.workers;
    let source = InterestSourceRef::init(&settings)?;

    let settings = Data::new(settings);
    let source = Data::new(source);
    let metrics_client = Data::new(metrics_client);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(settings.clone())
            .app_data(source.clone())
            .app_data(metrics_client.clone())
            .wrap(TracingLogger::<AdscoutRootSpanBuilder>::new())
            .wrap(Cors::permissive())
            // The core functionality of adscout
            .service(web::scope("/fb/interests").configure(interests::configure))
            .configure(health::configure)
            .service(root_info)
    })
    .listen(listener)
    .context("Listening for HTTP requests")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this service
/// is. It should redirect to documentation, if it is available, or provide a
/// short message otherwise.
#[get("/")]
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.as_str()))
            .finish(),
        None => HttpResponse::Ok().content_type("text/plain").body(
            "adscout is online. It searches advertising interest categories at /fb/interests?q=<text>.",
        ),
    }
}
