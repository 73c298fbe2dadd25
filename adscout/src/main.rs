// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A proxy that searches advertising interest categories and suggests
//! alternatives when nothing usable matches.
//!
//! adscout is split into several subcrates that work in collaboration.
//!
//! - [adscout-interests](../adscout_interests/index.html)
//! - [adscout-integration-tests](../adscout_integration_tests/index.html)
//! - [adscout-settings](../adscout_settings/index.html)
//! - [adscout-web](../adscout_web/index.html)

mod docs;

use adscout_settings::{LogFormat, Settings};
use anyhow::{Context, Result};
use cadence::{BufferedUdpMetricSink, QueuingMetricSink, StatsdClient};
use std::net::{TcpListener, UdpSocket};
use tracing_actix_web_mozlog::{JsonStorageLayer, MozLogFormatLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let metrics_client = init_metrics(&settings).context("Initializing metrics")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(
        r#type = "app.starting",
        env = %settings.env,
        listen = %settings.http.listen,
        "Starting adscout"
    );

    adscout_web::run(listener, metrics_client, settings)
        .context("Starting adscout-web server")?
        .await
        .context("Running adscout-web server")?;

    Ok(())
}

/// Set up logging for adscout, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();

    match settings.logging.format {
        LogFormat::MozLog => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(MozLogFormatLayer::new("adscout", std::io::stdout));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact());
            tracing::subscriber::set_global_default(subscriber)?;
        }
    };

    Ok(())
}

/// Build a statsd client that sends metrics to the configured sink without
/// blocking request handling.
fn init_metrics(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket.set_nonblocking(true)?;

    let sink_addr = (settings.metrics.sink_host.as_str(), settings.metrics.sink_port);
    let udp_sink = BufferedUdpMetricSink::from(sink_addr, socket)
        .context("Creating metrics sink")?;
    let queuing_sink = QueuingMetricSink::with_capacity(udp_sink, settings.metrics.max_queue_size);

    Ok(StatsdClient::builder("adscout", queuing_sink)
        .with_error_handler(|error| {
            tracing::warn!(r#type = "app.metrics.error", %error, "Could not send metrics");
        })
        .build())
}
