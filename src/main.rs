//! Economic calendar relay binary entrypoint.
//! Boots the Axum HTTP server with the configured calendar pipeline.

use economic_calendar_relay::api::{self, AppState};
use economic_calendar_relay::metrics::Metrics;
use economic_calendar_relay::{CalendarPipeline, PipelineConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - CALENDAR_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("CALENDAR_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("economic_calendar_relay=debug,info"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = PipelineConfig::load().map_err(anyhow::Error::from)?;
    tracing::info!(
        source = ?cfg.source,
        format = ?cfg.format,
        forwarding = cfg.sink_url.is_some(),
        "calendar config loaded"
    );

    let pipeline = CalendarPipeline::from_config(&cfg).map_err(anyhow::Error::from)?;
    let mut router = api::router(AppState::new(pipeline));

    match Metrics::init() {
        Ok(metrics) => router = router.merge(metrics.router()),
        Err(e) => tracing::warn!(error = %e, "prometheus recorder not installed; /metrics disabled"),
    }

    Ok(router.into())
}
