// Telemetry module for structured logging and metrics

use crate::models::AccountKind;
use anyhow::Result;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging
///
/// `RUST_LOG` takes precedence over `log_level`. With `json` set, every
/// event is written as one JSON object including the current span.
pub fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let fmt_layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level = log_level, json = json, "Structured logging initialized");

    Ok(())
}

/// Install the Prometheus recorder and describe the application counters
///
/// The returned handle renders the scrape payload served on `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!("signup_total", "Total number of accounts signed up");
    describe_counter!("login_success_total", "Total number of successful logins");
    describe_counter!("login_failed_total", "Total number of rejected logins");
    describe_counter!("media_upload_total", "Total number of stored uploads");
    describe_counter!(
        "media_upload_rejected_total",
        "Total number of rejected uploads"
    );

    tracing::info!("Prometheus metrics recorder installed");

    Ok(handle)
}

#[inline]
pub fn record_signup(kind: AccountKind) {
    counter!("signup_total", "kind" => kind.to_string()).increment(1);
}

#[inline]
pub fn record_login_success(kind: AccountKind) {
    counter!("login_success_total", "kind" => kind.to_string()).increment(1);
}

/// Record a rejected login; `reason` is `unknown_user` or `wrong_password`
#[inline]
pub fn record_login_failure(kind: AccountKind, reason: &str) {
    counter!(
        "login_failed_total",
        "kind" => kind.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a stored upload; `category` is `images` or `demos`
#[inline]
pub fn record_media_upload(category: &str) {
    counter!("media_upload_total", "category" => category.to_string()).increment(1);
}

#[inline]
pub fn record_media_rejected(category: &str, reason: &str) {
    counter!(
        "media_upload_rejected_total",
        "category" => category.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}
