use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const UPSTREAM_REQUESTS_TOTAL: &str = "quire_upstream_requests_total";
pub const UPSTREAM_REQUEST_MS: &str = "quire_upstream_request_ms";
pub const AUTOSAVE_FLUSH_TOTAL: &str = "quire_autosave_flush_total";
pub const AUTOSAVE_PENDING: &str = "quire_autosave_pending";
pub const COMMENT_SUBMISSIONS_TOTAL: &str = "quire_comment_submissions_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            UPSTREAM_REQUESTS_TOTAL,
            Unit::Count,
            "Requests sent to the upstream API, labelled by method and outcome."
        );
        describe_histogram!(
            UPSTREAM_REQUEST_MS,
            Unit::Milliseconds,
            "Upstream API round-trip latency in milliseconds."
        );
        describe_counter!(
            AUTOSAVE_FLUSH_TOTAL,
            Unit::Count,
            "Debounced editor autosaves written upstream, labelled by outcome."
        );
        describe_gauge!(
            AUTOSAVE_PENDING,
            Unit::Count,
            "Posts with an autosave waiting for its debounce window."
        );
        describe_counter!(
            COMMENT_SUBMISSIONS_TOTAL,
            Unit::Count,
            "Public comment submissions, labelled by outcome."
        );
    });
}
