use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::query::{METRIC_QUERY_HIT, METRIC_QUERY_INVALIDATE, METRIC_QUERY_MISS};
use crate::config::{LogFormat, LoggingSettings};

use super::auth::METRIC_AUTH_REQUESTS;
use super::store::METRIC_STORE_REQUESTS;

use super::error::InfraError;

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
            METRIC_QUERY_HIT,
            Unit::Count,
            "Total number of reads served from the query cache."
        );
        describe_counter!(
            METRIC_QUERY_MISS,
            Unit::Count,
            "Total number of reads that went to the post store."
        );
        describe_counter!(
            METRIC_QUERY_INVALIDATE,
            Unit::Count,
            "Total number of cached queries dropped by mutations."
        );
        describe_counter!(
            METRIC_STORE_REQUESTS,
            Unit::Count,
            "Post store requests, labelled by operation and outcome."
        );
        describe_counter!(
            METRIC_AUTH_REQUESTS,
            Unit::Count,
            "Auth provider requests, labelled by operation and outcome."
        );
    });
}
