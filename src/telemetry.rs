use tracing::Metadata;
use tracing_subscriber::filter::{filter_fn, FilterFn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogConfig, LogFormat};

// ============================================================================
// Telemetry - tracing subscriber setup
// ============================================================================
//
// Layers:
// - EnvFilter from the configured directives
// - sensitive field filter: drops any event or span that declares a
//   `password` field, whatever its case
// - fmt output, text or JSON, with target, thread id and thread name
//
// Environment and machine name are attached per request by the correlation
// span.
//
// ============================================================================

const SENSITIVE_FIELDS: &[&str] = &["password"];

fn carries_sensitive_field(metadata: &Metadata<'_>) -> bool {
    metadata.fields().iter().any(|field| {
        SENSITIVE_FIELDS
            .iter()
            .any(|sensitive| field.name().eq_ignore_ascii_case(sensitive))
    })
}

/// Filter dropping events and spans that declare a sensitive field.
pub fn sensitive_field_filter() -> FilterFn<impl Fn(&Metadata<'_>) -> bool> {
    filter_fn(|metadata| !carries_sensitive_field(metadata))
}

pub fn init(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&log.filter)?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(sensitive_field_filter());

    match log.format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .init(),
    }

    Ok(())
}
