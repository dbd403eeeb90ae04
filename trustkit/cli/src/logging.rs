use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Set to `true` to print logs as JSON.
pub(crate) const JSON_LOG_ENV: &str = "TRUSTKIT_JSON_LOG";

/// Logs go to stderr, so that command output on stdout stays clean.
pub(crate) fn init_tracing_registry() {
    let json_log = std::env::var(JSON_LOG_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(false);

    if json_log {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                    .json(),
            )
            .with(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_line_number(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
