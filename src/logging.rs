//! Logging initialization for the cozeflow CLI
//!
//! Structured logging via tracing. The CLI keeps user-facing output on
//! stdout/stderr; operator-facing diagnostics (attempt counts, durations,
//! full error detail) go through the subscriber configured here.

use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbose mode enables debug-level
/// output for cozeflow crates and compact mode stays at info/warn.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("cozeflow=debug,cozeflow_client=debug,info")
            } else {
                EnvFilter::try_new("cozeflow=info,cozeflow_client=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
