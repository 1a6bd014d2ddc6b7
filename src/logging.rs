/// Diagnostic logging to stderr.
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV: &str = "VALIDKIT_LOG";

/// Filter used when `VALIDKIT_LOG` is unset.
fn default_directive(verbose: bool) -> &'static str {
    if verbose { "validkit=debug,warn" } else { "warn" }
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init();
}
